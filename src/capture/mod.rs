mod filename;
mod invoker;

pub use filename::generate_filename;
pub use invoker::{run_capture, CaptureMode, CaptureRequest};
