mod clipboard;

pub use clipboard::{ClipboardImage, ClipboardOutput};
