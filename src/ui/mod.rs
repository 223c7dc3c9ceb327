pub mod notify;
pub mod progress;
pub mod prompt;

pub use notify::Notifier;
pub use progress::with_spinner;
pub use prompt::prompt_api_key;
