use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("toml serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("capture failed: {0}")]
    Capture(String),

    #[error("image encode failed: {0}")]
    Encode(String),

    #[error("upload failed: {0}")]
    UploadTransport(String),

    #[error("upload rejected with status {status}: {body}")]
    UploadRejected { status: u16, body: String },

    #[error("clipboard access failed: {0}")]
    Clipboard(String),

    #[error("no image found in clipboard")]
    ClipboardEmpty,
}

pub type AppResult<T> = Result<T, AppError>;
