use thiserror::Error;

#[derive(Error, Debug)]
pub enum VerifyError {
    /// 401/403 from the backend. Never retried; the session must sign in again.
    #[error("You are no longer signed in! Please sign in again.")]
    Unauthorized,

    #[error("No data found after {attempts} attempts")]
    Timeout { attempts: u32 },

    /// One failed attempt (bad status, network, decode). Retried by the poller.
    #[error("Request failed: {0}")]
    Transient(String),

    #[error("Failed to save data: {message}")]
    SubmitFailure { status: Option<u16>, message: String },

    #[error("Cancelled")]
    Cancelled,

    #[error("No extracted data available")]
    NoExtractedData,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<lopdf::Error> for VerifyError {
    fn from(e: lopdf::Error) -> Self {
        VerifyError::Render(format!("Could not read PDF: {}", e))
    }
}

impl From<image::ImageError> for VerifyError {
    fn from(e: image::ImageError) -> Self {
        VerifyError::Render(format!("Could not decode image: {}", e))
    }
}

pub type Result<T> = std::result::Result<T, VerifyError>;
