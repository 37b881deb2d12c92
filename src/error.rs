use thiserror::Error;

/// Errors raised by task stores and configuration.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid task data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upstream returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("upstream returned an unusable task: {0}")]
    BadResponse(String),

    #[error("tasks have not been loaded; reload before making changes")]
    NotLoaded,

    #[error("{0} is not supported in server mode")]
    Unsupported(&'static str),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, TaskError>;
