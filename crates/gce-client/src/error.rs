use thiserror::Error;

#[derive(Debug, Error)]
pub enum GceError {
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Compute API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("operation '{name}' failed: {message}")]
    OperationFailed { name: String, message: String },

    #[error("timed out waiting for operation '{0}'")]
    OperationTimeout(String),

    #[error("no access token available: {0}")]
    Auth(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GceError>;
