use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid resource name '{0}': must be lowercase letters, digits, and hyphens, starting with a letter, at most 63 characters")]
    InvalidName(String),

    #[error("config file not found: {0}")]
    ConfigNotFound(String),

    #[error("step '{label}' failed with exit code {code}")]
    StepFailed { label: String, code: i32 },

    #[error("step '{label}' terminated by signal")]
    StepKilled { label: String },

    #[error("failed to launch application: {0}")]
    Launch(std::io::Error),

    #[error("application process exited unexpectedly")]
    AppExited,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
