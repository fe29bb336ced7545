use pagesmith_schema::SchemaError;
use thiserror::Error;

pub type PublishResult<T> = Result<T, PublishError>;

#[derive(Error, Debug)]
pub enum PublishError {
    #[error(
        "Invalid page name '{0}': must start with a letter and contain 2-30 letters, numbers, hyphens or underscores"
    )]
    InvalidName(String),

    #[error("Page '{0}' already exists")]
    Conflict(String),

    #[error("Layout is invalid: {0}")]
    Schema(#[from] SchemaError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
