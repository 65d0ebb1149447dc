use thiserror::Error;

/// Crate-wide error type
#[derive(Debug, Error)]
pub enum Error {
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    /// A step needed a value that an earlier step did not produce.
    #[error("Missing input: {0}")]
    MissingInput(String),
}

/// Convenience Result type using our Error
pub type Result<T> = std::result::Result<T, Error>;
