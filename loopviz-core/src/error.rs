//! Error types for loopviz

use thiserror::Error;

/// Main error type for loopviz operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Colour error: {0}")]
    Colour(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Unsupported operation: {0}")]
    Unsupported(String),
}

impl Error {
    /// The error raised when an operation needs a model and none was given
    pub fn no_model() -> Self {
        Error::InvalidArgument("No model provided".to_string())
    }
}
