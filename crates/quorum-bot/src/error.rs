//! Application error types.

use thiserror::Error;

/// Main application error type.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),

    #[error("Chat API error: {0}")]
    Api(#[from] chat_client::ApiError),

    #[error("Authentication rejected: {0}")]
    Auth(String),

    #[error("No bot identity available for allocation")]
    NoBotAvailable,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for application errors.
pub type AppResult<T> = Result<T, AppError>;
