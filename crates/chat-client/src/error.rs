//! Chat API client errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("transport failure: status {0}")]
    Status(u16),

    #[error("API error: {0}")]
    Api(String),
}
