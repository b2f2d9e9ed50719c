use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("{provider} request failed: {message}")]
    Request { provider: String, message: String },
    #[error("{provider} returned HTTP {status}: {body}")]
    Status {
        provider: String,
        status: u16,
        body: String,
    },
    #[error("{provider} timed out after {timeout:?}")]
    Timeout { provider: String, timeout: Duration },
    #[error("no text generator configured")]
    NoProviders,
}

impl GenerationError {
    pub fn request<E: std::fmt::Display>(provider: &str, err: E) -> Self {
        GenerationError::Request {
            provider: provider.to_string(),
            message: err.to_string(),
        }
    }
}
