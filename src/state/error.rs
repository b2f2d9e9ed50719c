use thiserror::Error;

use crate::catalog::StoreError;
use crate::core::config::service::ConfigError;
use crate::llm::GenerationError;

#[derive(Debug, Error)]
pub enum InitializationError {
    #[error("Failed to load configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to open catalog store: {0}")]
    Catalog(#[source] StoreError),

    #[error("Failed to build text generator chain: {0}")]
    Llm(#[source] GenerationError),
}
