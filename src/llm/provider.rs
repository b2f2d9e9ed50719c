use async_trait::async_trait;

use super::types::GenerationError;

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// provider label used in logs (e.g. "gemini:gemini-2.5-flash")
    fn name(&self) -> &str;

    /// single-prompt completion (non-streaming)
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}
