//! Ordered provider chain.
//!
//! Each provider gets one attempt with the identical prompt, bounded by the
//! chain timeout. A failed or timed-out attempt logs a single warning and moves
//! on; the last provider's error is returned to the caller.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::provider::TextGenerator;
use super::types::GenerationError;

pub struct FallbackGenerator {
    providers: Vec<Arc<dyn TextGenerator>>,
    timeout: Duration,
}

impl FallbackGenerator {
    pub fn new(
        providers: Vec<Arc<dyn TextGenerator>>,
        timeout: Duration,
    ) -> Result<Self, GenerationError> {
        if providers.is_empty() {
            return Err(GenerationError::NoProviders);
        }
        Ok(Self { providers, timeout })
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    async fn attempt(
        &self,
        provider: &dyn TextGenerator,
        prompt: &str,
    ) -> Result<String, GenerationError> {
        match tokio::time::timeout(self.timeout, provider.generate(prompt)).await {
            Ok(result) => result,
            Err(_) => Err(GenerationError::Timeout {
                provider: provider.name().to_string(),
                timeout: self.timeout,
            }),
        }
    }
}

#[async_trait]
impl TextGenerator for FallbackGenerator {
    fn name(&self) -> &str {
        "fallback"
    }

    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let mut providers = self.providers.iter().peekable();

        while let Some(provider) = providers.next() {
            match self.attempt(provider.as_ref(), prompt).await {
                Ok(text) => return Ok(text),
                Err(err) => match providers.peek() {
                    Some(next) => {
                        tracing::warn!(
                            provider = provider.name(),
                            next = next.name(),
                            error = %err,
                            "Text generator failed, falling back"
                        );
                    }
                    None => return Err(err),
                },
            }
        }

        Err(GenerationError::NoProviders)
    }
}
