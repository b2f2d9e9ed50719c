use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::provider::TextGenerator;
use super::types::GenerationError;

/// Google Gemini `generateContent` over REST.
#[derive(Clone)]
pub struct GeminiProvider {
    base_url: String,
    model: String,
    api_key: String,
    label: String,
    client: Client,
}

impl GeminiProvider {
    pub fn new(base_url: &str, model: &str, api_key: &str) -> Self {
        Self::with_client(Client::new(), base_url, model, api_key)
    }

    /// Shares one connection pool across every model in the chain.
    pub fn with_client(client: Client, base_url: &str, model: &str, api_key: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
            label: format!("gemini:{}", model),
            client,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url,
            urlencoding::encode(&self.model)
        )
    }
}

#[async_trait]
impl TextGenerator for GeminiProvider {
    fn name(&self) -> &str {
        &self.label
    }

    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let body = json!({
            "contents": [
                { "role": "user", "parts": [ { "text": prompt } ] }
            ]
        });

        let res = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerationError::request(&self.label, e))?;

        if !res.status().is_success() {
            let status = res.status().as_u16();
            let text = res.text().await.unwrap_or_default();
            return Err(GenerationError::Status {
                provider: self.label.clone(),
                status,
                body: text,
            });
        }

        let payload: Value = res
            .json()
            .await
            .map_err(|e| GenerationError::request(&self.label, e))?;

        Ok(candidate_text(&payload))
    }
}

/// Concatenated text parts of the first candidate; empty when the model
/// returned nothing (e.g. a safety block).
fn candidate_text(payload: &Value) -> String {
    payload["candidates"][0]["content"]["parts"]
        .as_array()
        .map(|parts| {
            parts
                .iter()
                .filter_map(|part| part["text"].as_str())
                .collect::<String>()
        })
        .unwrap_or_default()
}
