use std::sync::Arc;

use crate::catalog::{MedicineCatalog, SqliteCatalogStore};
use crate::chat::ChatOrchestrator;
use crate::core::config::{AppPaths, ConfigService, Settings};
use crate::llm::{FallbackGenerator, GeminiProvider, GenerationError, TextGenerator};
use crate::ocr::{build_ocr_engine, OcrEngine};

pub mod error;

use error::InitializationError;

/// Shared state handed to every route.
///
/// Built once at startup; nothing in here is mutated afterwards, so requests
/// never observe each other.
#[derive(Clone)]
pub struct AppState {
    pub paths: Arc<AppPaths>,
    pub settings: Arc<Settings>,
    pub catalog: SqliteCatalogStore,
    pub chat: Arc<ChatOrchestrator>,
    pub ocr: Arc<dyn OcrEngine>,
}

impl AppState {
    /// Loads configuration, opens the catalog and builds the generator chain.
    pub async fn initialize(paths: Arc<AppPaths>) -> Result<Arc<Self>, InitializationError> {
        let config = ConfigService::new(paths.clone());
        let raw_config = config.load_config()?;
        tracing::debug!(
            config = %config.redact_sensitive_values(&raw_config),
            "Loaded configuration"
        );

        let mut settings = Settings::from_value(&raw_config);
        settings.apply_env_overrides();

        let catalog = SqliteCatalogStore::new(paths.as_ref())
            .await
            .map_err(InitializationError::Catalog)?;

        let generator = build_generator(&settings).map_err(InitializationError::Llm)?;
        let ocr = build_ocr_engine(&settings.ocr);

        Ok(Self::new(paths, settings, catalog, generator, ocr))
    }

    pub fn new(
        paths: Arc<AppPaths>,
        settings: Settings,
        catalog: SqliteCatalogStore,
        generator: Arc<dyn TextGenerator>,
        ocr: Arc<dyn OcrEngine>,
    ) -> Arc<Self> {
        let lookup: Arc<dyn MedicineCatalog> = Arc::new(catalog.clone());
        let chat = ChatOrchestrator::new(generator, lookup)
            .with_context_limit(settings.catalog.context_limit);

        Arc::new(AppState {
            paths,
            settings: Arc::new(settings),
            catalog,
            chat: Arc::new(chat),
            ocr,
        })
    }
}

fn build_generator(settings: &Settings) -> Result<Arc<dyn TextGenerator>, GenerationError> {
    let api_key = settings.llm.api_key.clone().unwrap_or_else(|| {
        tracing::warn!("No Gemini API key configured; chat requests will fail");
        String::new()
    });

    let client = reqwest::Client::new();
    let providers: Vec<Arc<dyn TextGenerator>> = settings
        .llm
        .models
        .iter()
        .map(|model| {
            Arc::new(GeminiProvider::with_client(
                client.clone(),
                &settings.llm.base_url,
                model,
                &api_key,
            )) as Arc<dyn TextGenerator>
        })
        .collect();

    let chain = FallbackGenerator::new(providers, settings.llm.timeout)?;
    tracing::info!(providers = ?chain.provider_names(), "Text generator chain ready");
    Ok(Arc::new(chain))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn generator_chain_follows_configured_model_order() {
        let settings = Settings::from_value(&json!({
            "llm": { "models": ["primary-model", "secondary-model"], "api_key": "k" }
        }));
        assert!(build_generator(&settings).is_ok());

        let mut empty = settings.clone();
        empty.llm.models.clear();
        assert!(matches!(
            build_generator(&empty),
            Err(GenerationError::NoProviders)
        ));
    }
}
