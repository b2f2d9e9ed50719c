//! Typed view over the merged configuration document.
//!
//! Every field has a default so an empty `config.yml` yields a runnable
//! server; `apply_env_overrides` layers `PORT` and `GEMINI_API_KEY` on top.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use serde_json::Value;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODELS: [&str; 2] = ["gemini-2.5-flash", "gemini-2.0-flash"];
pub const DEFAULT_BROWSE_LIMIT: i64 = 100;
pub const DEFAULT_CONTEXT_LIMIT: i64 = 5;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub llm: LlmSettings,
    pub ocr: OcrSettings,
    pub catalog: CatalogSettings,
    pub uploads: UploadSettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub base_url: String,
    /// Ordered fallback chain, primary first.
    pub models: Vec<String>,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct OcrSettings {
    pub command: String,
    pub language: String,
    /// Only used by the linked engine; searched for when unset.
    pub tessdata_dir: Option<PathBuf>,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct CatalogSettings {
    pub browse_limit: i64,
    pub context_limit: i64,
}

#[derive(Debug, Clone)]
pub struct UploadSettings {
    pub max_bytes: usize,
}

impl Settings {
    pub fn from_value(config: &Value) -> Self {
        let server = config.get("server");
        let llm = config.get("llm");
        let ocr = config.get("ocr");
        let catalog = config.get("catalog");
        let uploads = config.get("uploads");

        Self {
            server: ServerSettings {
                host: str_field(server, "host").unwrap_or_else(|| "127.0.0.1".to_string()),
                port: u64_field(server, "port")
                    .and_then(|v| u16::try_from(v).ok())
                    .unwrap_or(DEFAULT_PORT),
                cors_allowed_origins: string_list(server, "cors_allowed_origins"),
            },
            llm: LlmSettings {
                base_url: str_field(llm, "base_url")
                    .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
                models: {
                    let models = string_list(llm, "models");
                    if models.is_empty() {
                        DEFAULT_MODELS.iter().map(|m| m.to_string()).collect()
                    } else {
                        models
                    }
                },
                api_key: str_field(llm, "api_key").filter(|key| !key.trim().is_empty()),
                timeout: Duration::from_secs(u64_field(llm, "timeout_secs").unwrap_or(30)),
            },
            ocr: OcrSettings {
                command: str_field(ocr, "command").unwrap_or_else(|| "tesseract".to_string()),
                language: str_field(ocr, "language").unwrap_or_else(|| "eng".to_string()),
                tessdata_dir: str_field(ocr, "tessdata_dir").map(PathBuf::from),
                timeout: Duration::from_secs(u64_field(ocr, "timeout_secs").unwrap_or(60)),
            },
            catalog: CatalogSettings {
                browse_limit: u64_field(catalog, "browse_limit")
                    .map(|v| v as i64)
                    .unwrap_or(DEFAULT_BROWSE_LIMIT),
                context_limit: u64_field(catalog, "context_limit")
                    .map(|v| v as i64)
                    .unwrap_or(DEFAULT_CONTEXT_LIMIT),
            },
            uploads: UploadSettings {
                max_bytes: u64_field(uploads, "max_bytes")
                    .map(|v| v as usize)
                    .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
            },
        }
    }

    pub fn apply_env_overrides(&mut self) {
        if let Some(port) = env::var("PORT").ok().and_then(|v| v.parse::<u16>().ok()) {
            self.server.port = port;
        }
        if self.llm.api_key.is_none() {
            self.llm.api_key = env::var("GEMINI_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty());
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_value(&Value::Null)
    }
}

fn str_field(section: Option<&Value>, key: &str) -> Option<String> {
    section
        .and_then(|s| s.get(key))
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
}

fn u64_field(section: Option<&Value>, key: &str) -> Option<u64> {
    section.and_then(|s| s.get(key)).and_then(|v| v.as_u64())
}

fn string_list(section: Option<&Value>, key: &str) -> Vec<String> {
    section
        .and_then(|s| s.get(key))
        .and_then(|v| v.as_array())
        .map(|list| {
            list.iter()
                .filter_map(|item| item.as_str())
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(|item| item.to_string())
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_config_uses_defaults() {
        let settings = Settings::from_value(&json!({}));

        assert_eq!(settings.server.port, 3000);
        assert_eq!(settings.llm.models, vec!["gemini-2.5-flash", "gemini-2.0-flash"]);
        assert_eq!(settings.llm.timeout, Duration::from_secs(30));
        assert!(settings.llm.api_key.is_none());
        assert_eq!(settings.catalog.browse_limit, 100);
        assert_eq!(settings.catalog.context_limit, 5);
        assert_eq!(settings.ocr.command, "tesseract");
    }

    #[test]
    fn explicit_values_override_defaults() {
        let settings = Settings::from_value(&json!({
            "server": { "port": 8081, "cors_allowed_origins": ["*", " "] },
            "llm": { "models": ["m1"], "api_key": "  ", "timeout_secs": 5, "base_url": "http://localhost:9000" },
            "catalog": { "context_limit": 3 }
        }));

        assert_eq!(settings.server.port, 8081);
        assert_eq!(settings.server.cors_allowed_origins, vec!["*"]);
        assert_eq!(settings.llm.models, vec!["m1"]);
        assert!(settings.llm.api_key.is_none());
        assert_eq!(settings.llm.timeout, Duration::from_secs(5));
        assert_eq!(settings.llm.base_url, "http://localhost:9000");
        assert_eq!(settings.catalog.context_limit, 3);
    }
}
