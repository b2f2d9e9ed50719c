use serde_json::{Map, Value};

use super::service::ConfigError;

pub fn validate_config(config: &Value) -> Result<(), ConfigError> {
    let root = config
        .as_object()
        .ok_or_else(|| config_type_error("root", "object"))?;

    if let Some(server) = expect_optional_object(root, "server")? {
        validate_optional_string_field(server, "server.host", "host")?;
        validate_u64_field(server, "server.port", "port", 0, 65535)?;
        validate_string_array_field(
            server,
            "server.cors_allowed_origins",
            "cors_allowed_origins",
        )?;
    }

    if let Some(llm) = expect_optional_object(root, "llm")? {
        validate_optional_string_field(llm, "llm.base_url", "base_url")?;
        validate_optional_string_field(llm, "llm.api_key", "api_key")?;
        validate_string_array_field(llm, "llm.models", "models")?;
        if let Some(models) = llm.get("models").and_then(|v| v.as_array()) {
            if models.is_empty() {
                return Err(ConfigError::Invalid(
                    "Invalid config at 'llm.models': at least one model is required".to_string(),
                ));
            }
        }
        validate_u64_field(llm, "llm.timeout_secs", "timeout_secs", 1, 600)?;
    }

    if let Some(ocr) = expect_optional_object(root, "ocr")? {
        validate_optional_string_field(ocr, "ocr.command", "command")?;
        validate_optional_string_field(ocr, "ocr.language", "language")?;
        validate_optional_string_field(ocr, "ocr.tessdata_dir", "tessdata_dir")?;
        validate_u64_field(ocr, "ocr.timeout_secs", "timeout_secs", 1, 600)?;
    }

    if let Some(catalog) = expect_optional_object(root, "catalog")? {
        validate_u64_field(catalog, "catalog.browse_limit", "browse_limit", 1, 10_000)?;
        validate_u64_field(catalog, "catalog.context_limit", "context_limit", 1, 100)?;
    }

    if let Some(uploads) = expect_optional_object(root, "uploads")? {
        validate_u64_field(uploads, "uploads.max_bytes", "max_bytes", 1, 100_000_000)?;
    }

    Ok(())
}

fn expect_optional_object<'a>(
    root: &'a Map<String, Value>,
    key: &str,
) -> Result<Option<&'a Map<String, Value>>, ConfigError> {
    match root.get(key) {
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(_) => Err(config_type_error(key, "object")),
        None => Ok(None),
    }
}

fn validate_u64_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
    min: u64,
    max: u64,
) -> Result<(), ConfigError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    let Some(number) = value.as_u64() else {
        return Err(config_type_error(path, "integer"));
    };
    if number < min || number > max {
        return Err(ConfigError::Invalid(format!(
            "Invalid config at '{}': must be between {} and {}",
            path, min, max
        )));
    }
    Ok(())
}

fn validate_optional_string_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<(), ConfigError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    if value.as_str().is_none() {
        return Err(config_type_error(path, "string"));
    }
    Ok(())
}

fn validate_string_array_field(
    section: &Map<String, Value>,
    path: &str,
    key: &str,
) -> Result<(), ConfigError> {
    let Some(value) = section.get(key) else {
        return Ok(());
    };
    let Some(items) = value.as_array() else {
        return Err(config_type_error(path, "array of strings"));
    };
    for (index, item) in items.iter().enumerate() {
        let Some(text) = item.as_str() else {
            return Err(config_type_error(&format!("{}[{}]", path, index), "string"));
        };
        if text.trim().is_empty() {
            return Err(ConfigError::Invalid(format!(
                "Invalid config at '{}[{}]': value cannot be empty",
                path, index
            )));
        }
    }
    Ok(())
}

fn config_type_error(path: &str, expected: &str) -> ConfigError {
    ConfigError::Invalid(format!(
        "Invalid config at '{}': expected {}",
        path, expected
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_empty_and_complete_configs() {
        assert!(validate_config(&json!({})).is_ok());
        assert!(validate_config(&json!({
            "server": { "host": "0.0.0.0", "port": 3000, "cors_allowed_origins": ["http://localhost:5173"] },
            "llm": { "models": ["gemini-2.5-flash", "gemini-2.0-flash"], "timeout_secs": 30 },
            "ocr": { "command": "tesseract", "language": "eng" },
            "catalog": { "browse_limit": 100, "context_limit": 5 },
            "uploads": { "max_bytes": 10485760 }
        }))
        .is_ok());
    }

    #[test]
    fn rejects_empty_model_chain() {
        let err = validate_config(&json!({ "llm": { "models": [] } })).unwrap_err();
        assert!(err.to_string().contains("llm.models"));
    }

    #[test]
    fn rejects_wrong_types_and_ranges() {
        assert!(validate_config(&json!({ "server": "nope" })).is_err());
        assert!(validate_config(&json!({ "server": { "port": 70000 } })).is_err());
        assert!(validate_config(&json!({ "llm": { "models": ["ok", 3] } })).is_err());
        assert!(validate_config(&json!({ "catalog": { "context_limit": 0 } })).is_err());
    }
}
