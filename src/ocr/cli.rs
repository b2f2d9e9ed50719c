use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use super::{OcrEngine, OcrError};
use crate::core::config::settings::OcrSettings;

/// Runs `tesseract <image> stdout -l <lang>` and returns stdout.
#[derive(Debug, Clone)]
pub struct TesseractCli {
    command: PathBuf,
    language: String,
    timeout: Duration,
}

impl TesseractCli {
    pub fn new(command: impl Into<PathBuf>, language: &str, timeout: Duration) -> Self {
        Self {
            command: command.into(),
            language: language.to_string(),
            timeout,
        }
    }

    pub fn from_settings(settings: &OcrSettings) -> Self {
        Self::new(&settings.command, &settings.language, settings.timeout)
    }
}

#[async_trait]
impl OcrEngine for TesseractCli {
    async fn recognize(&self, image_path: &Path) -> Result<String, OcrError> {
        tracing::info!("Processing OCR for {}", image_path.display());

        let child = Command::new(&self.command)
            .arg(image_path)
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| OcrError::Spawn {
                command: self.command.display().to_string(),
                source,
            })?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| OcrError::Timeout(self.timeout))?
            .map_err(|source| OcrError::Spawn {
                command: self.command.display().to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(OcrError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}
