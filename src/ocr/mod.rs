//! Prescription OCR.
//!
//! With the `ocr` feature the engine links libtesseract through the
//! `tesseract` crate; otherwise it falls back to the `tesseract` CLI.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::core::config::settings::OcrSettings;

mod cli;
#[cfg(feature = "ocr")]
mod bundled;

pub use cli::TesseractCli;
#[cfg(feature = "ocr")]
pub use bundled::TesseractOcr;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("failed to start {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("OCR exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },
    #[error("failed to read image {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("tessdata not found at {0}")]
    TessdataNotFound(PathBuf),
    #[error("OCR initialization failed: {0}")]
    Init(String),
    #[error("OCR processing failed: {0}")]
    Processing(String),
    #[error("OCR timed out after {0:?}")]
    Timeout(Duration),
}

#[async_trait]
pub trait OcrEngine: Send + Sync {
    async fn recognize(&self, image_path: &Path) -> Result<String, OcrError>;
}

/// Picks the OCR engine for this build.
///
/// Prefers the linked engine when tessdata can be located, otherwise the CLI.
pub fn build_ocr_engine(settings: &OcrSettings) -> Arc<dyn OcrEngine> {
    #[cfg(feature = "ocr")]
    {
        match find_tessdata_dir(settings.tessdata_dir.as_deref()) {
            Some(tessdata) => {
                match TesseractOcr::new(&tessdata, &settings.language, settings.timeout) {
                    Ok(engine) => {
                        tracing::info!(tessdata = %tessdata.display(), "Tesseract OCR initialized");
                        return Arc::new(engine);
                    }
                    Err(err) => tracing::warn!("Tesseract OCR unavailable: {}", err),
                }
            }
            None => tracing::warn!("Tesseract data not found, using the tesseract CLI"),
        }
    }

    tracing::info!(command = %settings.command, "Using tesseract CLI for OCR");
    Arc::new(TesseractCli::from_settings(settings))
}

/// Locates a tessdata directory holding `eng.traineddata`: configured path,
/// then `TESSDATA_PREFIX`, then common system locations.
pub fn find_tessdata_dir(configured: Option<&Path>) -> Option<PathBuf> {
    let has_eng = |dir: &Path| dir.join("eng.traineddata").exists();

    if let Some(dir) = configured {
        return has_eng(dir).then(|| dir.to_path_buf());
    }

    if let Ok(prefix) = std::env::var("TESSDATA_PREFIX") {
        let dir = PathBuf::from(prefix);
        if has_eng(dir.as_path()) {
            return Some(dir);
        }
    }

    [
        "/usr/share/tesseract-ocr/5/tessdata",
        "/usr/share/tesseract-ocr/4.00/tessdata",
        "/usr/share/tessdata",
        "/usr/local/share/tessdata",
        "/opt/homebrew/share/tessdata",
    ]
    .iter()
    .map(PathBuf::from)
    .find(|dir| has_eng(dir.as_path()))
}
