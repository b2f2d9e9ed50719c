use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;

use super::{OcrEngine, OcrError};

/// In-process Tesseract via libtesseract.
#[derive(Debug, Clone)]
pub struct TesseractOcr {
    tessdata_dir: PathBuf,
    language: String,
    timeout: Duration,
}

impl TesseractOcr {
    /// Every `+`-joined language must have its traineddata in `tessdata_dir`.
    pub fn new(tessdata_dir: &Path, language: &str, timeout: Duration) -> Result<Self, OcrError> {
        let missing = language
            .split('+')
            .any(|lang| !tessdata_dir.join(format!("{lang}.traineddata")).exists());
        if missing {
            return Err(OcrError::TessdataNotFound(tessdata_dir.to_path_buf()));
        }

        Ok(Self {
            tessdata_dir: tessdata_dir.to_path_buf(),
            language: language.to_string(),
            timeout,
        })
    }

    fn ocr_image(tessdata: &str, language: &str, image_bytes: &[u8]) -> Result<String, OcrError> {
        let tess = tesseract::Tesseract::new(Some(tessdata), Some(language))
            .map_err(|e| OcrError::Init(format!("{e:?}")))?;

        let mut tess = tess
            .set_image_from_mem(image_bytes)
            .map_err(|e| OcrError::Processing(format!("{e:?}")))?;

        tess.get_text()
            .map_err(|e| OcrError::Processing(format!("{e:?}")))
    }
}

#[async_trait]
impl OcrEngine for TesseractOcr {
    async fn recognize(&self, image_path: &Path) -> Result<String, OcrError> {
        tracing::info!("Processing OCR for {}", image_path.display());

        let image_bytes = tokio::fs::read(image_path)
            .await
            .map_err(|source| OcrError::Read {
                path: image_path.to_path_buf(),
                source,
            })?;

        let tessdata = self
            .tessdata_dir
            .to_str()
            .ok_or_else(|| OcrError::Init("Invalid tessdata path".into()))?
            .to_string();
        let language = self.language.clone();

        let task = tokio::task::spawn_blocking(move || {
            Self::ocr_image(&tessdata, &language, &image_bytes)
        });

        tokio::time::timeout(self.timeout, task)
            .await
            .map_err(|_| OcrError::Timeout(self.timeout))?
            .map_err(|e| OcrError::Processing(e.to_string()))?
    }
}
