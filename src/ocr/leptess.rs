use std::path::{Path, PathBuf};

use super::{OcrEngine, clean_lines};
use crate::error::{AppError, AppResult};

/// In-process Tesseract through `leptess`. Recognition is blocking, so it
/// runs on the blocking pool.
pub struct LeptessEngine {
    tessdata_path: Option<PathBuf>,
    language: String,
}

impl LeptessEngine {
    pub fn new(tessdata_path: Option<PathBuf>, language: &str) -> Self {
        Self {
            tessdata_path,
            language: language.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl OcrEngine for LeptessEngine {
    async fn extract_lines(&self, image_path: &Path) -> AppResult<Vec<String>> {
        let tessdata = self
            .tessdata_path
            .as_ref()
            .map(|p| p.to_string_lossy().to_string());
        let language = self.language.clone();
        let image_path = image_path.to_path_buf();

        let text = tokio::task::spawn_blocking(move || -> AppResult<String> {
            let mut lt = ::leptess::LepTess::new(tessdata.as_deref(), &language)
                .map_err(|e| AppError::Ocr(format!("tesseract init failed: {e}")))?;
            lt.set_image(&image_path)
                .map_err(|_| AppError::Ocr(format!("cannot load {}", image_path.display())))?;
            lt.get_utf8_text()
                .map_err(|e| AppError::Ocr(format!("text extraction failed: {e}")))
        })
        .await
        .map_err(|e| AppError::Ocr(format!("OCR task failed: {e}")))??;

        Ok(clean_lines(&text))
    }

    fn name(&self) -> &str {
        "leptess"
    }
}
