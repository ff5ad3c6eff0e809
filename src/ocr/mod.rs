//! Text extraction from the exported dashboard image.

#[cfg(feature = "leptess")]
pub mod leptess;
pub mod tesseract;

use std::path::Path;

use crate::error::AppResult;

#[cfg(feature = "leptess")]
pub use self::leptess::LeptessEngine;
pub use tesseract::TesseractCli;

#[async_trait::async_trait]
pub trait OcrEngine: Send + Sync {
    /// Returns the recognised text lines, trimmed, without blank lines.
    async fn extract_lines(&self, image_path: &Path) -> AppResult<Vec<String>>;
    fn name(&self) -> &str;
}

pub(crate) fn clean_lines(raw: &str) -> Vec<String> {
    raw.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect()
}
