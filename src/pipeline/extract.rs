use std::path::Path;

use crate::error::AppResult;
use crate::ocr::OcrEngine;

/// Stage 2: OCR the stored dashboard image.
#[tracing::instrument(
    name = "pipeline_stage extract",
    skip(engine),
    fields(
        pipeline.stage = "extract",
        ocr.engine = engine.name(),
        ocr.lines,
    )
)]
pub async fn extract(engine: &dyn OcrEngine, image_path: &Path) -> AppResult<Vec<String>> {
    let lines = engine.extract_lines(image_path).await?;

    tracing::Span::current().record("ocr.lines", lines.len());
    if lines.is_empty() {
        tracing::warn!(path = %image_path.display(), "OCR recognised no text");
    }

    Ok(lines)
}
