use opentelemetry::KeyValue;

use crate::artifacts::ArtifactDir;
use crate::error::AppResult;
use crate::export::{DashboardImage, DashboardSource};
use crate::telemetry::metrics::REPORT_EXPORT_BYTES;

/// Stage 1: export the dashboard as image and document and store both.
#[tracing::instrument(
    name = "pipeline_stage acquire",
    skip(source, artifacts),
    fields(
        pipeline.stage = "acquire",
        export.image_url,
        export.image_format,
        export.image_bytes,
        export.document_bytes,
    )
)]
pub async fn acquire(
    source: &dyn DashboardSource,
    artifacts: &ArtifactDir,
) -> AppResult<DashboardImage> {
    let image = source.fetch_image().await?;
    artifacts.write(&artifacts.image(image.format), &image.bytes).await?;

    let document = source.fetch_document().await?;
    artifacts.write(&artifacts.document(), &document).await?;

    REPORT_EXPORT_BYTES.record(
        image.bytes.len() as f64,
        &[KeyValue::new("export.kind", "image")],
    );
    REPORT_EXPORT_BYTES.record(
        document.len() as f64,
        &[KeyValue::new("export.kind", "document")],
    );

    let span = tracing::Span::current();
    span.record("export.image_url", image.source_url.as_str());
    span.record("export.image_format", image.mime_type());
    span.record("export.image_bytes", image.bytes.len());
    span.record("export.document_bytes", document.len());

    Ok(image)
}

#[cfg(test)]
mod tests {
    use image::ImageFormat;

    use super::*;
    use crate::export::tests::{FixedSource, tiny_jpeg};

    #[tokio::test]
    async fn test_acquire_writes_png_and_pdf() {
        let tmp = tempfile::tempdir().unwrap();
        let artifacts = ArtifactDir::new(tmp.path());

        let image = acquire(&FixedSource::png(), &artifacts).await.unwrap();

        assert_eq!(image.format, ImageFormat::Png);
        assert!(tmp.path().join("dashboard.png").is_file());
        assert_eq!(
            std::fs::read(tmp.path().join("dashboard.pdf")).unwrap(),
            b"%PDF-1.4 dashboard"
        );
    }

    #[tokio::test]
    async fn test_acquire_jpeg_export_is_stored_as_jpeg() {
        let tmp = tempfile::tempdir().unwrap();
        let artifacts = ArtifactDir::new(tmp.path());
        let mut source = FixedSource::png();
        source.image.bytes = tiny_jpeg();
        source.image.format = ImageFormat::Jpeg;

        let image = acquire(&source, &artifacts).await.unwrap();

        assert!(tmp.path().join("dashboard.jpg").is_file());
        assert!(!tmp.path().join("dashboard.png").exists());
        let names: Vec<_> = artifacts
            .attachments(image.format)
            .into_iter()
            .map(|a| (a.file_name, a.content_type))
            .collect();
        assert_eq!(
            names,
            vec![
                ("dashboard.pdf".to_string(), "application/pdf"),
                ("dashboard.jpg".to_string(), "image/jpeg"),
            ]
        );
    }
}
