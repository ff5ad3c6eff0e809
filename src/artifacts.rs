use std::path::{Path, PathBuf};

use image::ImageFormat;

use crate::error::AppResult;

/// File stem of the exported image; the extension follows its format.
pub const IMAGE_STEM: &str = "dashboard";
pub const DOCUMENT_FILE: &str = "dashboard.pdf";
pub const SUMMARY_FILE: &str = "summary.txt";
pub const CARDS_FILE: &str = "insights.json";
pub const HTML_FILE: &str = "report.html";

/// Fixed per-run output location. Every run overwrites the same files.
#[derive(Debug, Clone)]
pub struct ArtifactDir {
    root: PathBuf,
}

/// A file to attach to the outgoing mail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentFile {
    pub path: PathBuf,
    pub file_name: String,
    pub content_type: &'static str,
}

impl ArtifactDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub async fn ensure(&self) -> AppResult<()> {
        tokio::fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    pub fn image(&self, format: ImageFormat) -> PathBuf {
        self.root.join(image_file_name(format))
    }

    pub fn document(&self) -> PathBuf {
        self.root.join(DOCUMENT_FILE)
    }

    pub fn summary(&self) -> PathBuf {
        self.root.join(SUMMARY_FILE)
    }

    pub fn cards(&self) -> PathBuf {
        self.root.join(CARDS_FILE)
    }

    pub fn html(&self) -> PathBuf {
        self.root.join(HTML_FILE)
    }

    pub async fn write(&self, path: &Path, contents: impl AsRef<[u8]>) -> AppResult<()> {
        tokio::fs::write(path, contents).await?;
        tracing::debug!(path = %path.display(), "Artifact written");
        Ok(())
    }

    /// Document, image and summary, in that order, skipping files that are
    /// not on disk.
    pub fn attachments(&self, image_format: ImageFormat) -> Vec<AttachmentFile> {
        [
            (DOCUMENT_FILE.to_string(), "application/pdf"),
            (image_file_name(image_format), image_format.to_mime_type()),
            (SUMMARY_FILE.to_string(), "text/plain; charset=utf-8"),
        ]
        .into_iter()
        .map(|(file_name, content_type)| AttachmentFile {
            path: self.root.join(&file_name),
            file_name,
            content_type,
        })
        .filter(|file| file.path.is_file())
        .collect()
    }
}

fn image_file_name(format: ImageFormat) -> String {
    let extension = format.extensions_str().first().copied().unwrap_or("img");
    format!("{IMAGE_STEM}.{extension}")
}
