use std::io::Cursor;
use std::time::Duration;

use image::{ImageFormat, ImageReader};

use crate::error::{AppError, AppResult};

/// Export URLs derived from the dashboard's public URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportUrls {
    /// Tried in order until one returns an image.
    pub image_variants: Vec<String>,
    pub document: String,
}

impl ExportUrls {
    pub fn from_dashboard_url(dashboard_url: &str) -> Self {
        let base = dashboard_url
            .split(['?', '#'])
            .next()
            .unwrap_or(dashboard_url)
            .trim_end_matches('/');

        Self {
            image_variants: vec![format!("{base}.png"), format!("{base}?:format=png")],
            document: format!("{base}.pdf"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DashboardImage {
    pub bytes: Vec<u8>,
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
    pub source_url: String,
}

impl DashboardImage {
    pub fn mime_type(&self) -> &'static str {
        self.format.to_mime_type()
    }
}

/// Where a run gets its dashboard renderings from.
#[async_trait::async_trait]
pub trait DashboardSource: Send + Sync {
    async fn fetch_image(&self) -> AppResult<DashboardImage>;
    async fn fetch_document(&self) -> AppResult<Vec<u8>>;
}

pub struct DashboardExporter {
    client: reqwest::Client,
    urls: ExportUrls,
}

impl DashboardExporter {
    pub fn new(dashboard_url: &str, timeout: Duration) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            urls: ExportUrls::from_dashboard_url(dashboard_url),
        })
    }

    async fn try_image_variant(&self, url: &str) -> Result<DashboardImage, String> {
        let response = self.client.get(url).send().await.map_err(|e| e.to_string())?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("status {status}"));
        }

        let bytes = response.bytes().await.map_err(|e| e.to_string())?.to_vec();
        let (format, width, height) = inspect_image(&bytes)?;

        Ok(DashboardImage {
            bytes,
            format,
            width,
            height,
            source_url: url.to_string(),
        })
    }
}

#[async_trait::async_trait]
impl DashboardSource for DashboardExporter {
    /// Returns the first variant that answers 2xx with a decodable image body.
    async fn fetch_image(&self) -> AppResult<DashboardImage> {
        let mut failures = Vec::new();

        for url in &self.urls.image_variants {
            match self.try_image_variant(url).await {
                Ok(image) => {
                    tracing::info!(
                        url = %url,
                        bytes = image.bytes.len(),
                        width = image.width,
                        height = image.height,
                        "Dashboard image exported"
                    );
                    return Ok(image);
                }
                Err(reason) => {
                    tracing::warn!(url = %url, reason = %reason, "Image export variant failed");
                    failures.push(format!("{url}: {reason}"));
                }
            }
        }

        Err(AppError::Export(format!(
            "no image export variant succeeded ({})",
            failures.join("; ")
        )))
    }

    async fn fetch_document(&self) -> AppResult<Vec<u8>> {
        let url = &self.urls.document;
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Export(format!(
                "document export returned {status} for {url}"
            )));
        }

        let bytes = response.bytes().await?.to_vec();
        tracing::info!(url = %url, bytes = bytes.len(), "Dashboard document exported");

        Ok(bytes)
    }
}

/// Export endpoints answer 200 with an HTML page when a view is missing, so
/// the body itself has to be checked.
pub(crate) fn inspect_image(bytes: &[u8]) -> Result<(ImageFormat, u32, u32), String> {
    if bytes.is_empty() {
        return Err("empty body".to_string());
    }

    let format = image::guess_format(bytes).map_err(|_| "body is not an image".to_string())?;

    let (width, height) = ImageReader::with_format(Cursor::new(bytes), format)
        .into_dimensions()
        .map_err(|e| format!("unreadable {format:?} image: {e}"))?;

    if width == 0 || height == 0 {
        return Err("image has zero width or height".to_string());
    }

    Ok((format, width, height))
}
