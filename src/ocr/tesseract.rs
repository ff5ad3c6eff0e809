use std::path::Path;

use tokio::process::Command;

use super::{OcrEngine, clean_lines};
use crate::error::{AppError, AppResult};

/// Runs the `tesseract` binary as `tesseract <image> stdout -l <lang>`.
pub struct TesseractCli {
    command: String,
    language: String,
}

impl TesseractCli {
    pub fn new(command: &str) -> Self {
        Self {
            command: command.to_string(),
            language: "eng".to_string(),
        }
    }

    pub fn with_language(mut self, language: &str) -> Self {
        self.language = language.to_string();
        self
    }
}

#[async_trait::async_trait]
impl OcrEngine for TesseractCli {
    async fn extract_lines(&self, image_path: &Path) -> AppResult<Vec<String>> {
        let output = Command::new(&self.command)
            .arg(image_path)
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .output()
            .await
            .map_err(|e| AppError::Ocr(format!("failed to run {}: {e}", self.command)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AppError::Ocr(format!(
                "{} exited with {}: {}",
                self.command,
                output.status,
                stderr.trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout);
        Ok(clean_lines(&text))
    }

    fn name(&self) -> &str {
        "tesseract-cli"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_binary_is_ocr_error() {
        let engine = TesseractCli::new("tesseract-binary-that-does-not-exist");
        let err = engine
            .extract_lines(Path::new("dashboard.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Ocr(_)));
        assert!(err.to_string().contains("failed to run"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_nonzero_exit_is_ocr_error() {
        let engine = TesseractCli::new("false");
        let err = engine
            .extract_lines(Path::new("dashboard.png"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("exited with"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stdout_becomes_lines() {
        // `echo` prints its arguments, standing in for tesseract's stdout.
        let engine = TesseractCli::new("echo").with_language("deu");
        let lines = engine
            .extract_lines(Path::new("dashboard.png"))
            .await
            .unwrap();
        assert_eq!(lines, vec!["dashboard.png stdout -l deu"]);
    }
}
