use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("OCR error: {0}")]
    Ocr(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Email error: {0}")]
    Email(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AppError {
    /// Short label used as `error.type` on spans and log records.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Config(_) => "config",
            AppError::Export(_) => "export",
            AppError::Ocr(_) => "ocr",
            AppError::Llm(_) => "llm",
            AppError::Email(_) => "email",
            AppError::Io(_) => "io",
            AppError::Http(_) => "http",
            AppError::Serialization(_) => "serialization",
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error() {
        let error = AppError::Config("EMAIL_TO must be set".to_string());
        assert_eq!(error.to_string(), "Configuration error: EMAIL_TO must be set");
    }

    #[test]
    fn test_export_error() {
        let error = AppError::Export("no image variant succeeded".to_string());
        assert_eq!(error.to_string(), "Export error: no image variant succeeded");
    }

    #[test]
    fn test_llm_error() {
        let error = AppError::Llm("provider timeout".to_string());
        assert_eq!(error.to_string(), "LLM error: provider timeout");
    }

    #[test]
    fn test_io_error_from() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let error: AppError = io.into();
        assert_eq!(error.kind(), "io");
        assert_eq!(error.to_string(), "I/O error: gone");
    }

    #[test]
    fn test_error_kinds() {
        let cases = vec![
            (AppError::Config("x".into()), "config"),
            (AppError::Export("x".into()), "export"),
            (AppError::Ocr("x".into()), "ocr"),
            (AppError::Llm("x".into()), "llm"),
            (AppError::Email("x".into()), "email"),
        ];
        for (error, expected) in cases {
            assert_eq!(error.kind(), expected);
        }
    }

    #[test]
    fn test_app_result_err() {
        fn returns_err() -> AppResult<i32> {
            Err(AppError::Ocr("tesseract exited with 1".to_string()))
        }
        assert!(returns_err().is_err());
    }
}
