use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{AppError, AppResult};
use crate::llm::openai::GROQ_API_BASE;

#[derive(Clone)]
pub struct Config {
    pub environment: String,
    pub dashboard_url: String,
    pub llm_api_key: String,
    pub llm_api_base: String,
    pub llm_model: String,
    pub llm_temperature: f32,
    pub llm_max_tokens: u32,
    pub email_user: String,
    pub email_pass: String,
    pub email_to: Vec<String>,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub output_dir: PathBuf,
    pub export_timeout: Duration,
    pub tesseract_cmd: String,
    pub ocr_language: String,
    pub otel_service_name: String,
    pub otel_exporter_endpoint: String,
}

impl Config {
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Required keys that are
    /// missing or blank fail here, before anything touches the network.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> AppResult<String> {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| AppError::Config(format!("{key} must be set")))
        };
        let optional =
            |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let email_to: Vec<String> = required("EMAIL_TO")?
            .split(',')
            .map(|addr| addr.trim().to_string())
            .filter(|addr| !addr.is_empty())
            .collect();
        if email_to.is_empty() {
            return Err(AppError::Config(
                "EMAIL_TO must contain at least one address".into(),
            ));
        }

        Ok(Self {
            environment: optional("SCOUT_ENVIRONMENT", "development"),
            dashboard_url: required("TABLEAU_PUBLIC_URL")?,
            llm_api_key: required("GROQ_API_KEY")?,
            llm_api_base: optional("LLM_API_BASE", GROQ_API_BASE),
            llm_model: optional("LLM_MODEL", "llama-3.3-70b-versatile"),
            llm_temperature: parse_number("LLM_TEMPERATURE", &optional("LLM_TEMPERATURE", "0.3"))?,
            llm_max_tokens: parse_number("LLM_MAX_TOKENS", &optional("LLM_MAX_TOKENS", "1024"))?,
            email_user: required("EMAIL_USER")?,
            email_pass: required("EMAIL_PASS")?,
            email_to,
            smtp_host: required("SMTP_HOST")?,
            smtp_port: parse_number("SMTP_PORT", &optional("SMTP_PORT", "587"))?,
            output_dir: PathBuf::from(optional("OUTPUT_DIR", "output")),
            export_timeout: Duration::from_secs(parse_number(
                "EXPORT_TIMEOUT_SECS",
                &optional("EXPORT_TIMEOUT_SECS", "60"),
            )?),
            tesseract_cmd: optional("TESSERACT_CMD", "tesseract"),
            ocr_language: optional("OCR_LANGUAGE", "eng"),
            otel_service_name: optional("OTEL_SERVICE_NAME", "dashboard-insights-mailer"),
            otel_exporter_endpoint: optional(
                "OTEL_EXPORTER_OTLP_ENDPOINT",
                "http://localhost:4317",
            ),
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

const REDACTED: &str = "<redacted>";

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("environment", &self.environment)
            .field("dashboard_url", &self.dashboard_url)
            .field("llm_api_key", &REDACTED)
            .field("llm_api_base", &self.llm_api_base)
            .field("llm_model", &self.llm_model)
            .field("llm_temperature", &self.llm_temperature)
            .field("llm_max_tokens", &self.llm_max_tokens)
            .field("email_user", &self.email_user)
            .field("email_pass", &REDACTED)
            .field("email_to", &self.email_to)
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("output_dir", &self.output_dir)
            .field("export_timeout", &self.export_timeout)
            .field("tesseract_cmd", &self.tesseract_cmd)
            .field("ocr_language", &self.ocr_language)
            .field("otel_service_name", &self.otel_service_name)
            .field("otel_exporter_endpoint", &self.otel_exporter_endpoint)
            .finish()
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> AppResult<T> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::Config(format!("{key} must be a number, got {raw:?}")))
}
