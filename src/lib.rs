pub mod artifacts;
pub mod config;
pub mod error;
pub mod export;
pub mod llm;
pub mod mail;
pub mod ocr;
pub mod pipeline;
pub mod telemetry;

pub use config::Config;
pub use error::{AppError, AppResult};
