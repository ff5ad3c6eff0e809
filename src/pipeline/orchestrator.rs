use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{Local, NaiveDate};
use uuid::Uuid;

use crate::artifacts::ArtifactDir;
use crate::config::Config;
use crate::error::AppResult;
use crate::export::{DashboardExporter, DashboardImage, DashboardSource};
use crate::llm::LlmClient;
use crate::llm::openai::OpenAICompatProvider;
use crate::mail::{InlineImage, MailSender, ReportMail, SmtpMailer};
use crate::ocr::OcrEngine;
use crate::telemetry::metrics::{REPORT_INSIGHT_CARDS, REPORT_RUN_DURATION};

use super::cards::{InsightCard, summary_to_cards};
use super::render::{RenderOptions, render_html, render_plain_text};
use super::summarize::SummarizeParams;
use super::{acquire, deliver, extract, summarize};

/// External collaborators of one run.
pub struct Pipeline {
    pub exporter: Box<dyn DashboardSource>,
    pub ocr: Box<dyn OcrEngine>,
    pub llm_client: LlmClient,
    pub mailer: Box<dyn MailSender>,
}

impl Pipeline {
    /// Wires the default collaborators. Nothing here opens a connection.
    pub fn from_config(config: &Config) -> AppResult<Self> {
        let exporter = DashboardExporter::new(&config.dashboard_url, config.export_timeout)?;
        let provider = OpenAICompatProvider::new(&config.llm_api_key, &config.llm_api_base);
        let mailer = SmtpMailer::new(
            &config.smtp_host,
            config.smtp_port,
            &config.email_user,
            &config.email_pass,
        )?;

        Ok(Self {
            exporter: Box::new(exporter),
            ocr: default_ocr_engine(config),
            llm_client: LlmClient::new(Arc::new(provider)),
            mailer: Box::new(mailer),
        })
    }
}

#[cfg(not(feature = "leptess"))]
fn default_ocr_engine(config: &Config) -> Box<dyn OcrEngine> {
    Box::new(
        crate::ocr::TesseractCli::new(&config.tesseract_cmd).with_language(&config.ocr_language),
    )
}

#[cfg(feature = "leptess")]
fn default_ocr_engine(config: &Config) -> Box<dyn OcrEngine> {
    Box::new(crate::ocr::LeptessEngine::new(None, &config.ocr_language))
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: Uuid,
    pub cards: Vec<InsightCard>,
    pub recipients: usize,
    pub llm_model: String,
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub duration: Duration,
}

/// Inputs for the mail body, gathered from the earlier stages.
pub struct MailContent<'a> {
    pub dashboard_url: &'a str,
    pub cards: &'a [InsightCard],
    pub image: &'a DashboardImage,
    pub image_cid: String,
    pub report_date: NaiveDate,
}

pub fn build_report_mail(content: MailContent<'_>) -> ReportMail {
    let html = render_html(
        content.dashboard_url,
        content.cards,
        &RenderOptions {
            image_cid: Some(&content.image_cid),
            report_date: content.report_date,
        },
    );
    let plain_text = render_plain_text(content.dashboard_url, content.cards, content.report_date);

    ReportMail {
        subject: format!("Daily BI Insights - {}", content.report_date),
        plain_text,
        html,
        inline_image: Some(InlineImage {
            content_id: content.image_cid,
            content_type: content.image.mime_type().to_string(),
            bytes: content.image.bytes.clone(),
        }),
        attachments: Vec::new(),
    }
}

#[tracing::instrument(
    name = "pipeline report",
    skip(config, pipeline),
    fields(
        report.run_id,
        report.cards,
        report.duration_ms,
    )
)]
pub async fn run_daily_report(config: &Config, pipeline: &Pipeline) -> AppResult<RunReport> {
    let start = Instant::now();
    let run_id = Uuid::new_v4();
    let span = tracing::Span::current();
    span.record("report.run_id", run_id.to_string());

    let artifacts = ArtifactDir::new(&config.output_dir);
    artifacts.ensure().await?;

    // Stage 1: Export dashboard image and document
    let image = acquire::acquire(pipeline.exporter.as_ref(), &artifacts).await?;

    // Stage 2: OCR the image
    let image_path = artifacts.image(image.format);
    let ocr_lines = extract::extract(pipeline.ocr.as_ref(), &image_path).await?;

    // Stage 3: Insight text from the LLM
    let summary = summarize::summarize(
        &pipeline.llm_client,
        &SummarizeParams {
            model: &config.llm_model,
            temperature: config.llm_temperature,
            max_tokens: config.llm_max_tokens,
        },
        &ocr_lines,
    )
    .await?;
    artifacts.write(&artifacts.summary(), &summary.text).await?;

    // Stage 4: Parse into cards
    let cards = summary_to_cards(&summary.text);
    artifacts
        .write(&artifacts.cards(), serde_json::to_vec_pretty(&cards)?)
        .await?;

    // Stage 5: Render the mail body
    let mail = build_report_mail(MailContent {
        dashboard_url: &config.dashboard_url,
        cards: &cards,
        image: &image,
        image_cid: format!("dashboard-{}", run_id.simple()),
        report_date: Local::now().date_naive(),
    });
    artifacts.write(&artifacts.html(), &mail.html).await?;

    // Stage 6: Send
    deliver::deliver(
        pipeline.mailer.as_ref(),
        &config.email_user,
        &config.email_to,
        mail,
        &artifacts,
        image.format,
    )
    .await?;

    let duration = start.elapsed();
    REPORT_RUN_DURATION.record(duration.as_secs_f64(), &[]);
    REPORT_INSIGHT_CARDS.record(cards.len() as f64, &[]);

    span.record("report.cards", cards.len());
    span.record("report.duration_ms", duration.as_millis() as u64);

    Ok(RunReport {
        run_id,
        cards,
        recipients: config.email_to.len(),
        llm_model: summary.model,
        input_tokens: summary.input_tokens,
        output_tokens: summary.output_tokens,
        duration,
    })
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::config::tests::{base_vars, load};
    use crate::export::tests::{FixedSource, png_image};
    use crate::llm::client::tests::ScriptedProvider;
    use crate::pipeline::deliver::tests::RecordingSender;
    use crate::pipeline::extract::tests::{BrokenOcr, FixedOcr};

    const REPLY: &str = "Insight 1: Sales rose\nAction: Increase budget";

    fn test_config(dir: &Path) -> Config {
        let mut config = load(&base_vars()).unwrap();
        config.output_dir = dir.join("output");
        config
    }

    fn test_pipeline(
        ocr: Box<dyn OcrEngine>,
        provider: Arc<ScriptedProvider>,
        sender: &RecordingSender,
    ) -> Pipeline {
        Pipeline {
            exporter: Box::new(FixedSource::png()),
            ocr,
            llm_client: LlmClient::new(provider),
            mailer: Box::new(sender.clone()),
        }
    }

    #[test]
    fn test_build_report_mail() {
        let cards = summary_to_cards(REPLY);
        let image = png_image();
        let mail = build_report_mail(MailContent {
            dashboard_url: "https://public.tableau.com/views/Sales/Overview",
            cards: &cards,
            image: &image,
            image_cid: "dashboard-run1".to_string(),
            report_date: NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
        });

        assert_eq!(mail.subject, "Daily BI Insights - 2026-10-19");
        assert!(mail.html.contains("src=\"cid:dashboard-run1\""));
        assert!(mail.html.contains("Sales rose"));
        assert!(mail.plain_text.contains("Action: Increase budget"));
        let inline = mail.inline_image.unwrap();
        assert_eq!(inline.content_id, "dashboard-run1");
        assert_eq!(inline.content_type, "image/png");
        assert!(mail.attachments.is_empty());
    }

    #[test]
    fn test_build_report_mail_zero_cards() {
        let image = png_image();
        let mail = build_report_mail(MailContent {
            dashboard_url: "https://example.com",
            cards: &[],
            image: &image,
            image_cid: "dashboard-run2".to_string(),
            report_date: NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
        });
        assert!(mail.html.contains("<div class=\"cards\">\n</div>"));
    }

    #[tokio::test]
    async fn test_pipeline_from_config_does_not_connect() {
        let config = load(&base_vars()).unwrap();
        let pipeline = Pipeline::from_config(&config).unwrap();
        #[cfg(not(feature = "leptess"))]
        assert_eq!(pipeline.ocr.name(), "tesseract-cli");
        assert_eq!(pipeline.llm_client.provider_name(), "groq");
    }

    #[tokio::test]
    async fn test_run_daily_report_end_to_end() {
        let tmp = tempfile::tempdir().unwrap();
        let config = test_config(tmp.path());
        let provider = Arc::new(ScriptedProvider::replying(REPLY));
        let sender = RecordingSender::default();
        let pipeline = test_pipeline(
            Box::new(FixedOcr(vec!["Revenue 120,000", "Profit 40,000"])),
            provider.clone(),
            &sender,
        );

        let report = run_daily_report(&config, &pipeline).await.unwrap();

        assert_eq!(report.cards.len(), 1);
        assert_eq!(report.cards[0].title, "Insight 1");
        assert_eq!(report.recipients, 1);
        assert_eq!(report.llm_model, "llama-3.3-70b-versatile");
        assert_eq!((report.input_tokens, report.output_tokens), (120, 40));

        // OCR output reached the prompt.
        assert!(provider.prompts.lock().unwrap()[0].contains("Revenue 120,000\nProfit 40,000"));

        let out = tmp.path().join("output");
        assert!(out.join("dashboard.png").is_file());
        assert!(out.join("dashboard.pdf").is_file());
        assert_eq!(std::fs::read_to_string(out.join("summary.txt")).unwrap(), REPLY);
        let stored: Vec<InsightCard> =
            serde_json::from_slice(&std::fs::read(out.join("insights.json")).unwrap()).unwrap();
        assert_eq!(stored, report.cards);
        let html = std::fs::read_to_string(out.join("report.html")).unwrap();
        assert!(html.contains("Sales rose"));
        assert!(html.contains(&format!("cid:dashboard-{}", report.run_id.simple())));

        let sent = sender.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        let raw = &sent[0];
        assert!(raw.contains("Subject: Daily BI Insights - "));
        assert!(raw.contains("To: team@example.com"));
        assert!(raw.contains(&format!("Content-ID: <dashboard-{}>", report.run_id.simple())));
        assert!(raw.contains("filename=\"dashboard.pdf\""));
        assert!(raw.contains("filename=\"dashboard.png\""));
        assert!(raw.contains("filename=\"summary.txt\""));
    }

    #[tokio::test]
    async fn test_ocr_failure_aborts_before_send() {
        let tmp = tempfile::tempdir().unwrap();
        let config = test_config(tmp.path());
        let provider = Arc::new(ScriptedProvider::replying(REPLY));
        let sender = RecordingSender::default();
        let pipeline = test_pipeline(Box::new(BrokenOcr), provider.clone(), &sender);

        let err = run_daily_report(&config, &pipeline).await.unwrap_err();

        assert_eq!(err.kind(), "ocr");
        assert!(provider.prompts.lock().unwrap().is_empty());
        assert!(sender.sent.lock().unwrap().is_empty());
        assert!(!tmp.path().join("output").join("summary.txt").exists());
    }

    #[tokio::test]
    async fn test_llm_failure_aborts_before_send() {
        let tmp = tempfile::tempdir().unwrap();
        let config = test_config(tmp.path());
        let sender = RecordingSender::default();
        let pipeline = test_pipeline(
            Box::new(FixedOcr(vec!["Revenue 120,000"])),
            Arc::new(ScriptedProvider::failing("503 service unavailable")),
            &sender,
        );

        let err = run_daily_report(&config, &pipeline).await.unwrap_err();

        assert_eq!(err.kind(), "llm");
        assert!(sender.sent.lock().unwrap().is_empty());
        assert!(!tmp.path().join("output").join("report.html").exists());
    }
}
