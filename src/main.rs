use insights_mailer::pipeline::{Pipeline, run_daily_report};
use insights_mailer::telemetry::init_telemetry;
use insights_mailer::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Loaded before anything else so a missing setting aborts the run
    // without any network traffic.
    let config = Config::from_env()?;

    let telemetry_guard = init_telemetry(&config)?;

    tracing::info!(
        environment = %config.environment,
        output_dir = %config.output_dir.display(),
        model = %config.llm_model,
        "Starting dashboard-insights-mailer"
    );

    let result = match Pipeline::from_config(&config) {
        Ok(pipeline) => run_daily_report(&config, &pipeline).await,
        Err(err) => Err(err),
    };

    match &result {
        Ok(report) => tracing::info!(
            run_id = %report.run_id,
            cards = report.cards.len(),
            recipients = report.recipients,
            llm.model = %report.llm_model,
            llm.input_tokens = report.input_tokens,
            llm.output_tokens = report.output_tokens,
            duration_ms = report.duration.as_millis() as u64,
            "Email sent successfully"
        ),
        Err(err) => tracing::error!(
            error = %err,
            error.type = err.kind(),
            "Insights run failed"
        ),
    }

    telemetry_guard.shutdown();

    result?;
    Ok(())
}
