use crate::error::{AppError, AppResult};
use crate::llm::{GenerateRequest, LlmClient};

const SYSTEM_PROMPT: &str = "You are a senior business intelligence analyst. \
    You read text captured from a dashboard screenshot and write short, concrete \
    insights for a business audience. Use plain text only, no markdown.";

const NO_TEXT_NOTICE: &str = "(no text could be recognised in the dashboard image)";

/// Model settings for the summarize call.
#[derive(Debug, Clone)]
pub struct SummarizeParams<'a> {
    pub model: &'a str,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Clone)]
pub struct Summary {
    pub text: String,
    pub model: String,
    pub input_tokens: u32,
    pub output_tokens: u32,
}

pub fn build_prompt(ocr_lines: &[String]) -> String {
    let extracted = if ocr_lines.is_empty() {
        NO_TEXT_NOTICE.to_string()
    } else {
        ocr_lines.join("\n")
    };

    format!(
        "Below is the text extracted by OCR from today's business dashboard.\n\n\
        DASHBOARD TEXT:\n{extracted}\n\n\
        Write exactly 3 insights. Use this format for each one, and separate \
        insights with a blank line:\n\n\
        Insight 1: <one or two sentences describing what the numbers show>\n\
        Action: <one concrete recommended action>\n\n\
        Refer to actual figures from the dashboard text when available. \
        Do not add an introduction or a closing remark."
    )
}

/// Stage 3: ask the LLM for insight text.
#[tracing::instrument(
    name = "pipeline_stage summarize",
    skip(llm_client, params, ocr_lines),
    fields(
        pipeline.stage = "summarize",
        summarize.ocr_lines = ocr_lines.len(),
        summarize.chars,
    )
)]
pub async fn summarize(
    llm_client: &LlmClient,
    params: &SummarizeParams<'_>,
    ocr_lines: &[String],
) -> AppResult<Summary> {
    let resp = llm_client
        .generate(&GenerateRequest {
            model: params.model.to_string(),
            system: SYSTEM_PROMPT.to_string(),
            prompt: build_prompt(ocr_lines),
            temperature: params.temperature,
            max_tokens: params.max_tokens,
            stage: "summarize".to_string(),
        })
        .await
        .map_err(|e| AppError::Llm(e.to_string()))?;

    let text = resp.content.trim().to_string();
    if text.is_empty() {
        tracing::warn!(
            provider = llm_client.provider_name(),
            "LLM returned an empty completion"
        );
    }

    tracing::Span::current().record("summarize.chars", text.len());

    Ok(Summary {
        text,
        model: resp.model,
        input_tokens: resp.input_tokens,
        output_tokens: resp.output_tokens,
    })
}
