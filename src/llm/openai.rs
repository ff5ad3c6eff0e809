use async_openai::{
    Client,
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
        ChatCompletionRequestSystemMessageContent, ChatCompletionRequestUserMessage,
        ChatCompletionRequestUserMessageContent, CreateChatCompletionRequest,
    },
};

use super::{GenerateRequest, GenerateResponse, Provider};

pub const GROQ_API_BASE: &str = "https://api.groq.com/openai/v1";

/// Chat-completion provider for any OpenAI-compatible endpoint (Groq by default).
pub struct OpenAICompatProvider {
    client: Client<OpenAIConfig>,
    provider_name: String,
    server_address: String,
    server_port: u16,
}

impl OpenAICompatProvider {
    pub fn new(api_key: &str, api_base: &str) -> Self {
        let api_base = api_base.trim_end_matches('/');
        let config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(api_base);
        Self {
            client: Client::with_config(config),
            provider_name: provider_name_for(api_base).to_string(),
            server_address: host_of(api_base),
            server_port: port_of(api_base),
        }
    }
}

fn provider_name_for(api_base: &str) -> &'static str {
    let host = host_of(api_base);
    if host.ends_with("groq.com") {
        "groq"
    } else if host.ends_with("openai.com") {
        "openai"
    } else if host == "localhost" || host == "127.0.0.1" {
        "ollama"
    } else {
        "openai_compatible"
    }
}

fn host_of(api_base: &str) -> String {
    reqwest::Url::parse(api_base)
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))
        .unwrap_or_else(|| "unknown".to_string())
}

/// Explicit port, else the scheme default (443 for https, 80 for http).
fn port_of(api_base: &str) -> u16 {
    reqwest::Url::parse(api_base)
        .ok()
        .and_then(|url| url.port_or_known_default())
        .unwrap_or(443)
}

#[async_trait::async_trait]
impl Provider for OpenAICompatProvider {
    async fn generate(&self, req: &GenerateRequest) -> anyhow::Result<GenerateResponse> {
        let messages = vec![
            ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
                content: ChatCompletionRequestSystemMessageContent::Text(req.system.clone()),
                name: None,
            }),
            ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
                content: ChatCompletionRequestUserMessageContent::Text(req.prompt.clone()),
                name: None,
            }),
        ];

        #[allow(deprecated)]
        let request = CreateChatCompletionRequest {
            model: req.model.clone(),
            messages,
            temperature: Some(req.temperature),
            max_completion_tokens: Some(req.max_tokens),
            ..Default::default()
        };

        let response = self.client.chat().create(request).await?;

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default();

        let finish_reason = response
            .choices
            .first()
            .and_then(|c| c.finish_reason)
            .map(|r| format!("{r:?}").to_lowercase())
            .unwrap_or_default();

        let (input_tokens, output_tokens) = match &response.usage {
            Some(usage) => (usage.prompt_tokens, usage.completion_tokens),
            None => (0, 0),
        };

        Ok(GenerateResponse {
            content,
            model: response.model,
            input_tokens,
            output_tokens,
            finish_reason,
        })
    }

    fn name(&self) -> &str {
        &self.provider_name
    }

    fn server_address(&self) -> &str {
        &self.server_address
    }

    fn server_port(&self) -> u16 {
        self.server_port
    }
}
