use crate::config::GenerationConfig;
use crate::constants::endpoints;
use crate::error::DeckError;
use crate::llm::traits::*;
use serde::{Deserialize, Serialize};

/// Client for OpenAI-compatible `chat/completions` endpoints.
pub struct OpenAIClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAIClient {
    pub fn new(config: GenerationConfig) -> Result<Self, DeckError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| DeckError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: config.api_key,
            model: config.model,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, endpoints::CHAT_COMPLETIONS_PATH)
    }

    fn build_request<'a>(&'a self, messages: &'a [Message]) -> OpenAIRequest<'a> {
        OpenAIRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

#[derive(Debug, Serialize)]
struct OpenAIRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    #[serde(default)]
    choices: Vec<OpenAIChoice>,
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAIMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

fn parse_response(body: &str) -> Result<LlmResponse, DeckError> {
    let api_response: OpenAIResponse = serde_json::from_str(body)
        .map_err(|e| DeckError::Llm(format!("Failed to parse response: {e}")))?;

    let choice = api_response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| DeckError::Llm("No response from API".into()))?;

    Ok(LlmResponse {
        message: Message::assistant(choice.message.content.unwrap_or_default()),
        usage: api_response.usage.map(|u| Usage {
            input_tokens: u.prompt_tokens,
            output_tokens: u.completion_tokens,
        }),
    })
}

#[async_trait::async_trait]
impl LlmClient for OpenAIClient {
    async fn chat(&self, messages: &[Message]) -> Result<LlmResponse, DeckError> {
        if messages.is_empty() {
            return Err(DeckError::Input("message list is empty".into()));
        }

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&self.build_request(messages))
            .send()
            .await?;

        let status = response.status();
        let response_text = response.text().await?;

        if !status.is_success() {
            return Err(DeckError::Llm(format!(
                "OpenAI API error ({}): {}",
                status, response_text
            )));
        }

        let parsed = parse_response(&response_text)?;
        if let Some(usage) = parsed.usage {
            tracing::debug!(
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                "generation usage"
            );
        }
        Ok(parsed)
    }
}
