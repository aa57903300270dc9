use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::block_on;

pub const OPENROUTER_ENDPOINT: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const DIGEST_MODEL: &str = "anthropic/claude-sonnet-4.5";
pub const MAX_COMPLETION_TOKENS: u32 = 4_096;

const REFERER: &str = "https://aws.lambda.eu-west-2.rss-substack-reader";
const COMPLETION_TIMEOUT: Duration = Duration::from_secs(300);

pub trait ChatCompletion {
    fn complete(&self, prompt: &str) -> Result<String, String>;
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage<'a>>,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ChatMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ChatChoice {
    pub message: ChatReply,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ChatReply {
    pub content: String,
}

pub fn build_chat_request(prompt: &str) -> ChatRequest<'_> {
    ChatRequest {
        model: DIGEST_MODEL,
        messages: vec![ChatMessage {
            role: "user",
            content: prompt,
        }],
        max_tokens: MAX_COMPLETION_TOKENS,
    }
}

pub fn completion_text(response: ChatResponse) -> Result<String, String> {
    response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .ok_or_else(|| "completion response contained no choices".to_string())
}

/// Chat-completions client for the OpenRouter API.
#[derive(Debug, Clone)]
pub struct OpenRouterClient {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl OpenRouterClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(COMPLETION_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            endpoint: OPENROUTER_ENDPOINT.to_string(),
        })
    }
}

impl ChatCompletion for OpenRouterClient {
    fn complete(&self, prompt: &str) -> Result<String, String> {
        let request = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .header("HTTP-Referer", REFERER)
            .json(&build_chat_request(prompt));

        block_on(async move {
            let response = request
                .send()
                .await
                .map_err(|error| format!("failed to call completion endpoint: {error}"))?
                .error_for_status()
                .map_err(|error| format!("completion endpoint rejected request: {error}"))?;
            let parsed: ChatResponse = response
                .json()
                .await
                .map_err(|error| format!("malformed completion response: {error}"))?;
            completion_text(parsed)
        })
    }
}
