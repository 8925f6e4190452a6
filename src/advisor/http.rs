//! HTTP advisor backed by an Anthropic or OpenAI-compatible completion API.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{AdviceFuture, Advisor, AdvisorError};

pub const DEFAULT_API_URL: &str = "https://api.anthropic.com/v1/messages";
pub const DEFAULT_MODEL: &str = "claude-3-haiku-20240307";

const MAX_TOKENS: u32 = 256;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiFormat {
    Anthropic,
    OpenAi,
}

impl ApiFormat {
    /// Anthropic for its own host, OpenAI-compatible for everything else.
    pub fn detect(url: &str) -> Self {
        if url.contains("anthropic.com") {
            ApiFormat::Anthropic
        } else {
            ApiFormat::OpenAi
        }
    }
}

pub struct HttpAdvisor {
    client: Client,
    api_key: String,
    api_url: String,
    model: String,
    format: ApiFormat,
}

impl HttpAdvisor {
    pub fn new(api_key: String, api_url: String, model: String) -> Result<Self, AdvisorError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| AdvisorError::Transport(err.to_string()))?;
        Ok(Self {
            client,
            format: ApiFormat::detect(&api_url),
            api_key,
            api_url,
            model,
        })
    }

    /// Required: `LLM_API_KEY`. Optional: `LLM_API_URL` and `LLM_MODEL`.
    pub fn from_env() -> Result<Self, AdvisorError> {
        let api_key = std::env::var("LLM_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or(AdvisorError::MissingApiKey)?;
        let api_url = std::env::var("LLM_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.into());
        let model = std::env::var("LLM_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into());
        Self::new(api_key, api_url, model)
    }

    pub fn format(&self) -> ApiFormat {
        self.format
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, prompt: &str) -> Result<String, AdvisorError> {
        let messages = vec![Message {
            role: "user",
            content: prompt,
        }];
        let request = self.client.post(&self.api_url).json(&CompletionRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            messages,
        });
        let request = match self.format {
            ApiFormat::Anthropic => request
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", "2023-06-01"),
            ApiFormat::OpenAi => request.bearer_auth(&self.api_key),
        };

        let response = request
            .send()
            .await
            .map_err(|err| AdvisorError::Transport(err.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| AdvisorError::Transport(err.to_string()))?;
        if !status.is_success() {
            return Err(AdvisorError::Transport(format!("API error {status}: {body}")));
        }
        parse_reply(self.format, &body)
    }
}

impl Advisor for HttpAdvisor {
    fn advise<'a>(&'a self, prompt: &'a str) -> AdviceFuture<'a> {
        Box::pin(self.complete(prompt))
    }
}

/// Both formats share the request shape; only auth headers differ.
#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct OpenAiResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: String,
}

/// First text block of a successful response. A response without any block
/// comes back as an empty string.
fn parse_reply(format: ApiFormat, body: &str) -> Result<String, AdvisorError> {
    let malformed = |err: serde_json::Error| AdvisorError::Transport(format!("bad response: {err}"));
    let text = match format {
        ApiFormat::Anthropic => serde_json::from_str::<AnthropicResponse>(body)
            .map_err(malformed)?
            .content
            .into_iter()
            .next()
            .map(|block| block.text),
        ApiFormat::OpenAi => serde_json::from_str::<OpenAiResponse>(body)
            .map_err(malformed)?
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content),
    };
    Ok(text.unwrap_or_default())
}
