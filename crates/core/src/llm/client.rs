//! OpenAI-compatible chat-completion client.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::prompts;
use crate::{Result, WolError};

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
/// Environment variable overriding the API base URL.
pub const BASE_URL_ENV: &str = "OPENAI_BASE_URL";

/// Who a chat message comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }
}

/// Shape the model is asked to answer in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    Text,
    JsonObject,
}

/// A chat model that answers a conversation with one message.
#[allow(async_fn_in_trait)]
pub trait ChatModel {
    async fn complete(&self, messages: &[ChatMessage], format: ResponseFormat) -> Result<String>;
}

impl<M: ChatModel + ?Sized> ChatModel for &M {
    async fn complete(&self, messages: &[ChatMessage], format: ResponseFormat) -> Result<String> {
        (**self).complete(messages, format).await
    }
}

/// Chat-completion settings.
///
/// # Example
///
/// ```rust
/// use wolstudy_core::llm::ChatConfig;
///
/// let config = ChatConfig::builder()
///     .api_key("sk-test")
///     .model("gpt-4o-mini")
///     .build();
/// assert_eq!(config.json_max_tokens, 2000);
/// ```
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// API root; requests go to `<base_url>/chat/completions`.
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    /// Token limit for plain-text answers.
    pub text_max_tokens: u32,
    /// Token limit for JSON answers.
    pub json_max_tokens: u32,
    /// Request timeout in seconds.
    pub timeout: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-3.5-turbo-0125".to_string(),
            api_key: None,
            text_max_tokens: 1000,
            json_max_tokens: 2000,
            timeout: 120,
        }
    }
}

impl ChatConfig {
    pub fn builder() -> ChatConfigBuilder {
        ChatConfigBuilder::new()
    }

    /// Defaults with the API key and base URL taken from the environment.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(key) = std::env::var(API_KEY_ENV)
            && !key.trim().is_empty()
        {
            config.api_key = Some(key);
        }
        if let Ok(base_url) = std::env::var(BASE_URL_ENV)
            && !base_url.trim().is_empty()
        {
            config.base_url = base_url;
        }
        config
    }

    fn max_tokens(&self, format: ResponseFormat) -> u32 {
        match format {
            ResponseFormat::Text => self.text_max_tokens,
            ResponseFormat::JsonObject => self.json_max_tokens,
        }
    }
}

/// Builder for [`ChatConfig`], starting from [`ChatConfig::from_env`].
pub struct ChatConfigBuilder {
    config: ChatConfig,
}

impl ChatConfigBuilder {
    pub fn new() -> Self {
        Self { config: ChatConfig::from_env() }
    }

    pub fn base_url(mut self, value: impl Into<String>) -> Self {
        self.config.base_url = value.into();
        self
    }

    pub fn model(mut self, value: impl Into<String>) -> Self {
        self.config.model = value.into();
        self
    }

    pub fn api_key(mut self, value: impl Into<String>) -> Self {
        self.config.api_key = Some(value.into());
        self
    }

    pub fn text_max_tokens(mut self, value: u32) -> Self {
        self.config.text_max_tokens = value;
        self
    }

    pub fn json_max_tokens(mut self, value: u32) -> Self {
        self.config.json_max_tokens = value;
        self
    }

    pub fn timeout(mut self, secs: u64) -> Self {
        self.config.timeout = secs;
        self
    }

    pub fn build(self) -> ChatConfig {
        self.config
    }
}

impl Default for ChatConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormatBody>,
}

#[derive(Debug, Serialize)]
struct ResponseFormatBody {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

/// HTTP client for an OpenAI-compatible `/chat/completions` endpoint.
#[derive(Debug, Clone)]
pub struct ChatClient {
    client: Client,
    config: ChatConfig,
    api_key: String,
}

impl ChatClient {
    /// # Errors
    ///
    /// Returns [`WolError::ConfigError`] when no API key is configured.
    pub fn new(config: ChatConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| WolError::ConfigError(format!("{} is not set", API_KEY_ENV)))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()
            .map_err(WolError::HttpError)?;

        Ok(Self { client, config, api_key })
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }
}

impl ChatModel for ChatClient {
    async fn complete(&self, messages: &[ChatMessage], format: ResponseFormat) -> Result<String> {
        let request = ChatRequest {
            model: &self.config.model,
            messages,
            max_tokens: self.config.max_tokens(format),
            response_format: match format {
                ResponseFormat::Text => None,
                ResponseFormat::JsonObject => Some(ResponseFormatBody { kind: "json_object" }),
            },
        };

        debug!(model = %self.config.model, messages = messages.len(), ?format, "calling chat completion");
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() { WolError::Timeout { timeout: self.config.timeout } } else { WolError::HttpError(e) }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(WolError::Chat(format!("{}: {}", status, body.trim())));
        }

        let body: ChatResponse = response.json().await?;
        if let Some(usage) = &body.usage {
            debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                total_tokens = usage.total_tokens,
                "chat completion done"
            );
        }

        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| WolError::Chat("response has no message content".to_string()))
    }
}

/// Returns the outermost `{...}` of a model answer.
///
/// Some models wrap JSON answers in code fences or a sentence.
pub(crate) fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end >= start).then_some(&raw[start..=end])
}

/// Asks for a JSON answer to `messages` and deserializes it.
pub async fn complete_json<T, M>(model: &M, messages: &[ChatMessage]) -> Result<T>
where
    T: DeserializeOwned,
    M: ChatModel + ?Sized,
{
    let raw = model.complete(messages, ResponseFormat::JsonObject).await?;
    let json = extract_json_object(&raw).unwrap_or(raw.as_str());
    serde_json::from_str(json).map_err(|e| WolError::Chat(format!("answer is not the expected JSON: {}", e)))
}

/// Sends `prompt` with only the JSON-only system prompt and deserializes the
/// answer.
pub async fn generate_json<T, M>(model: &M, prompt: &str) -> Result<T>
where
    T: DeserializeOwned,
    M: ChatModel + ?Sized,
{
    complete_json(model, &[ChatMessage::system(prompts::JSON_ONLY_SYSTEM), ChatMessage::user(prompt)]).await
}
