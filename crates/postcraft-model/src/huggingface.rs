use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{ApiToken, ChatModel, Message, ModelError};

pub const HUGGINGFACE_ROUTER_URL: &str = "https://router.huggingface.co/v1";

/// Connection settings for a single hosted model
#[derive(Debug, Clone)]
pub struct EndpointConfig {
    /// Model repository id
    pub model: String,
    /// Base URL of the OpenAI-compatible endpoint
    pub base_url: String,
    /// Per-request deadline (None = no limit)
    pub timeout: Option<Duration>,
    /// Upper bound on generated tokens
    pub max_tokens: Option<u32>,
}

impl EndpointConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            base_url: HUGGINGFACE_ROUTER_URL.to_string(),
            timeout: None,
            max_tokens: None,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl ChatResponse {
    fn into_text(self) -> Result<String, ModelError> {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(ModelError::EmptyResponse)
    }
}

/// Chat model served through the Hugging Face inference router
pub struct HuggingFaceChatModel {
    config: EndpointConfig,
    headers: HeaderMap,
    http: reqwest::Client,
}

impl HuggingFaceChatModel {
    /// Fails with [`ModelError::Config`] when the token cannot be sent as a header
    pub fn new(config: EndpointConfig, token: ApiToken) -> Result<Self, ModelError> {
        let headers = Self::headers(&token)?;
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        Ok(Self {
            config,
            headers,
            http,
        })
    }

    fn headers(token: &ApiToken) -> Result<HeaderMap, ModelError> {
        let mut headers = HeaderMap::new();
        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", token.expose()))
            .map_err(|e| ModelError::Config(format!("Invalid API token: {}", e)))?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl ChatModel for HuggingFaceChatModel {
    fn name(&self) -> &str {
        &self.config.model
    }

    async fn invoke(&self, messages: &[Message]) -> Result<String, ModelError> {
        let request = ChatRequest {
            model: &self.config.model,
            messages,
            max_tokens: self.config.max_tokens,
        };

        debug!(
            model = %self.config.model,
            messages = messages.len(),
            "Chat completion request"
        );

        let response = self
            .http
            .post(self.endpoint())
            .headers(self.headers.clone())
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await?;
            return Err(ModelError::Api { status, body });
        }

        let body: ChatResponse = response.json().await?;
        body.into_text()
    }
}
