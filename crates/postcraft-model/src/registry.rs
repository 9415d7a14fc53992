use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::{ChatModel, EndpointConfig, HuggingFaceChatModel, ModelError, ModelRole};

/// Environment variable holding the inference API token
pub const API_TOKEN_ENV: &str = "HUGGINGFACEHUB_API_TOKEN";

pub const DEFAULT_GENERATOR_MODEL: &str = "meta-llama/Meta-Llama-3-8B-Instruct";
pub const DEFAULT_EVALUATOR_MODEL: &str = "mistralai/Mistral-7B-Instruct-v0.3";
pub const DEFAULT_OPTIMIZER_MODEL: &str = "mistralai/Mistral-7B-Instruct-v0.3";

/// Secret token for the inference endpoint. Never printed in full.
#[derive(Clone)]
pub struct ApiToken(String);

impl ApiToken {
    /// Returns None for a blank token
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into().trim().to_string();
        if token.is_empty() {
            None
        } else {
            Some(Self(token))
        }
    }

    /// Read the token from `HUGGINGFACEHUB_API_TOKEN`
    pub fn from_env() -> Option<Self> {
        std::env::var(API_TOKEN_ENV).ok().and_then(Self::new)
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Short preview safe for logs
    pub fn preview(&self) -> String {
        let head: String = self.0.chars().take(5).collect();
        format!("{}...({} chars)", head, self.0.chars().count())
    }
}

impl std::fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ApiToken").field(&self.preview()).finish()
    }
}

/// Resolved settings for the three model roles
#[derive(Debug, Clone)]
pub struct ModelSettings {
    pub generator: String,
    pub evaluator: String,
    pub optimizer: String,
    pub base_url: String,
    pub timeout: Option<Duration>,
    pub max_tokens: Option<u32>,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            generator: DEFAULT_GENERATOR_MODEL.to_string(),
            evaluator: DEFAULT_EVALUATOR_MODEL.to_string(),
            optimizer: DEFAULT_OPTIMIZER_MODEL.to_string(),
            base_url: crate::HUGGINGFACE_ROUTER_URL.to_string(),
            timeout: None,
            max_tokens: None,
        }
    }
}

impl ModelSettings {
    pub fn model_for(&self, role: ModelRole) -> &str {
        match role {
            ModelRole::Generator => &self.generator,
            ModelRole::Evaluator => &self.evaluator,
            ModelRole::Optimizer => &self.optimizer,
        }
    }

    fn endpoint_for(&self, role: ModelRole) -> EndpointConfig {
        let mut config =
            EndpointConfig::new(self.model_for(role)).with_base_url(self.base_url.clone());
        if let Some(timeout) = self.timeout {
            config = config.with_timeout(timeout);
        }
        if let Some(max_tokens) = self.max_tokens {
            config = config.with_max_tokens(max_tokens);
        }
        config
    }
}

/// Process-wide set of model clients, built once at startup and shared
/// read-only by every loop invocation.
#[derive(Clone)]
pub struct ModelSet {
    generator: Arc<dyn ChatModel>,
    evaluator: Arc<dyn ChatModel>,
    optimizer: Arc<dyn ChatModel>,
}

impl ModelSet {
    pub fn new(
        generator: Arc<dyn ChatModel>,
        evaluator: Arc<dyn ChatModel>,
        optimizer: Arc<dyn ChatModel>,
    ) -> Self {
        Self {
            generator,
            evaluator,
            optimizer,
        }
    }

    /// Use one model for all three roles
    pub fn shared(model: Arc<dyn ChatModel>) -> Self {
        Self {
            generator: model.clone(),
            evaluator: model.clone(),
            optimizer: model,
        }
    }

    /// Build Hugging Face clients for every role
    pub fn huggingface(settings: &ModelSettings, token: &ApiToken) -> Result<Self, ModelError> {
        let build = |role: ModelRole| -> Result<Arc<dyn ChatModel>, ModelError> {
            let model = HuggingFaceChatModel::new(settings.endpoint_for(role), token.clone())?;
            info!(%role, model = model.name(), "Model client ready");
            Ok(Arc::new(model))
        };

        Ok(Self {
            generator: build(ModelRole::Generator)?,
            evaluator: build(ModelRole::Evaluator)?,
            optimizer: build(ModelRole::Optimizer)?,
        })
    }

    pub fn get(&self, role: ModelRole) -> &Arc<dyn ChatModel> {
        match role {
            ModelRole::Generator => &self.generator,
            ModelRole::Evaluator => &self.evaluator,
            ModelRole::Optimizer => &self.optimizer,
        }
    }
}
