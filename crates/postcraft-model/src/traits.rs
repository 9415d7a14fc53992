use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while talking to a model endpoint
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Model API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Model returned an empty response")]
    EmptyResponse,

    #[error("Model configuration error: {0}")]
    Config(String),
}

/// Role tag attached to each message sent to a model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// A single role-tagged message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// The three logical model roles of the refinement loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelRole {
    Generator,
    Evaluator,
    Optimizer,
}

impl std::fmt::Display for ModelRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelRole::Generator => write!(f, "generator"),
            ModelRole::Evaluator => write!(f, "evaluator"),
            ModelRole::Optimizer => write!(f, "optimizer"),
        }
    }
}

/// The core abstraction for hosted chat models.
///
/// Implementations are stateless from the caller's point of view, so one
/// instance can be shared across concurrent loop invocations.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Identifier of the underlying model (e.g. a repository id)
    fn name(&self) -> &str;

    /// Send the messages and return the generated text
    async fn invoke(&self, messages: &[Message]) -> Result<String, ModelError>;
}
