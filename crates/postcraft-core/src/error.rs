use postcraft_model::ModelError;
use thiserror::Error;

use crate::Stage;

#[derive(Error, Debug)]
pub enum LoopError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Model unavailable during {stage} step: {source}")]
    ModelUnavailable { stage: Stage, source: ModelError },

    #[error("Model client could not be constructed: {0}")]
    ModelSetup(#[source] ModelError),

    #[error("Topic must not be empty")]
    EmptyInput,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl LoopError {
    /// Whether the caller's input, rather than the environment, caused the error
    pub fn is_input_error(&self) -> bool {
        matches!(self, LoopError::EmptyInput | LoopError::InvalidRequest(_))
    }
}
