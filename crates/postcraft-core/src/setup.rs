use postcraft_model::{ApiToken, ModelSet, ModelSettings, API_TOKEN_ENV};
use tracing::info;

use crate::LoopError;

/// Build the process-wide model clients from the environment.
///
/// Fails with [`LoopError::Configuration`] before any client exists when the
/// API token is missing or blank.
pub fn models_from_env(settings: &ModelSettings) -> Result<ModelSet, LoopError> {
    let token = ApiToken::from_env()
        .ok_or_else(|| LoopError::Configuration(format!("{} is not set", API_TOKEN_ENV)))?;
    info!(token = %token.preview(), "API token loaded");

    ModelSet::huggingface(settings, &token).map_err(LoopError::ModelSetup)
}
