//! Project configuration file support for postcraft.
//!
//! Loads configuration from `postcraft.toml` in the working directory. The
//! API token is never read from this file; it comes from the environment.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use postcraft_core::DEFAULT_MAX_ITERATIONS;
use postcraft_model::ModelSettings;

/// Project-level configuration loaded from `postcraft.toml`
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Global default model (applies to every role)
    pub model: Option<String>,
    /// Base URL of the OpenAI-compatible inference endpoint
    pub base_url: Option<String>,
    /// Per-request deadline for model calls
    pub timeout_secs: Option<u64>,
    /// Upper bound on generated tokens per call
    pub max_tokens: Option<u32>,
    /// Iteration cap used by the web form and as the CLI default
    pub max_iterations: Option<usize>,
    #[serde(default)]
    pub generator: RoleConfig,
    #[serde(default)]
    pub evaluator: RoleConfig,
    #[serde(default)]
    pub optimizer: RoleConfig,
}

/// Configuration for a specific model role
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct RoleConfig {
    pub model: Option<String>,
}

/// The config file name
pub const CONFIG_FILE_NAME: &str = "postcraft.toml";

impl ProjectConfig {
    /// Load configuration from the working directory.
    ///
    /// Returns:
    /// - `Ok(Some(config))` if file exists and parses successfully
    /// - `Ok(None)` if file does not exist
    /// - `Err(...)` if file exists but fails to parse (hard error)
    pub fn load(working_dir: &Path) -> Result<Option<Self>> {
        let config_path = working_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        let config: ProjectConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        Ok(Some(config))
    }

    /// Priority: [generator].model > global model > None
    pub fn generator_model(&self) -> Option<&str> {
        self.generator.model.as_deref().or(self.model.as_deref())
    }

    /// Priority: [evaluator].model > global model > None
    pub fn evaluator_model(&self) -> Option<&str> {
        self.evaluator.model.as_deref().or(self.model.as_deref())
    }

    /// Priority: [optimizer].model > global model > None
    pub fn optimizer_model(&self) -> Option<&str> {
        self.optimizer.model.as_deref().or(self.model.as_deref())
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations.unwrap_or(DEFAULT_MAX_ITERATIONS)
    }

    /// Resolve model settings. `model_override` (from the CLI) beats every
    /// file value; anything left unset falls back to the built-in defaults.
    pub fn model_settings(&self, model_override: Option<&str>) -> ModelSettings {
        let defaults = ModelSettings::default();
        let pick = |role_value: Option<&str>, default: String| -> String {
            model_override
                .or(role_value)
                .map(String::from)
                .unwrap_or(default)
        };

        ModelSettings {
            generator: pick(self.generator_model(), defaults.generator),
            evaluator: pick(self.evaluator_model(), defaults.evaluator),
            optimizer: pick(self.optimizer_model(), defaults.optimizer),
            base_url: self.base_url.clone().unwrap_or(defaults.base_url),
            timeout: self.timeout_secs.map(Duration::from_secs),
            max_tokens: self.max_tokens,
        }
    }
}
