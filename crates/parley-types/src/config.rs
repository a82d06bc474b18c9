//! Global configuration types for Parley.
//!
//! `ParleyConfig` represents the top-level `config.toml`: the registered
//! providers, the default request settings, and the history window.

use serde::{Deserialize, Serialize};

use crate::llm::{ProviderConfig, RequestConfig};

/// Top-level configuration.
///
/// Loaded from `~/.parley/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParleyConfig {
    /// How many prior messages are sent as context with each new message.
    #[serde(default = "default_history_window")]
    pub history_window: u32,

    /// Provider used when a request does not name one.
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Model used when a request does not name one.
    #[serde(default = "default_model")]
    pub default_model: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default)]
    pub temperature: Option<f64>,

    /// Optional system prompt sent with every request.
    #[serde(default)]
    pub system: Option<String>,

    #[serde(default)]
    pub providers: Vec<ProviderConfig>,
}

fn default_history_window() -> u32 {
    2
}

fn default_provider() -> String {
    "openAI".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_max_tokens() -> u32 {
    1024
}

impl ParleyConfig {
    /// Build the per-request settings, letting the caller override
    /// provider and model.
    ///
    /// Without an explicit model, `default_model` applies only to
    /// `default_provider`. Another provider gets the model of its
    /// `[[providers]]` entry, or an empty model so the provider's own
    /// default is used at dispatch.
    pub fn request_config(&self, provider: Option<&str>, model: Option<&str>) -> RequestConfig {
        let provider = provider.unwrap_or(&self.default_provider);
        let model = match model {
            Some(model) => model.to_string(),
            None if provider == self.default_provider => self.default_model.clone(),
            None => self
                .providers
                .iter()
                .find(|p| p.name == provider)
                .map(|p| p.model.clone())
                .unwrap_or_default(),
        };

        RequestConfig {
            provider: provider.to_string(),
            model,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            system: self.system.clone(),
        }
    }
}

impl Default for ParleyConfig {
    fn default() -> Self {
        Self {
            history_window: default_history_window(),
            default_provider: default_provider(),
            default_model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: None,
            system: None,
            providers: Vec::new(),
        }
    }
}
