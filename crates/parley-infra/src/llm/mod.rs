//! LLM provider implementations.
//!
//! Concrete [`LlmProvider`](parley_core::llm::provider::LlmProvider)
//! implementations for Anthropic and OpenAI-compatible APIs, the provider
//! factory ([`create_provider`]), and [`build_registry`], which turns the
//! configured provider list into the registry injected into the dispatcher.

pub mod anthropic;
pub mod openai_compat;

use secrecy::SecretString;
use tracing::{info, warn};

use parley_core::llm::box_provider::BoxLlmProvider;
use parley_core::llm::registry::ProviderRegistry;
use parley_types::config::ParleyConfig;
use parley_types::llm::{LlmError, ProviderConfig, ProviderType};

use self::anthropic::AnthropicProvider;
use self::openai_compat::OpenAiCompatibleProvider;
use self::openai_compat::config::{OpenAiCompatConfig, defaults_for};

/// Create a [`BoxLlmProvider`] from a [`ProviderConfig`] and its API key.
pub fn create_provider(config: &ProviderConfig, api_key: SecretString) -> Result<BoxLlmProvider, LlmError> {
    match config.provider_type {
        ProviderType::Anthropic => {
            let mut provider = AnthropicProvider::new(api_key, config.model.clone())?;
            if let Some(base_url) = config.base_url.as_deref() {
                provider = provider.with_base_url(base_url.to_string());
            }
            Ok(BoxLlmProvider::new(provider))
        }
        ProviderType::OpenAiCompatible => {
            // An explicit base_url wins; otherwise infer from the provider name.
            let oai_config = match config.base_url.as_deref() {
                Some(base_url) => OpenAiCompatConfig {
                    provider_name: config.name.clone(),
                    base_url: base_url.to_string(),
                    api_key,
                    model: config.model.clone(),
                },
                None => defaults_for(&config.name, api_key, &config.model),
            };
            Ok(BoxLlmProvider::new(OpenAiCompatibleProvider::new(oai_config)))
        }
    }
}

/// Providers registered when the configuration lists none: `openAI` and
/// `anthropic`, keyed from the usual environment variables.
pub fn default_providers() -> Vec<ProviderConfig> {
    vec![
        ProviderConfig {
            name: "openAI".to_string(),
            provider_type: ProviderType::OpenAiCompatible,
            api_key_env: "OPENAI_API_KEY".to_string(),
            base_url: None,
            model: "gpt-4o-mini".to_string(),
            enabled: true,
        },
        ProviderConfig {
            name: "anthropic".to_string(),
            provider_type: ProviderType::Anthropic,
            api_key_env: "ANTHROPIC_API_KEY".to_string(),
            base_url: None,
            model: "claude-sonnet-4-20250514".to_string(),
            enabled: true,
        },
    ]
}

/// Read an API key from the environment variable `name`.
///
/// Unset, empty, and non-Unicode values all count as missing.
pub fn env_api_key(name: &str) -> Option<SecretString> {
    match std::env::var(name) {
        Ok(val) if !val.trim().is_empty() => Some(SecretString::from(val)),
        _ => None,
    }
}

/// Build the provider registry from configuration, reading keys from the
/// environment.
pub fn build_registry(config: &ParleyConfig) -> ProviderRegistry {
    build_registry_with(config, env_api_key)
}

/// Build the provider registry, resolving each provider's key with `lookup`.
///
/// Disabled providers and providers without a key are skipped and logged;
/// a send naming them then fails with an unknown-provider error.
pub fn build_registry_with<F>(config: &ParleyConfig, lookup: F) -> ProviderRegistry
where
    F: Fn(&str) -> Option<SecretString>,
{
    let providers = if config.providers.is_empty() {
        default_providers()
    } else {
        config.providers.clone()
    };

    let mut registry = ProviderRegistry::new();
    for provider in &providers {
        if !provider.enabled {
            info!(provider = %provider.name, "Provider disabled, skipping");
            continue;
        }

        let Some(key) = lookup(&provider.api_key_env) else {
            warn!(
                provider = %provider.name,
                env = %provider.api_key_env,
                "API key not set, provider unavailable"
            );
            continue;
        };

        match create_provider(provider, key) {
            Ok(boxed) => {
                info!(provider = %provider.name, model = %provider.model, "Registered provider");
                registry.register(provider.name.clone(), boxed);
            }
            Err(e) => warn!(provider = %provider.name, error = %e, "Failed to create provider"),
        }
    }

    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(name: &str, provider_type: ProviderType, env: &str) -> ProviderConfig {
        ProviderConfig {
            name: name.to_string(),
            provider_type,
            api_key_env: env.to_string(),
            base_url: None,
            model: "some-model".to_string(),
            enabled: true,
        }
    }

    fn all_keys(_: &str) -> Option<SecretString> {
        Some(SecretString::from("test-key"))
    }

    #[test]
    fn test_create_provider_anthropic() {
        let config = provider("anthropic", ProviderType::Anthropic, "ANTHROPIC_API_KEY");
        let provider = create_provider(&config, SecretString::from("sk-test-key")).unwrap();
        assert_eq!(provider.name(), "anthropic");
        assert_eq!(provider.default_model(), "some-model");
    }

    #[test]
    fn test_create_provider_openai_compatible_by_name() {
        let config = provider("gemini", ProviderType::OpenAiCompatible, "GEMINI_API_KEY");
        let provider = create_provider(&config, SecretString::from("gemini-key")).unwrap();
        assert_eq!(provider.name(), "gemini");
    }

    #[test]
    fn test_create_provider_openai_compatible_with_base_url() {
        let mut config = provider("custom-provider", ProviderType::OpenAiCompatible, "CUSTOM_API_KEY");
        config.base_url = Some("https://custom.api.example.com/v1".to_string());
        let provider = create_provider(&config, SecretString::from("custom-key")).unwrap();
        assert_eq!(provider.name(), "custom-provider");
    }

    #[test]
    fn test_build_registry_defaults_when_unconfigured() {
        let registry = build_registry_with(&ParleyConfig::default(), all_keys);
        assert_eq!(registry.list_names(), vec!["anthropic", "openAI"]);
    }

    #[test]
    fn test_build_registry_skips_disabled_and_keyless() {
        let mut disabled = provider("mistral", ProviderType::OpenAiCompatible, "MISTRAL_API_KEY");
        disabled.enabled = false;
        let config = ParleyConfig {
            providers: vec![
                provider("openAI", ProviderType::OpenAiCompatible, "OPENAI_API_KEY"),
                provider("anthropic", ProviderType::Anthropic, "ANTHROPIC_API_KEY"),
                disabled,
            ],
            ..ParleyConfig::default()
        };

        let registry = build_registry_with(&config, |env| {
            (env == "OPENAI_API_KEY").then(|| SecretString::from("sk-test"))
        });

        assert_eq!(registry.list_names(), vec!["openAI"]);
        assert!(!registry.contains("anthropic"));
        assert!(!registry.contains("mistral"));
    }

    #[test]
    fn test_env_api_key_missing() {
        assert!(env_api_key("PARLEY_TEST_KEY_THAT_IS_NEVER_SET").is_none());
    }
}
