//! Provider registry for runtime provider lookup and dispatch.
//!
//! Built once at startup and shared with the dispatcher, so tests can
//! register fake providers under the same names production uses.

use std::collections::HashMap;

use parley_types::error::DispatchError;
use parley_types::llm::{CompletionRequest, Message, ProviderReply, RequestConfig};
use tracing::{Instrument, field, info_span, warn};

use super::box_provider::BoxLlmProvider;

/// Registry of available LLM providers, indexed by name.
pub struct ProviderRegistry {
    providers: HashMap<String, BoxLlmProvider>,
}

impl ProviderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            providers: HashMap::new(),
        }
    }

    /// Register a provider under the given name.
    ///
    /// If a provider with this name already exists, it is replaced.
    pub fn register(&mut self, name: impl Into<String>, provider: BoxLlmProvider) {
        self.providers.insert(name.into(), provider);
    }

    /// Look up a provider by name.
    pub fn get(&self, name: &str) -> Option<&BoxLlmProvider> {
        self.providers.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.providers.contains_key(name)
    }

    /// List all registered provider names, sorted.
    pub fn list_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.providers.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Send an ordered conversation to the provider named in `config`.
    ///
    /// Fails with [`DispatchError::UnknownProvider`] before any I/O when the
    /// name is not registered, and wraps backend failures in
    /// [`DispatchError::Provider`]. No retries.
    pub async fn dispatch(
        &self,
        config: &RequestConfig,
        messages: Vec<Message>,
    ) -> Result<ProviderReply, DispatchError> {
        let provider = self
            .get(&config.provider)
            .ok_or_else(|| DispatchError::UnknownProvider(config.provider.clone()))?;

        let model = if config.model.is_empty() {
            provider.default_model().to_string()
        } else {
            config.model.clone()
        };

        let request = CompletionRequest {
            model,
            messages,
            system: config.system.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        };

        let span = info_span!(
            "gen_ai.complete",
            gen_ai.system = provider.name(),
            gen_ai.request.model = %request.model,
            gen_ai.request.max_tokens = request.max_tokens,
            gen_ai.request.temperature = ?request.temperature,
            gen_ai.response.model = field::Empty,
            gen_ai.response.finish_reasons = field::Empty,
            gen_ai.usage.input_tokens = field::Empty,
            gen_ai.usage.output_tokens = field::Empty,
        );

        let response = provider
            .complete(&request)
            .instrument(span.clone())
            .await
            .map_err(|source| {
                warn!(provider = %config.provider, error = %source, "Provider call failed");
                DispatchError::Provider {
                    provider: config.provider.clone(),
                    source,
                }
            })?;

        span.record("gen_ai.response.model", response.model.as_str());
        span.record(
            "gen_ai.response.finish_reasons",
            field::display(&response.stop_reason),
        );
        span.record("gen_ai.usage.input_tokens", response.usage.input_tokens);
        span.record("gen_ai.usage.output_tokens", response.usage.output_tokens);

        Ok(ProviderReply::from_response(response))
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockProvider;
    use parley_types::llm::{LlmError, MessageRole, StopReason};

    fn request_config(provider: &str) -> RequestConfig {
        RequestConfig {
            provider: provider.to_string(),
            model: "gpt-4o-mini".to_string(),
            max_tokens: 256,
            temperature: None,
            system: Some("Be brief.".to_string()),
        }
    }

    #[tokio::test]
    async fn test_dispatch_returns_reply_and_usage() {
        let mock = MockProvider::replying("openai", "Try Lisbon.", 11, 7);
        let seen = mock.requests();
        let mut registry = ProviderRegistry::new();
        registry.register("openAI", BoxLlmProvider::new(mock));

        let reply = registry
            .dispatch(&request_config("openAI"), vec![Message::user("Hi")])
            .await
            .unwrap();

        assert_eq!(reply.content, "Try Lisbon.");
        assert_eq!(reply.role, MessageRole::Assistant);
        assert_eq!(reply.input_tokens, 11);
        assert_eq!(reply.output_tokens, 7);
        assert_eq!(reply.model, "gpt-4o-mini");
        assert_eq!(reply.stop_reason, StopReason::EndTurn);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].model, "gpt-4o-mini");
        assert_eq!(seen[0].max_tokens, 256);
        assert_eq!(seen[0].system.as_deref(), Some("Be brief."));
        assert_eq!(seen[0].messages, vec![Message::user("Hi")]);
    }

    #[tokio::test]
    async fn test_dispatch_unknown_provider() {
        let mut registry = ProviderRegistry::new();
        registry.register("openAI", BoxLlmProvider::new(MockProvider::replying("openai", "x", 1, 1)));

        let err = registry
            .dispatch(&request_config("anthropic"), vec![Message::user("Hi")])
            .await
            .unwrap_err();

        assert!(matches!(err, DispatchError::UnknownProvider(name) if name == "anthropic"));
    }

    #[tokio::test]
    async fn test_dispatch_wraps_backend_failure() {
        let mut registry = ProviderRegistry::new();
        registry.register(
            "anthropic",
            BoxLlmProvider::new(MockProvider::failing("anthropic", LlmError::AuthenticationFailed)),
        );

        let err = registry
            .dispatch(&request_config("anthropic"), vec![Message::user("Hi")])
            .await
            .unwrap_err();

        match err {
            DispatchError::Provider { provider, source } => {
                assert_eq!(provider, "anthropic");
                assert!(matches!(source, LlmError::AuthenticationFailed));
            }
            other => panic!("expected Provider error, got {other}"),
        }
    }

    #[tokio::test]
    async fn test_dispatch_fills_empty_model_from_provider() {
        let mock = MockProvider::replying("openai", "ok", 1, 1);
        let seen = mock.requests();
        let mut registry = ProviderRegistry::new();
        registry.register("openAI", BoxLlmProvider::new(mock));

        let mut config = request_config("openAI");
        config.model = String::new();
        registry.dispatch(&config, vec![Message::user("Hi")]).await.unwrap();

        assert_eq!(seen.lock().unwrap()[0].model, "mock-model");
    }

    #[test]
    fn test_register_replaces_and_lists_sorted() {
        let mut registry = ProviderRegistry::default();
        registry.register("openAI", BoxLlmProvider::new(MockProvider::replying("a", "x", 1, 1)));
        registry.register("anthropic", BoxLlmProvider::new(MockProvider::replying("b", "x", 1, 1)));
        registry.register("openAI", BoxLlmProvider::new(MockProvider::replying("c", "x", 1, 1)));

        assert_eq!(registry.list_names(), vec!["anthropic", "openAI"]);
        assert_eq!(registry.get("openAI").unwrap().name(), "c");
        assert!(registry.contains("anthropic"));
        assert!(!registry.contains("gemini"));
    }
}
