//! Message dispatch: context, provider call, persistence, and billing.
//!
//! `ChatDispatcher::send_message` runs one exchange as a strict sequence:
//!
//! 1. load the recent context of the prompt
//! 2. append the new user message
//! 3. call the provider through the registry
//! 4. store the user message (billed with the input tokens)
//! 5. store the reply (billed with the output tokens)
//! 6. add both counts to the prompt's cost record
//!
//! Any failure stops the sequence and is returned. Earlier writes are not
//! rolled back: a user message without its reply, or two messages without
//! the matching cost increment, are valid observable states. Nothing is
//! written before the provider has answered.

use std::sync::Arc;

use parley_types::error::{DispatchError, RepositoryError};
use parley_types::llm::{Message, MessageRole, RequestConfig};
use parley_types::prompt::{ChatMessage, SendMessage, SendMessageReply};
use tracing::{info, warn};

use super::history::load_context;
use super::repository::PromptRepository;
use crate::llm::registry::ProviderRegistry;

/// Default number of prior messages sent as context.
pub const DEFAULT_HISTORY_WINDOW: u32 = 2;

/// Sends user messages to providers and records the exchange.
///
/// Generic over `PromptRepository` so parley-core never depends on
/// parley-infra. The registry is shared with whoever built it.
pub struct ChatDispatcher<R: PromptRepository> {
    repo: R,
    providers: Arc<ProviderRegistry>,
    history_window: u32,
}

impl<R: PromptRepository> ChatDispatcher<R> {
    /// Create a dispatcher with the default two-message context window.
    pub fn new(repo: R, providers: Arc<ProviderRegistry>) -> Self {
        Self {
            repo,
            providers,
            history_window: DEFAULT_HISTORY_WINDOW,
        }
    }

    /// Override how many prior messages are sent as context.
    pub fn with_history_window(mut self, window: u32) -> Self {
        self.history_window = window;
        self
    }

    /// Access the repository.
    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Access the provider registry.
    pub fn providers(&self) -> &ProviderRegistry {
        &self.providers
    }

    pub fn history_window(&self) -> u32 {
        self.history_window
    }

    /// Send one user message and persist the exchange.
    pub async fn send_message(
        &self,
        config: &RequestConfig,
        body: SendMessage,
    ) -> Result<SendMessageReply, DispatchError> {
        let SendMessage { message, prompt_id } = body;

        let mut context = load_context(&self.repo, &prompt_id, self.history_window).await?;
        let prior_turns = context.len();
        context.push(Message::user(message.clone()));

        let reply = self.providers.dispatch(config, context).await?;

        info!(
            prompt_id = %prompt_id,
            provider = %config.provider,
            prior_turns,
            model = %reply.model,
            stop_reason = %reply.stop_reason,
            input_tokens = reply.input_tokens,
            output_tokens = reply.output_tokens,
            "Provider replied"
        );

        let user_message = ChatMessage::new(MessageRole::User, message, Some(reply.input_tokens));
        self.repo.append_message(&prompt_id, &user_message).await?;

        let bot_message =
            ChatMessage::new(reply.role.clone(), reply.content.clone(), Some(reply.output_tokens));
        self.repo.append_message(&prompt_id, &bot_message).await?;

        match self
            .repo
            .increment_cost(
                &prompt_id,
                u64::from(reply.input_tokens),
                u64::from(reply.output_tokens),
            )
            .await
        {
            Ok(()) => {}
            Err(RepositoryError::NotFound) => {
                warn!(prompt_id = %prompt_id, "Prompt has no cost record; exchange stored unbilled");
                return Err(DispatchError::MissingCostRecord(prompt_id));
            }
            Err(e) => return Err(e.into()),
        }

        Ok(SendMessageReply {
            content: reply.content,
        })
    }
}
