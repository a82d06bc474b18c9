//! `parley send`: one exchange with a provider.

use anyhow::{Context, Result};
use console::style;
use parley_types::prompt::SendMessage;
use tracing::debug;
use uuid::Uuid;

use super::require_owned_prompt;
use crate::state::AppState;

/// Send `message` to the prompt and print the reply.
///
/// ```bash
/// parley send 0190f5a2-... "Where should I go in July?" --provider openAI
/// ```
pub async fn send_message(
    state: &AppState,
    prompt_id: Uuid,
    message: String,
    provider: Option<String>,
    model: Option<String>,
    user: &str,
    json: bool,
) -> Result<()> {
    require_owned_prompt(state, &prompt_id, user).await?;

    let config = state
        .config
        .request_config(provider.as_deref(), model.as_deref());

    debug!(
        %prompt_id,
        provider = %config.provider,
        model = %config.model,
        window = state.dispatcher.history_window(),
        "Sending message"
    );

    let reply = state
        .dispatcher
        .send_message(&config, SendMessage { message, prompt_id })
        .await
        .with_context(|| format!("Failed to send message via '{}'", config.provider))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&reply)?);
    } else {
        println!();
        println!("  {}", style(&config.provider).magenta().bold());
        for line in reply.content.lines() {
            println!("  {line}");
        }
        println!();
    }
    Ok(())
}
