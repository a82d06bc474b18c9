//! Conversation context loading.
//!
//! Fetches the most recent turns of a prompt and returns them oldest
//! first, ready to be followed by the new user message.

use parley_types::error::RepositoryError;
use parley_types::llm::Message;
use parley_types::page::Page;
use tracing::debug;
use uuid::Uuid;

use super::repository::PromptRepository;

/// Load up to `window` most recent messages of a prompt in send order.
///
/// A prompt without messages yields an empty context. A zero window
/// yields an empty context without querying storage.
pub async fn load_context<R: PromptRepository>(
    repo: &R,
    prompt_id: &Uuid,
    window: u32,
) -> Result<Vec<Message>, RepositoryError> {
    if window == 0 {
        return Ok(Vec::new());
    }

    let mut rows = repo
        .list_prompt_messages(prompt_id, &Page::latest(i64::from(window)))
        .await?;

    // Fetched newest first; the provider needs them chronological.
    rows.sort_by_key(|row| row.link.id);

    debug!(prompt_id = %prompt_id, loaded = rows.len(), window, "Loaded conversation context");

    Ok(rows
        .into_iter()
        .map(|row| Message {
            role: row.message.role,
            content: row.message.content,
        })
        .collect())
}
