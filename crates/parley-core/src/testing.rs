//! In-memory fakes shared by the unit tests of this crate.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use parley_types::error::RepositoryError;
use parley_types::llm::{CompletionRequest, CompletionResponse, LlmError, StopReason, Usage};
use parley_types::page::{Page, SortOrder};
use parley_types::prompt::{
    ChatMessage, LinkedMessage, Prompt, PromptCost, PromptMessage, PromptSummary, UserPrompt,
};
use uuid::Uuid;

use crate::llm::provider::LlmProvider;
use crate::prompt::repository::PromptRepository;

#[derive(Default)]
struct State {
    prompts: HashMap<Uuid, Prompt>,
    costs: HashMap<Uuid, PromptCost>,
    owners: Vec<UserPrompt>,
    messages: HashMap<Uuid, ChatMessage>,
    links: Vec<PromptMessage>,
    next_link_id: i64,
}

/// Mutex-backed `PromptRepository` with read/write counters and
/// failure injection.
#[derive(Default)]
pub struct MemoryPromptRepository {
    state: Mutex<State>,
    message_reads: AtomicUsize,
    message_writes: AtomicUsize,
    fail_append_after: Mutex<Option<usize>>,
}

impl MemoryPromptRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `list_prompt_messages` calls so far.
    pub fn message_reads(&self) -> usize {
        self.message_reads.load(Ordering::SeqCst)
    }

    /// Number of successful `append_message` calls so far.
    pub fn message_writes(&self) -> usize {
        self.message_writes.load(Ordering::SeqCst)
    }

    /// Drop the cost record of a prompt.
    pub fn remove_cost(&self, prompt_id: &Uuid) {
        self.state.lock().unwrap().costs.remove(prompt_id);
    }

    /// Let the next `n` appends succeed, then fail every one after.
    pub fn fail_append_after(&self, n: usize) {
        *self.fail_append_after.lock().unwrap() = Some(self.message_writes() + n);
    }
}

impl PromptRepository for MemoryPromptRepository {
    async fn create_prompt(&self, prompt: &Prompt, owner: &UserPrompt) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().unwrap();
        if state.prompts.contains_key(&prompt.id) {
            return Err(RepositoryError::Conflict(format!("prompt {} exists", prompt.id)));
        }
        state.prompts.insert(prompt.id, prompt.clone());
        state.costs.insert(prompt.id, PromptCost::zeroed(prompt.id));
        state.owners.push(owner.clone());
        Ok(())
    }

    async fn get_prompt(&self, prompt_id: &Uuid) -> Result<Option<Prompt>, RepositoryError> {
        Ok(self.state.lock().unwrap().prompts.get(prompt_id).cloned())
    }

    async fn soft_delete_prompt(&self, prompt_id: &Uuid) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().unwrap();
        let prompt = state.prompts.get_mut(prompt_id).ok_or(RepositoryError::NotFound)?;
        prompt.is_deleted = true;
        Ok(())
    }

    async fn set_prompt_visibility(&self, prompt_id: &Uuid, visible: bool) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().unwrap();
        let prompt = state.prompts.get_mut(prompt_id).ok_or(RepositoryError::NotFound)?;
        prompt.is_visible = visible;
        Ok(())
    }

    async fn add_owner(&self, link: &UserPrompt) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().unwrap();
        if !state.prompts.contains_key(&link.prompt_id) {
            return Err(RepositoryError::NotFound);
        }
        state.owners.push(link.clone());
        Ok(())
    }

    async fn find_owner(&self, prompt_id: &Uuid, user_id: &str) -> Result<Option<UserPrompt>, RepositoryError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .owners
            .iter()
            .find(|o| o.prompt_id == *prompt_id && o.user_id == user_id)
            .cloned())
    }

    async fn list_user_prompts(&self, user_id: &str) -> Result<Vec<PromptSummary>, RepositoryError> {
        let state = self.state.lock().unwrap();
        let mut seen = Vec::new();
        let mut out = Vec::new();
        for owner in state.owners.iter().filter(|o| o.user_id == user_id) {
            if seen.contains(&owner.prompt_id) {
                continue;
            }
            seen.push(owner.prompt_id);
            if let Some(prompt) = state.prompts.get(&owner.prompt_id) {
                if !prompt.is_deleted && prompt.is_visible {
                    out.push(PromptSummary {
                        id: prompt.id,
                        name: prompt.name.clone(),
                    });
                }
            }
        }
        Ok(out)
    }

    async fn append_message(&self, prompt_id: &Uuid, message: &ChatMessage) -> Result<PromptMessage, RepositoryError> {
        if let Some(limit) = *self.fail_append_after.lock().unwrap() {
            if self.message_writes() >= limit {
                return Err(RepositoryError::Query("injected append failure".to_string()));
            }
        }

        let mut state = self.state.lock().unwrap();
        if !state.prompts.contains_key(prompt_id) {
            return Err(RepositoryError::NotFound);
        }
        state.next_link_id += 1;
        let link = PromptMessage {
            id: state.next_link_id,
            prompt_id: *prompt_id,
            message_id: message.id,
        };
        state.messages.insert(message.id, message.clone());
        state.links.push(link.clone());
        self.message_writes.fetch_add(1, Ordering::SeqCst);
        Ok(link)
    }

    async fn list_prompt_messages(&self, prompt_id: &Uuid, page: &Page) -> Result<Vec<LinkedMessage>, RepositoryError> {
        self.message_reads.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock().unwrap();
        let mut rows: Vec<LinkedMessage> = state
            .links
            .iter()
            .filter(|l| l.prompt_id == *prompt_id)
            .filter_map(|l| {
                state.messages.get(&l.message_id).map(|m| LinkedMessage {
                    link: l.clone(),
                    message: m.clone(),
                })
            })
            .collect();

        rows.sort_by_key(|r| r.link.id);
        if page.ordering == SortOrder::Desc {
            rows.reverse();
        }

        let offset = usize::try_from(page.offset).unwrap_or(0);
        let rows = rows.into_iter().skip(offset);
        Ok(match page.limit {
            Some(limit) => rows.take(usize::try_from(limit).unwrap_or(0)).collect(),
            None => rows.collect(),
        })
    }

    async fn get_cost(&self, prompt_id: &Uuid) -> Result<Option<PromptCost>, RepositoryError> {
        Ok(self.state.lock().unwrap().costs.get(prompt_id).cloned())
    }

    async fn increment_cost(&self, prompt_id: &Uuid, input_tokens: u64, output_tokens: u64) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().unwrap();
        let cost = state.costs.get_mut(prompt_id).ok_or(RepositoryError::NotFound)?;
        cost.total_input_cost += input_tokens;
        cost.total_output_cost += output_tokens;
        Ok(())
    }
}

/// Scripted provider that records every request it receives.
pub struct MockProvider {
    name: String,
    reply: Result<(String, Usage), fn() -> LlmError>,
    failure: Option<Mutex<Option<LlmError>>>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl MockProvider {
    /// Always answers `content` with the given token usage.
    pub fn replying(name: &str, content: &str, input_tokens: u32, output_tokens: u32) -> Self {
        Self {
            name: name.to_string(),
            reply: Ok((
                content.to_string(),
                Usage {
                    input_tokens,
                    output_tokens,
                },
            )),
            failure: None,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Fails the first call with `error`, then with a generic provider error.
    pub fn failing(name: &str, error: LlmError) -> Self {
        Self {
            name: name.to_string(),
            reply: Err(|| LlmError::Provider {
                message: "mock failure".to_string(),
            }),
            failure: Some(Mutex::new(Some(error))),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Handle to the requests seen so far.
    pub fn requests(&self) -> Arc<Mutex<Vec<CompletionRequest>>> {
        Arc::clone(&self.requests)
    }
}

impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn default_model(&self) -> &str {
        "mock-model"
    }

    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl Future<Output = Result<CompletionResponse, LlmError>> + Send {
        self.requests.lock().unwrap().push(request.clone());

        let result = match &self.reply {
            Ok((content, usage)) => Ok(CompletionResponse {
                id: "mock-1".to_string(),
                content: content.clone(),
                model: request.model.clone(),
                stop_reason: StopReason::EndTurn,
                usage: usage.clone(),
            }),
            Err(fallback) => Err(self
                .failure
                .as_ref()
                .and_then(|f| f.lock().unwrap().take())
                .unwrap_or_else(fallback)),
        };

        async move { result }
    }
}
