//! PromptRepository trait definition.
//!
//! Storage operations for prompts, their messages, cost records, and
//! ownership links. Follows the same RPITIT pattern as the provider trait.

use parley_types::error::RepositoryError;
use parley_types::page::Page;
use parley_types::prompt::{
    ChatMessage, LinkedMessage, Prompt, PromptCost, PromptMessage, PromptSummary, UserPrompt,
};
use uuid::Uuid;

/// Repository trait for prompt persistence.
///
/// Implementations live in parley-infra (e.g., `SqlitePromptRepository`).
/// Every method is its own atomic unit; only `create_prompt` and
/// `append_message` group several row writes.
pub trait PromptRepository: Send + Sync {
    /// Insert a prompt together with its zeroed cost record and the
    /// creator's ownership link, all or nothing.
    fn create_prompt(
        &self,
        prompt: &Prompt,
        owner: &UserPrompt,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Get a prompt by id regardless of its deleted/visible flags.
    fn get_prompt(
        &self,
        prompt_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<Prompt>, RepositoryError>> + Send;

    /// Mark a prompt deleted. `NotFound` if the prompt does not exist.
    fn soft_delete_prompt(
        &self,
        prompt_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Show or hide a prompt in listings. `NotFound` if the prompt does not exist.
    fn set_prompt_visibility(
        &self,
        prompt_id: &Uuid,
        visible: bool,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Add an ownership link. Duplicate links are allowed.
    fn add_owner(
        &self,
        link: &UserPrompt,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Find the ownership link for the exact (prompt, user) pair.
    fn find_owner(
        &self,
        prompt_id: &Uuid,
        user_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<UserPrompt>, RepositoryError>> + Send;

    /// Prompts linked to the user that are neither deleted nor hidden.
    fn list_user_prompts(
        &self,
        user_id: &str,
    ) -> impl std::future::Future<Output = Result<Vec<PromptSummary>, RepositoryError>> + Send;

    /// Store a message and link it to the prompt as the newest turn.
    ///
    /// Returns the link, whose id orders it after every earlier turn.
    fn append_message(
        &self,
        prompt_id: &Uuid,
        message: &ChatMessage,
    ) -> impl std::future::Future<Output = Result<PromptMessage, RepositoryError>> + Send;

    /// Link rows of a prompt joined with their messages, ordered by link id
    /// in the page's direction and bounded by its offset/limit.
    fn list_prompt_messages(
        &self,
        prompt_id: &Uuid,
        page: &Page,
    ) -> impl std::future::Future<Output = Result<Vec<LinkedMessage>, RepositoryError>> + Send;

    /// Get the cost record of a prompt.
    fn get_cost(
        &self,
        prompt_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<PromptCost>, RepositoryError>> + Send;

    /// Atomically add to the cost totals. `NotFound` if the prompt has no
    /// cost record.
    fn increment_cost(
        &self,
        prompt_id: &Uuid,
        input_tokens: u64,
        output_tokens: u64,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
