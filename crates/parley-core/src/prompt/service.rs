//! Prompt lifecycle: creation, listing, existence and ownership checks,
//! message listing, and the soft-delete/visibility/sharing extras.

use parley_types::error::{PromptError, RepositoryError};
use parley_types::llm::RequestConfig;
use parley_types::page::Page;
use parley_types::prompt::{
    CreatedPrompt, MessageView, Prompt, PromptCost, PromptSummary, UserPrompt,
};
use tracing::info;
use uuid::Uuid;

use super::repository::PromptRepository;

/// Prompt operations on top of a `PromptRepository`.
pub struct PromptService<R: PromptRepository> {
    repo: R,
}

impl<R: PromptRepository> PromptService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Access the repository.
    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Create a prompt owned by `user_id`, with a zeroed cost record.
    ///
    /// The model identifier is taken from `config`. Names are trimmed;
    /// an empty name is rejected.
    pub async fn create_prompt(
        &self,
        config: &RequestConfig,
        name: &str,
        user_id: &str,
    ) -> Result<CreatedPrompt, PromptError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PromptError::InvalidName(
                "prompt name cannot be empty".to_string(),
            ));
        }

        let prompt = Prompt::new(name, config.model.clone());
        let owner = UserPrompt {
            user_id: user_id.to_string(),
            prompt_id: prompt.id,
        };
        self.repo.create_prompt(&prompt, &owner).await?;

        info!(prompt_id = %prompt.id, name = %prompt.name, user_id, "Created prompt");

        Ok(CreatedPrompt {
            prompt_id: prompt.id,
        })
    }

    /// Visible, non-deleted prompts linked to the user.
    pub async fn list_prompts(&self, user_id: &str) -> Result<Vec<PromptSummary>, PromptError> {
        Ok(self.repo.list_user_prompts(user_id).await?)
    }

    /// The prompt, unless it is missing or soft-deleted.
    pub async fn prompt_exists(&self, prompt_id: &Uuid) -> Result<Option<Prompt>, PromptError> {
        let prompt = self.repo.get_prompt(prompt_id).await?;
        Ok(prompt.filter(|p| !p.is_deleted))
    }

    pub async fn is_owner(&self, prompt_id: &Uuid, user_id: &str) -> Result<bool, PromptError> {
        Ok(self.repo.find_owner(prompt_id, user_id).await?.is_some())
    }

    /// Messages of a conversation, paged by send order.
    pub async fn list_messages(
        &self,
        prompt_id: &Uuid,
        page: &Page,
    ) -> Result<Vec<MessageView>, PromptError> {
        let rows = self.repo.list_prompt_messages(prompt_id, page).await?;
        Ok(rows
            .into_iter()
            .map(|row| MessageView {
                id: row.message.id,
                content: row.message.content,
            })
            .collect())
    }

    /// Soft-delete a prompt. Its messages and cost record are kept.
    pub async fn delete_prompt(&self, prompt_id: &Uuid) -> Result<(), PromptError> {
        self.repo
            .soft_delete_prompt(prompt_id)
            .await
            .map_err(not_found)?;
        info!(prompt_id = %prompt_id, "Deleted prompt");
        Ok(())
    }

    pub async fn set_prompt_visibility(
        &self,
        prompt_id: &Uuid,
        visible: bool,
    ) -> Result<(), PromptError> {
        self.repo
            .set_prompt_visibility(prompt_id, visible)
            .await
            .map_err(not_found)
    }

    pub async fn prompt_cost(&self, prompt_id: &Uuid) -> Result<Option<PromptCost>, PromptError> {
        Ok(self.repo.get_cost(prompt_id).await?)
    }

    /// Give another user ownership of an existing, non-deleted prompt.
    pub async fn share_prompt(&self, prompt_id: &Uuid, user_id: &str) -> Result<(), PromptError> {
        if self.prompt_exists(prompt_id).await?.is_none() {
            return Err(PromptError::NotFound);
        }
        if self.is_owner(prompt_id, user_id).await? {
            return Ok(());
        }
        self.repo
            .add_owner(&UserPrompt {
                user_id: user_id.to_string(),
                prompt_id: *prompt_id,
            })
            .await
            .map_err(not_found)?;
        info!(prompt_id = %prompt_id, user_id, "Shared prompt");
        Ok(())
    }
}

fn not_found(err: RepositoryError) -> PromptError {
    match err {
        RepositoryError::NotFound => PromptError::NotFound,
        other => PromptError::Repository(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryPromptRepository;
    use parley_types::llm::MessageRole;
    use parley_types::page::SortOrder;
    use parley_types::prompt::ChatMessage;

    fn config() -> RequestConfig {
        RequestConfig {
            provider: "openAI".to_string(),
            model: "gpt-4o-mini".to_string(),
            max_tokens: 512,
            temperature: None,
            system: None,
        }
    }

    fn service() -> PromptService<MemoryPromptRepository> {
        PromptService::new(MemoryPromptRepository::new())
    }

    #[tokio::test]
    async fn test_create_prompt_sets_up_cost_and_owner() {
        let svc = service();
        let created = svc
            .create_prompt(&config(), "Trip Planning", "U1")
            .await
            .unwrap();

        let prompt = svc.prompt_exists(&created.prompt_id).await.unwrap().unwrap();
        assert_eq!(prompt.name, "Trip Planning");
        assert_eq!(prompt.prompt_model, "gpt-4o-mini");

        let cost = svc.prompt_cost(&created.prompt_id).await.unwrap().unwrap();
        assert_eq!(cost, PromptCost::zeroed(created.prompt_id));

        assert!(svc.is_owner(&created.prompt_id, "U1").await.unwrap());
        assert!(!svc.is_owner(&created.prompt_id, "U2").await.unwrap());
    }

    #[tokio::test]
    async fn test_create_prompt_rejects_blank_name() {
        let svc = service();
        let err = svc.create_prompt(&config(), "   ", "U1").await.unwrap_err();
        assert!(matches!(err, PromptError::InvalidName(_)));
        assert!(svc.list_prompts("U1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_prompt_trims_name() {
        let svc = service();
        let created = svc.create_prompt(&config(), "  Recipes \n", "U1").await.unwrap();
        let prompt = svc.prompt_exists(&created.prompt_id).await.unwrap().unwrap();
        assert_eq!(prompt.name, "Recipes");
    }

    #[tokio::test]
    async fn test_list_prompts_hides_deleted_and_invisible() {
        let svc = service();
        let kept = svc.create_prompt(&config(), "Kept", "U1").await.unwrap();
        let deleted = svc.create_prompt(&config(), "Deleted", "U1").await.unwrap();
        let hidden = svc.create_prompt(&config(), "Hidden", "U1").await.unwrap();
        svc.create_prompt(&config(), "Someone else's", "U2").await.unwrap();

        svc.delete_prompt(&deleted.prompt_id).await.unwrap();
        svc.set_prompt_visibility(&hidden.prompt_id, false).await.unwrap();

        let listed = svc.list_prompts("U1").await.unwrap();
        assert_eq!(
            listed,
            vec![PromptSummary {
                id: kept.prompt_id,
                name: "Kept".to_string()
            }]
        );

        svc.set_prompt_visibility(&hidden.prompt_id, true).await.unwrap();
        assert_eq!(svc.list_prompts("U1").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_prompt_exists_ignores_deleted_and_unknown() {
        let svc = service();
        let created = svc.create_prompt(&config(), "Gone", "U1").await.unwrap();
        svc.delete_prompt(&created.prompt_id).await.unwrap();

        assert!(svc.prompt_exists(&created.prompt_id).await.unwrap().is_none());
        assert!(svc.prompt_exists(&Uuid::now_v7()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_unknown_prompt() {
        let svc = service();
        let err = svc.delete_prompt(&Uuid::now_v7()).await.unwrap_err();
        assert!(matches!(err, PromptError::NotFound));
    }

    #[tokio::test]
    async fn test_list_messages_pages_in_send_order() {
        let svc = service();
        let created = svc.create_prompt(&config(), "Chatty", "U1").await.unwrap();
        for i in 0..5 {
            let role = if i % 2 == 0 { MessageRole::User } else { MessageRole::Assistant };
            svc.repo()
                .append_message(&created.prompt_id, &ChatMessage::new(role, format!("m{i}"), None))
                .await
                .unwrap();
        }

        let all = svc
            .list_messages(&created.prompt_id, &Page::default())
            .await
            .unwrap();
        let contents: Vec<_> = all.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["m0", "m1", "m2", "m3", "m4"]);

        let page = Page {
            ordering: SortOrder::Asc,
            offset: 2,
            limit: Some(2),
        };
        let second: Vec<_> = svc
            .list_messages(&created.prompt_id, &page)
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.content)
            .collect();
        assert_eq!(second, vec!["m2", "m3"]);

        let newest = Page {
            ordering: SortOrder::Desc,
            offset: 0,
            limit: Some(1),
        };
        let newest = svc.list_messages(&created.prompt_id, &newest).await.unwrap();
        assert_eq!(newest[0].content, "m4");
    }

    #[tokio::test]
    async fn test_share_prompt() {
        let svc = service();
        let created = svc.create_prompt(&config(), "Shared", "U1").await.unwrap();

        svc.share_prompt(&created.prompt_id, "U2").await.unwrap();
        svc.share_prompt(&created.prompt_id, "U2").await.unwrap();

        assert!(svc.is_owner(&created.prompt_id, "U2").await.unwrap());
        assert_eq!(svc.list_prompts("U2").await.unwrap().len(), 1);

        let err = svc.share_prompt(&Uuid::now_v7(), "U2").await.unwrap_err();
        assert!(matches!(err, PromptError::NotFound));
    }
}
