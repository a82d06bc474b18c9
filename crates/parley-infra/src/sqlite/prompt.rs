//! SQLite prompt repository implementation.
//!
//! Implements `PromptRepository` from `parley-core` using sqlx with split
//! read/write pools: raw queries, private Row structs, and explicit
//! transactions where several rows must land together.

use chrono::{DateTime, Utc};
use parley_core::prompt::repository::PromptRepository;
use parley_types::error::RepositoryError;
use parley_types::llm::MessageRole;
use parley_types::page::Page;
use parley_types::prompt::{
    ChatMessage, LinkedMessage, Prompt, PromptCost, PromptMessage, PromptSummary, UserPrompt,
};
use sqlx::Row;
use tracing::debug;
use uuid::Uuid;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `PromptRepository`.
#[derive(Clone)]
pub struct SqlitePromptRepository {
    pool: DatabasePool,
}

impl SqlitePromptRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Private Row types for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

struct PromptRow {
    id: String,
    name: String,
    prompt_model: String,
    is_deleted: bool,
    is_visible: bool,
    created_at: String,
}

impl PromptRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            prompt_model: row.try_get("prompt_model")?,
            is_deleted: row.try_get("is_deleted")?,
            is_visible: row.try_get("is_visible")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_prompt(self) -> Result<Prompt, RepositoryError> {
        Ok(Prompt {
            id: parse_uuid(&self.id, "prompt id")?,
            name: self.name,
            prompt_model: self.prompt_model,
            is_deleted: self.is_deleted,
            is_visible: self.is_visible,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

/// A `prompt_messages` row joined with its `messages` row.
struct LinkedMessageRow {
    link_id: i64,
    prompt_id: String,
    message_id: String,
    role: String,
    content: String,
    token_cost: Option<i64>,
    created_at: String,
}

impl LinkedMessageRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            link_id: row.try_get("link_id")?,
            prompt_id: row.try_get("prompt_id")?,
            message_id: row.try_get("message_id")?,
            role: row.try_get("role")?,
            content: row.try_get("content")?,
            token_cost: row.try_get("token_cost")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_linked(self) -> Result<LinkedMessage, RepositoryError> {
        let message_id = parse_uuid(&self.message_id, "message id")?;
        let role: MessageRole = self
            .role
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;

        Ok(LinkedMessage {
            link: PromptMessage {
                id: self.link_id,
                prompt_id: parse_uuid(&self.prompt_id, "prompt_id")?,
                message_id,
            },
            message: ChatMessage {
                id: message_id,
                role,
                content: self.content,
                token_cost: self
                    .token_cost
                    .map(|v| checked_count(v, "token_cost"))
                    .transpose()?,
                created_at: parse_datetime(&self.created_at)?,
            },
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_uuid(s: &str, what: &str) -> Result<Uuid, RepositoryError> {
    Uuid::parse_str(s).map_err(|e| RepositoryError::Query(format!("invalid {what}: {e}")))
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

/// Convert a token count between storage and domain integer types.
fn checked_count<S, T>(value: S, what: &str) -> Result<T, RepositoryError>
where
    S: Copy + std::fmt::Display,
    T: TryFrom<S>,
{
    T::try_from(value)
        .map_err(|_| RepositoryError::Query(format!("{what} out of range: {value}")))
}

/// Map a write error, turning foreign-key failures into `NotFound` and
/// unique violations into `Conflict`.
fn map_write_error(e: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e {
        let message = db_err.message();
        if message.contains("FOREIGN KEY") {
            return RepositoryError::NotFound;
        }
        if message.contains("UNIQUE") {
            return RepositoryError::Conflict(message.to_string());
        }
    }
    RepositoryError::Query(e.to_string())
}

// ---------------------------------------------------------------------------
// PromptRepository implementation
// ---------------------------------------------------------------------------

impl PromptRepository for SqlitePromptRepository {
    async fn create_prompt(&self, prompt: &Prompt, owner: &UserPrompt) -> Result<(), RepositoryError> {
        let mut tx = self
            .pool
            .writer
            .begin()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        sqlx::query(
            r#"INSERT INTO prompts (id, name, prompt_model, is_deleted, is_visible, created_at)
               VALUES (?, ?, ?, ?, ?, ?)"#,
        )
        .bind(prompt.id.to_string())
        .bind(&prompt.name)
        .bind(&prompt.prompt_model)
        .bind(prompt.is_deleted)
        .bind(prompt.is_visible)
        .bind(format_datetime(&prompt.created_at))
        .execute(&mut *tx)
        .await
        .map_err(map_write_error)?;

        sqlx::query(
            "INSERT INTO prompt_costs (prompt_id, total_input_cost, total_output_cost) VALUES (?, 0, 0)",
        )
        .bind(prompt.id.to_string())
        .execute(&mut *tx)
        .await
        .map_err(map_write_error)?;

        sqlx::query("INSERT INTO user_prompts (user_id, prompt_id) VALUES (?, ?)")
            .bind(&owner.user_id)
            .bind(owner.prompt_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(map_write_error)?;

        tx.commit()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }

    async fn get_prompt(&self, prompt_id: &Uuid) -> Result<Option<Prompt>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM prompts WHERE id = ?")
            .bind(prompt_id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let prompt_row =
                    PromptRow::from_row(&row).map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(prompt_row.into_prompt()?))
            }
            None => Ok(None),
        }
    }

    async fn soft_delete_prompt(&self, prompt_id: &Uuid) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE prompts SET is_deleted = 1 WHERE id = ?")
            .bind(prompt_id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn set_prompt_visibility(&self, prompt_id: &Uuid, visible: bool) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE prompts SET is_visible = ? WHERE id = ?")
            .bind(visible)
            .bind(prompt_id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn add_owner(&self, link: &UserPrompt) -> Result<(), RepositoryError> {
        sqlx::query("INSERT INTO user_prompts (user_id, prompt_id) VALUES (?, ?)")
            .bind(&link.user_id)
            .bind(link.prompt_id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(map_write_error)?;

        Ok(())
    }

    async fn find_owner(&self, prompt_id: &Uuid, user_id: &str) -> Result<Option<UserPrompt>, RepositoryError> {
        let row = sqlx::query(
            "SELECT user_id, prompt_id FROM user_prompts WHERE prompt_id = ? AND user_id = ? LIMIT 1",
        )
        .bind(prompt_id.to_string())
        .bind(user_id)
        .fetch_optional(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let user_id: String = row
                    .try_get("user_id")
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                let prompt_id: String = row
                    .try_get("prompt_id")
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(UserPrompt {
                    user_id,
                    prompt_id: parse_uuid(&prompt_id, "prompt_id")?,
                }))
            }
            None => Ok(None),
        }
    }

    async fn list_user_prompts(&self, user_id: &str) -> Result<Vec<PromptSummary>, RepositoryError> {
        let rows = sqlx::query(
            r#"SELECT p.id, p.name, MIN(up.id) AS first_link
               FROM user_prompts up
               JOIN prompts p ON p.id = up.prompt_id
               WHERE up.user_id = ? AND p.is_deleted = 0 AND p.is_visible = 1
               GROUP BY p.id, p.name
               ORDER BY first_link ASC"#,
        )
        .bind(user_id)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut prompts = Vec::with_capacity(rows.len());
        for row in &rows {
            let id: String = row
                .try_get("id")
                .map_err(|e| RepositoryError::Query(e.to_string()))?;
            let name: String = row
                .try_get("name")
                .map_err(|e| RepositoryError::Query(e.to_string()))?;
            prompts.push(PromptSummary {
                id: parse_uuid(&id, "prompt id")?,
                name,
            });
        }

        Ok(prompts)
    }

    async fn append_message(&self, prompt_id: &Uuid, message: &ChatMessage) -> Result<PromptMessage, RepositoryError> {
        let mut tx = self
            .pool
            .writer
            .begin()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        sqlx::query(
            "INSERT INTO messages (id, role, content, token_cost, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(message.id.to_string())
        .bind(message.role.to_string())
        .bind(&message.content)
        .bind(message.token_cost.map(i64::from))
        .bind(format_datetime(&message.created_at))
        .execute(&mut *tx)
        .await
        .map_err(map_write_error)?;

        let result = sqlx::query("INSERT INTO prompt_messages (prompt_id, message_id) VALUES (?, ?)")
            .bind(prompt_id.to_string())
            .bind(message.id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(map_write_error)?;

        tx.commit()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let link = PromptMessage {
            id: result.last_insert_rowid(),
            prompt_id: *prompt_id,
            message_id: message.id,
        };
        debug!(prompt_id = %prompt_id, link_id = link.id, role = %message.role, "Appended message");

        Ok(link)
    }

    async fn list_prompt_messages(&self, prompt_id: &Uuid, page: &Page) -> Result<Vec<LinkedMessage>, RepositoryError> {
        let sql = format!(
            r#"SELECT pm.id AS link_id, pm.prompt_id, pm.message_id,
                      m.role, m.content, m.token_cost, m.created_at
               FROM prompt_messages pm
               JOIN messages m ON m.id = pm.message_id
               WHERE pm.prompt_id = ?
               ORDER BY pm.id {}
               LIMIT ? OFFSET ?"#,
            page.ordering
        );

        // SQLite treats a negative LIMIT as unbounded.
        let rows = sqlx::query(&sql)
            .bind(prompt_id.to_string())
            .bind(page.limit.unwrap_or(-1))
            .bind(page.offset.max(0))
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut messages = Vec::with_capacity(rows.len());
        for row in &rows {
            let linked_row = LinkedMessageRow::from_row(row)
                .map_err(|e| RepositoryError::Query(e.to_string()))?;
            messages.push(linked_row.into_linked()?);
        }

        Ok(messages)
    }

    async fn get_cost(&self, prompt_id: &Uuid) -> Result<Option<PromptCost>, RepositoryError> {
        let row = sqlx::query(
            "SELECT total_input_cost, total_output_cost FROM prompt_costs WHERE prompt_id = ?",
        )
        .bind(prompt_id.to_string())
        .fetch_optional(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let input: i64 = row
                    .try_get("total_input_cost")
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                let output: i64 = row
                    .try_get("total_output_cost")
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(PromptCost {
                    prompt_id: *prompt_id,
                    total_input_cost: checked_count(input, "total_input_cost")?,
                    total_output_cost: checked_count(output, "total_output_cost")?,
                }))
            }
            None => Ok(None),
        }
    }

    async fn increment_cost(&self, prompt_id: &Uuid, input_tokens: u64, output_tokens: u64) -> Result<(), RepositoryError> {
        let input: i64 = checked_count(input_tokens, "input tokens")?;
        let output: i64 = checked_count(output_tokens, "output tokens")?;

        let result = sqlx::query(
            r#"UPDATE prompt_costs
               SET total_input_cost = total_input_cost + ?,
                   total_output_cost = total_output_cost + ?
               WHERE prompt_id = ?"#,
        )
        .bind(input)
        .bind(output)
        .bind(prompt_id.to_string())
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
