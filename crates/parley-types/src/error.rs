use thiserror::Error;
use uuid::Uuid;

use crate::llm::LlmError;

/// Errors from repository operations (used by trait definitions in parley-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

/// Errors from sending a message through a provider.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("unknown provider '{0}'")]
    UnknownProvider(String),

    #[error("provider '{provider}' failed: {source}")]
    Provider { provider: String, source: LlmError },

    /// The prompt has no cost record, so the exchange cannot be billed.
    /// Both messages of the exchange are already stored when this is raised.
    #[error("prompt {0} has no cost record")]
    MissingCostRecord(Uuid),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Errors from prompt lifecycle operations.
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("invalid prompt name: {0}")]
    InvalidName(String),

    #[error("prompt not found")]
    NotFound,

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_display() {
        let err = RepositoryError::Query("syntax error".to_string());
        assert_eq!(err.to_string(), "query error: syntax error");
    }

    #[test]
    fn test_dispatch_error_display() {
        let err = DispatchError::UnknownProvider("mistral".to_string());
        assert_eq!(err.to_string(), "unknown provider 'mistral'");

        let err = DispatchError::Provider {
            provider: "openAI".to_string(),
            source: LlmError::AuthenticationFailed,
        };
        assert_eq!(err.to_string(), "provider 'openAI' failed: authentication failed");
    }

    #[test]
    fn test_dispatch_error_keeps_provider_source() {
        use std::error::Error as _;
        let err = DispatchError::Provider {
            provider: "anthropic".to_string(),
            source: LlmError::Overloaded("busy".to_string()),
        };
        assert!(err.source().is_some());
    }

    #[test]
    fn test_repository_error_converts() {
        let err: PromptError = RepositoryError::NotFound.into();
        assert!(matches!(err, PromptError::Repository(RepositoryError::NotFound)));
        let err: DispatchError = RepositoryError::Connection.into();
        assert_eq!(err.to_string(), "database connection error");
    }
}
