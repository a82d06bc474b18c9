//! CLI command definitions for the `parley` binary.
//!
//! Uses clap derive macros for argument parsing. Commands act on behalf of
//! the user named by `--user` (or `PARLEY_USER`).

pub mod messages;
pub mod prompt;
pub mod provider;
pub mod send;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use parley_types::prompt::Prompt;
use uuid::Uuid;

use crate::state::AppState;

/// Chat with LLM providers and keep every conversation on disk.
#[derive(Parser)]
#[command(name = "parley", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Log errors only. Command output is still printed.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export tracing spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true, env = "PARLEY_OTEL")]
    pub otel: bool,

    /// User the command acts for.
    #[arg(long, global = true, env = "PARLEY_USER", default_value = "local")]
    pub user: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage prompts (conversations).
    Prompt {
        #[command(subcommand)]
        command: PromptCommand,
    },

    /// Send a message to a prompt and print the reply.
    Send {
        /// Prompt id.
        prompt_id: Uuid,

        /// Message text.
        message: String,

        /// Provider to dispatch to (defaults to `default_provider` in config.toml).
        #[arg(long, short)]
        provider: Option<String>,

        /// Model to request (defaults to `default_model` in config.toml).
        #[arg(long, short)]
        model: Option<String>,
    },

    /// List the messages of a prompt.
    Messages {
        /// Prompt id.
        prompt_id: Uuid,

        /// Sort order: asc or desc.
        #[arg(long)]
        ordering: Option<String>,

        /// 1-based page number.
        #[arg(long)]
        page: Option<String>,

        /// Rows per page (max 100).
        #[arg(long)]
        limit: Option<String>,
    },

    /// List registered providers.
    Providers,
}

#[derive(Subcommand)]
pub enum PromptCommand {
    /// Create a new prompt.
    Create {
        /// Display name.
        name: String,

        /// Model recorded on the prompt (defaults to `default_model`).
        #[arg(long, short)]
        model: Option<String>,
    },

    /// List your prompts.
    #[command(alias = "ls")]
    List,

    /// Show a prompt.
    Show { prompt_id: Uuid },

    /// Delete a prompt (kept on disk, hidden everywhere).
    #[command(alias = "rm")]
    Delete { prompt_id: Uuid },

    /// Hide a prompt from listings.
    Hide { prompt_id: Uuid },

    /// Show a hidden prompt in listings again.
    Unhide { prompt_id: Uuid },

    /// Give another user access to a prompt.
    Share {
        prompt_id: Uuid,

        /// User to share with.
        with: String,
    },

    /// Show cumulative token usage of a prompt.
    Cost { prompt_id: Uuid },
}

/// Resolve a live prompt the user owns, or fail with a readable error.
pub async fn require_owned_prompt(state: &AppState, prompt_id: &Uuid, user: &str) -> Result<Prompt> {
    let Some(prompt) = state.prompt_service.prompt_exists(prompt_id).await? else {
        bail!("Prompt {prompt_id} not found");
    };
    if !state.prompt_service.is_owner(prompt_id, user).await? {
        bail!("Prompt {prompt_id} does not belong to '{user}'");
    }
    Ok(prompt)
}
