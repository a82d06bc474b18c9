//! Parley CLI entry point.
//!
//! Binary name: `parley`
//!
//! Parses CLI arguments, initializes tracing, database and services, then
//! dispatches to the command handler.

mod cli;
mod state;

use clap::Parser;

use cli::{Cli, Commands};
use parley_types::page::PageQuery;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    parley_observe::tracing_setup::init_tracing(log_filter(cli.verbose, cli.quiet), cli.otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let result = run(cli).await;

    parley_observe::tracing_setup::shutdown_tracing();
    result
}

/// Default log filter for the `-v` count; `--quiet` only lowers it to errors.
fn log_filter(verbose: u8, quiet: bool) -> &'static str {
    match verbose {
        0 if quiet => "error",
        0 => "warn",
        1 => "info,parley=debug",
        _ => "trace",
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let state = AppState::init().await?;
    let user = cli.user.as_str();

    match cli.command {
        Commands::Prompt { command } => {
            cli::prompt::handle_prompt_command(command, &state, user, cli.json).await?;
        }

        Commands::Send {
            prompt_id,
            message,
            provider,
            model,
        } => {
            cli::send::send_message(&state, prompt_id, message, provider, model, user, cli.json)
                .await?;
        }

        Commands::Messages {
            prompt_id,
            ordering,
            page,
            limit,
        } => {
            let query = PageQuery {
                ordering,
                page,
                limit,
            };
            cli::messages::list_messages(&state, prompt_id, query, user, cli.json).await?;
        }

        Commands::Providers => {
            cli::provider::list_providers(&state, cli.json).await?;
        }
    }

    Ok(())
}
