//! Prompt CLI commands: create, list, show, delete, hide, share, cost.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use uuid::Uuid;

use super::{PromptCommand, require_owned_prompt};
use crate::state::AppState;

/// Handle a `parley prompt` subcommand.
pub async fn handle_prompt_command(
    cmd: PromptCommand,
    state: &AppState,
    user: &str,
    json: bool,
) -> Result<()> {
    match cmd {
        PromptCommand::Create { name, model } => create_prompt(state, &name, model, user, json).await,
        PromptCommand::List => list_prompts(state, user, json).await,
        PromptCommand::Show { prompt_id } => show_prompt(state, &prompt_id, user, json).await,
        PromptCommand::Delete { prompt_id } => delete_prompt(state, &prompt_id, user, json).await,
        PromptCommand::Hide { prompt_id } => set_visibility(state, &prompt_id, user, false, json).await,
        PromptCommand::Unhide { prompt_id } => set_visibility(state, &prompt_id, user, true, json).await,
        PromptCommand::Share { prompt_id, with } => {
            share_prompt(state, &prompt_id, user, &with, json).await
        }
        PromptCommand::Cost { prompt_id } => show_cost(state, &prompt_id, user, json).await,
    }
}

/// Create a prompt owned by `user`.
///
/// ```bash
/// parley prompt create "Trip Planning"
/// ```
async fn create_prompt(
    state: &AppState,
    name: &str,
    model: Option<String>,
    user: &str,
    json: bool,
) -> Result<()> {
    let config = state.config.request_config(None, model.as_deref());
    let created = state.prompt_service.create_prompt(&config, name, user).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&created)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} Created prompt '{}'",
        style("✓").green().bold(),
        style(name.trim()).cyan().bold()
    );
    println!("  {} {}", style("id:").dim(), created.prompt_id);
    println!(
        "  Send a message with: {}",
        style(format!("parley send {} \"...\"", created.prompt_id)).yellow()
    );
    println!();
    Ok(())
}

async fn list_prompts(state: &AppState, user: &str, json: bool) -> Result<()> {
    let prompts = state.prompt_service.list_prompts(user).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&prompts)?);
        return Ok(());
    }

    if prompts.is_empty() {
        println!();
        println!(
            "  {} No prompts yet. Create one with: {}",
            style("i").blue().bold(),
            style("parley prompt create <name>").yellow()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Name").fg(Color::White),
        Cell::new("ID").fg(Color::White),
    ]);

    for prompt in &prompts {
        table.add_row(vec![
            Cell::new(&prompt.name).fg(Color::Cyan),
            Cell::new(prompt.id.to_string()).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {} prompt{}",
        style(prompts.len()).bold(),
        if prompts.len() == 1 { "" } else { "s" }
    );
    println!();
    Ok(())
}

async fn show_prompt(state: &AppState, prompt_id: &Uuid, user: &str, json: bool) -> Result<()> {
    let prompt = require_owned_prompt(state, prompt_id, user).await?;
    let cost = state.prompt_service.prompt_cost(prompt_id).await?;

    if json {
        let out = serde_json::json!({
            "prompt": prompt,
            "cost": cost,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    println!("  {}", style(&prompt.name).cyan().bold());
    println!("  {} {}", style("id:     ").dim(), prompt.id);
    println!("  {} {}", style("model:  ").dim(), prompt.prompt_model);
    println!(
        "  {} {}",
        style("created:").dim(),
        prompt.created_at.format("%Y-%m-%d %H:%M")
    );
    println!(
        "  {} {}",
        style("visible:").dim(),
        if prompt.is_visible { "yes" } else { "no" }
    );
    if let Some(cost) = cost {
        println!(
            "  {} {} in / {} out",
            style("tokens: ").dim(),
            cost.total_input_cost,
            cost.total_output_cost
        );
    }
    println!();
    Ok(())
}

async fn delete_prompt(state: &AppState, prompt_id: &Uuid, user: &str, json: bool) -> Result<()> {
    let prompt = require_owned_prompt(state, prompt_id, user).await?;
    state.prompt_service.delete_prompt(prompt_id).await?;

    if json {
        println!("{}", serde_json::json!({ "deleted": prompt_id }));
    } else {
        println!(
            "  {} Deleted prompt '{}'",
            style("✓").green().bold(),
            style(&prompt.name).cyan()
        );
    }
    Ok(())
}

async fn set_visibility(
    state: &AppState,
    prompt_id: &Uuid,
    user: &str,
    visible: bool,
    json: bool,
) -> Result<()> {
    let prompt = require_owned_prompt(state, prompt_id, user).await?;
    state
        .prompt_service
        .set_prompt_visibility(prompt_id, visible)
        .await?;

    if json {
        println!(
            "{}",
            serde_json::json!({ "prompt_id": prompt_id, "visible": visible })
        );
    } else {
        println!(
            "  {} Prompt '{}' is now {}",
            style("✓").green().bold(),
            style(&prompt.name).cyan(),
            if visible { "visible" } else { "hidden" }
        );
    }
    Ok(())
}

async fn share_prompt(
    state: &AppState,
    prompt_id: &Uuid,
    user: &str,
    with: &str,
    json: bool,
) -> Result<()> {
    let prompt = require_owned_prompt(state, prompt_id, user).await?;
    state.prompt_service.share_prompt(prompt_id, with).await?;

    if json {
        println!(
            "{}",
            serde_json::json!({ "prompt_id": prompt_id, "shared_with": with })
        );
    } else {
        println!(
            "  {} Shared '{}' with {}",
            style("✓").green().bold(),
            style(&prompt.name).cyan(),
            style(with).bold()
        );
    }
    Ok(())
}

async fn show_cost(state: &AppState, prompt_id: &Uuid, user: &str, json: bool) -> Result<()> {
    require_owned_prompt(state, prompt_id, user).await?;
    let cost = state.prompt_service.prompt_cost(prompt_id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&cost)?);
        return Ok(());
    }

    match cost {
        Some(cost) => {
            println!();
            println!("  {} {}", style("input tokens: ").dim(), cost.total_input_cost);
            println!("  {} {}", style("output tokens:").dim(), cost.total_output_cost);
            println!();
        }
        None => println!(
            "  {} Prompt {} has no cost record",
            style("!").yellow().bold(),
            prompt_id
        ),
    }
    Ok(())
}
