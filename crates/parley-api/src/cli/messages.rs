//! `parley messages`: page through a conversation.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use parley_types::page::{Page, PageQuery};
use uuid::Uuid;

use super::require_owned_prompt;
use crate::state::AppState;

/// List messages of a prompt. Paging arguments are parsed leniently:
/// anything unparsable falls back to the defaults.
pub async fn list_messages(
    state: &AppState,
    prompt_id: Uuid,
    query: PageQuery,
    user: &str,
    json: bool,
) -> Result<()> {
    let prompt = require_owned_prompt(state, &prompt_id, user).await?;
    let page = Page::parse(Some(&query));
    let messages = state.prompt_service.list_messages(&prompt_id, &page).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&messages)?);
        return Ok(());
    }

    if messages.is_empty() {
        println!();
        println!(
            "  {} No messages in '{}' on this page.",
            style("i").blue().bold(),
            style(&prompt.name).cyan()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("#").fg(Color::White),
        Cell::new("Message").fg(Color::White),
        Cell::new("ID").fg(Color::White),
    ]);

    for (i, message) in messages.iter().enumerate() {
        let position = page.offset + i as i64 + 1;
        table.add_row(vec![
            Cell::new(position.to_string()).fg(Color::DarkGrey),
            Cell::new(&message.content),
            Cell::new(message.id.to_string()).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("  {} ({})", style(&prompt.name).cyan().bold(), page.ordering);
    println!();
    println!("{table}");
    println!();
    Ok(())
}
