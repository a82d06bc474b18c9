//! `parley providers`: what the registry was built with.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use parley_infra::llm::default_providers;

use crate::state::AppState;

/// List configured providers and whether each one is registered.
pub async fn list_providers(state: &AppState, json: bool) -> Result<()> {
    let registry = state.dispatcher.providers();
    let configured = if state.config.providers.is_empty() {
        default_providers()
    } else {
        state.config.providers.clone()
    };

    if json {
        let rows: Vec<_> = configured
            .iter()
            .map(|p| {
                serde_json::json!({
                    "name": p.name,
                    "type": p.provider_type.to_string(),
                    "model": p.model,
                    "api_key_env": p.api_key_env,
                    "registered": registry.contains(&p.name),
                    "default": p.name == state.config.default_provider,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Name").fg(Color::White),
        Cell::new("Type").fg(Color::White),
        Cell::new("Model").fg(Color::White),
        Cell::new("Status").fg(Color::White),
    ]);

    for p in &configured {
        let status = if registry.contains(&p.name) {
            Cell::new("ready").fg(Color::Green)
        } else if !p.enabled {
            Cell::new("disabled").fg(Color::DarkGrey)
        } else {
            Cell::new(format!("missing {}", p.api_key_env)).fg(Color::Red)
        };
        let name = if p.name == state.config.default_provider {
            format!("{} (default)", p.name)
        } else {
            p.name.clone()
        };
        table.add_row(vec![
            Cell::new(name).fg(Color::Cyan),
            Cell::new(p.provider_type.to_string()),
            Cell::new(&p.model),
            status,
        ]);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {} of {} registered",
        style(registry.list_names().len()).bold(),
        configured.len()
    );
    println!();
    Ok(())
}
