//! One-shot CLI commands: ask from the terminal and import items.

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Deserialize;
use std::path::Path;
use std::sync::{Arc, Mutex};

use hindsight::config::HindsightConfig;
use hindsight::generate::GeminiGenerator;
use hindsight::items::store::{insert_item, NewItem, SqliteItemStore};
use hindsight::items::types::ItemType;

/// Run a single ask query from the terminal and print the result.
pub async fn ask(config: &HindsightConfig, query: &str) -> Result<()> {
    let db_path = config.resolved_db_path();
    let conn = hindsight::db::open_database(&db_path)?;
    let store = SqliteItemStore::new(Arc::new(Mutex::new(conn)));

    let generator = GeminiGenerator::new(&config.generator)
        .map_err(|e| anyhow::anyhow!("failed to build generator client: {e}"))?;

    let outcome = hindsight::ask::answer_query(
        &store,
        &generator,
        Utc::now(),
        &config.owner.user_id,
        &config.owner.display_name,
        query,
    )
    .await?;

    println!("{}\n", outcome.answer);

    if !outcome.sources.is_empty() {
        println!("Sources:");
        for (i, source) in outcome.sources.iter().enumerate() {
            println!(
                "  {}. [{}] {} - {}",
                i + 1,
                source.item_type,
                source.ts,
                source.reason
            );
        }
        println!();
    }

    println!("Try next:");
    for followup in &outcome.followups {
        println!("  - {followup}");
    }

    Ok(())
}

/// Import format — a flat list of items for the configured owner.
#[derive(Debug, Deserialize)]
struct ImportData {
    items: Vec<ImportItem>,
}

#[derive(Debug, Deserialize)]
struct ImportItem {
    #[serde(rename = "type")]
    item_type: String,
    ts: Option<String>,
    title: Option<String>,
    content: Option<String>,
    meta: Option<serde_json::Value>,
}

/// Import items from a JSON file into the owner's timeline.
pub fn import(config: &HindsightConfig, file: &Path) -> Result<()> {
    let json = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read import file: {}", file.display()))?;
    let data: ImportData = serde_json::from_str(&json).context("failed to parse import JSON")?;

    let db_path = config.resolved_db_path();
    let conn = hindsight::db::open_database(&db_path)?;

    println!("Importing {} items...", data.items.len());

    let mut imported = 0u64;
    for item in data.items {
        let item_type: ItemType = item
            .item_type
            .parse()
            .map_err(|e: String| anyhow::anyhow!(e))?;
        insert_item(
            &conn,
            NewItem {
                user_id: config.owner.user_id.clone(),
                item_type: Some(item_type),
                ts: item.ts,
                title: item.title,
                content: item.content,
                meta: item.meta,
            },
        )?;
        imported += 1;
    }

    println!("Imported {imported} item(s).");
    Ok(())
}
