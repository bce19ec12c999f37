//! List command implementation

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use readshelf_core::repository::BookRepository;
use readshelf_core::LibraryConfig;
use serde::Serialize;

/// One library entry as printed by `list`
#[derive(Serialize)]
struct ListEntry {
    fingerprint: String,
    title: String,
    author: String,
    percentage: f64,
    chapter_index: Option<u32>,
    last_read: Option<DateTime<Utc>>,
    imported_at: DateTime<Utc>,
    has_cover: bool,
}

/// List the books in the library, newest import first
pub async fn list(config: LibraryConfig, json: bool) -> Result<()> {
    let pipeline = super::open_library(config).await?;
    let records = pipeline
        .repository()
        .list()
        .await
        .context("Failed to read library")?;

    let entries: Vec<ListEntry> = records
        .into_iter()
        .map(|record| ListEntry {
            fingerprint: record.fingerprint.to_string(),
            title: record.metadata.title,
            author: record.metadata.author,
            percentage: record.position.percentage,
            chapter_index: record.position.chapter_index,
            last_read: record.position.last_read_timestamp,
            imported_at: record.imported_at,
            has_cover: record.cover.is_some(),
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("Library is empty");
        return Ok(());
    }

    for entry in &entries {
        println!(
            "{}  {:>5.1}%  '{}' by {}",
            entry.fingerprint,
            entry.percentage * 100.0,
            entry.title,
            entry.author
        );
    }
    println!("\n{} book(s)", entries.len());

    Ok(())
}
