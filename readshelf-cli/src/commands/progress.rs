//! Progress command implementation

use anyhow::{Context, Result};
use readshelf_core::{ContentFingerprint, LibraryConfig, PositionUpdate};

/// Apply a reading position update to a book in the library
pub async fn progress(config: LibraryConfig, fingerprint: &str, update: PositionUpdate) -> Result<()> {
    let fp = ContentFingerprint::parse(fingerprint)
        .with_context(|| format!("'{}' is not a valid fingerprint", fingerprint))?;

    let pipeline = super::open_library(config).await?;
    let record = pipeline.update_progress(&fp, update).await?;

    let position = &record.position;
    println!("Updated '{}' by {}", record.title(), record.author());
    println!("  Read:     {:.1}%", position.percentage * 100.0);
    if let Some(chapter) = position.chapter_index {
        println!("  Chapter:  {}", chapter);
    }
    if let Some(token) = &position.exact_location_token {
        println!("  Location: {}", token);
    }

    Ok(())
}
