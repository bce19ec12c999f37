//! Remove command implementation

use anyhow::{Context, Result};
use readshelf_core::{ContentFingerprint, LibraryConfig};

/// Remove a book and its stored file from the library
pub async fn remove(config: LibraryConfig, fingerprint: &str) -> Result<()> {
    let fp = ContentFingerprint::parse(fingerprint)
        .with_context(|| format!("'{}' is not a valid fingerprint", fingerprint))?;

    let pipeline = super::open_library(config).await?;
    let record = pipeline.remove(&fp).await?;

    println!("Removed '{}' by {}", record.title(), record.author());
    Ok(())
}
