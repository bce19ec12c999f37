//! CLI command implementations

mod import;
mod info;
mod list;
mod progress;
mod remove;

pub use import::import;
pub use info::info;
pub use list::list;
pub use progress::progress;
pub use remove::remove;

use anyhow::{Context, Result};
use readshelf_core::repository::JsonRepository;
use readshelf_core::storage::LocalStorage;
use readshelf_core::{LibraryConfig, LibraryPipeline};
use std::sync::Arc;

/// Open the on-disk library described by `config`
async fn open_library(config: LibraryConfig) -> Result<LibraryPipeline> {
    let index = config.index_path();
    let repository = JsonRepository::open(&index)
        .await
        .with_context(|| format!("Failed to open library index: {}", index.display()))?;
    let storage = LocalStorage::new(config.library_root());

    Ok(LibraryPipeline::new(
        Arc::new(storage),
        Arc::new(repository),
        config,
    ))
}
