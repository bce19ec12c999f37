//! Library configuration
//!
//! Configuration is a plain value handed to the pipeline; nothing here is
//! global. `from_env` reads the same variables the CLI documents.

use crate::cover::CoverOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming the library root directory
pub const LIBRARY_PATH_ENV: &str = "READSHELF_LIBRARY_PATH";

/// Environment variable bounding concurrent imports
pub const MAX_IMPORTS_ENV: &str = "READSHELF_MAX_IMPORTS";

const DEFAULT_LIBRARY_DIR: &str = "./readshelf_data";
const BOOKS_DIR: &str = "books";
const INDEX_FILE: &str = "library.json";

/// Where the library lives and how imports behave
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryConfig {
    /// Root directory holding the index and the books directory
    pub library_root: PathBuf,

    /// Books directory, relative to the storage root
    pub books_dir: String,

    /// Maximum number of imports doing CPU work at once
    pub max_concurrent_imports: usize,

    /// Cover bounding box and JPEG quality
    pub cover: CoverOptions,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            library_root: PathBuf::from(DEFAULT_LIBRARY_DIR),
            books_dir: BOOKS_DIR.to_string(),
            max_concurrent_imports: default_parallelism(),
            cover: CoverOptions::default(),
        }
    }
}

fn default_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

impl LibraryConfig {
    /// Configuration rooted at `library_root` with default settings
    pub fn new(library_root: impl Into<PathBuf>) -> Self {
        Self {
            library_root: library_root.into(),
            ..Self::default()
        }
    }

    /// Defaults overridden by `READSHELF_LIBRARY_PATH` and `READSHELF_MAX_IMPORTS`
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(root) = std::env::var(LIBRARY_PATH_ENV) {
            if !root.trim().is_empty() {
                config.library_root = PathBuf::from(root);
            }
        }

        if let Ok(value) = std::env::var(MAX_IMPORTS_ENV) {
            match value.trim().parse::<usize>() {
                Ok(n) if n >= 1 => config.max_concurrent_imports = n,
                _ => tracing::warn!(value = %value, "Ignoring invalid {}", MAX_IMPORTS_ENV),
            }
        }

        config
    }

    /// Set the import concurrency bound (at least 1)
    pub fn with_max_concurrent_imports(mut self, n: usize) -> Self {
        self.max_concurrent_imports = n.max(1);
        self
    }

    pub fn with_cover_options(mut self, cover: CoverOptions) -> Self {
        self.cover = cover;
        self
    }

    /// Path of the JSON library index
    pub fn index_path(&self) -> PathBuf {
        self.library_root.join(INDEX_FILE)
    }

    /// Absolute directory holding stored book files
    pub fn books_path(&self) -> PathBuf {
        self.library_root.join(&self.books_dir)
    }

    pub fn library_root(&self) -> &Path {
        &self.library_root
    }

    /// Storage path of a book, relative to the library root
    pub fn book_storage_path(&self, file_name: &str) -> String {
        if self.books_dir.is_empty() {
            file_name.to_string()
        } else {
            format!("{}/{}", self.books_dir.trim_end_matches('/'), file_name)
        }
    }
}
