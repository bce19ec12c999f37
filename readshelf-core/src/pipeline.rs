//! Library ingestion pipeline
//!
//! `import` turns raw EPUB bytes into a committed [`BookRecord`]:
//!
//! 1. fingerprint the bytes
//! 2. reject content the repository already holds
//! 3. write the bytes to `{books_dir}/{fingerprint}.epub`
//! 4. read the stored file back and extract metadata and cover
//! 5. insert the record, mapping a uniqueness violation to a duplicate
//!
//! Hashing and extraction run on tokio's blocking pool, and a semaphore
//! bounds how many imports do that work at once. Extraction never fails an
//! import: a panic in the parser or cover resolver degrades to defaults.
//!
//! `remove` drops the record before the stored file, so the fingerprint is
//! free again even when the file delete fails.

use crate::config::LibraryConfig;
use crate::cover::CoverResolver;
use crate::error::{ImportError, PositionError, RepositoryError};
use crate::hasher::fingerprint;
use crate::parser::ContainerParser;
use crate::position::apply_update;
use crate::repository::BookRepository;
use crate::storage::StorageProvider;
use crate::types::{
    BookRecord, ContentFingerprint, CoverAsset, ExtractedMetadata, PositionUpdate,
};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinError;

/// Imports books and tracks reading progress against shared collaborators
pub struct LibraryPipeline {
    storage: Arc<dyn StorageProvider>,
    repository: Arc<dyn BookRepository>,
    config: LibraryConfig,
    parser: ContainerParser,
    covers: CoverResolver,
    permits: Arc<Semaphore>,
}

impl LibraryPipeline {
    pub fn new(
        storage: Arc<dyn StorageProvider>,
        repository: Arc<dyn BookRepository>,
        config: LibraryConfig,
    ) -> Self {
        let permits = Arc::new(Semaphore::new(config.max_concurrent_imports.max(1)));
        Self {
            storage,
            repository,
            parser: ContainerParser::new(),
            covers: CoverResolver::with_options(config.cover),
            config,
            permits,
        }
    }

    pub fn config(&self) -> &LibraryConfig {
        &self.config
    }

    pub fn repository(&self) -> &Arc<dyn BookRepository> {
        &self.repository
    }

    /// Content-addressed storage path for a fingerprint
    pub fn storage_path(&self, fingerprint: &ContentFingerprint) -> String {
        self.config
            .book_storage_path(&fingerprint.storage_file_name())
    }

    /// Import an EPUB file's bytes into the library
    pub async fn import(&self, data: Vec<u8>) -> Result<BookRecord, ImportError> {
        // The semaphore is never closed, so acquiring only waits
        let _permit = self.permits.acquire().await;

        let data = Arc::new(data);
        let file_size = data.len() as u64;

        let hashed = {
            let data = Arc::clone(&data);
            tokio::task::spawn_blocking(move || fingerprint(&data)).await
        };
        let fp = settle(hashed, "hashing", || fingerprint(&data));

        if let Some(existing) = self.find_existing(&fp).await? {
            tracing::info!(fingerprint = %fp, title = %existing.title(), "Duplicate import rejected");
            return Err(duplicate_of(&existing));
        }

        let path = self.storage_path(&fp);
        self.store(&path, &data).await?;
        tracing::debug!(fingerprint = %fp, path = %path, "Stored book file");

        let stored = match self.storage.read(&path).await {
            Ok(stored) => Arc::new(stored),
            Err(e) => {
                tracing::warn!(path = %path, error = %e, "Could not read back stored file, using upload");
                data
            }
        };

        let (metadata, cover) = self.extract(stored).await;
        let record = BookRecord::new(fp.clone(), path, file_size, metadata, cover);

        match self.repository.insert(record.clone()).await {
            Ok(record) => {
                tracing::info!(
                    fingerprint = %fp,
                    title = %record.title(),
                    author = %record.author(),
                    has_cover = record.cover.is_some(),
                    "Imported book"
                );
                Ok(record)
            }
            Err(RepositoryError::UniqueViolation(_)) => {
                // Lost a race with a concurrent import of the same bytes
                let winner = self.repository.find_by_fingerprint(&fp).await.ok().flatten();
                let error = match winner {
                    Some(existing) => duplicate_of(&existing),
                    None => duplicate_of(&record),
                };
                tracing::info!(fingerprint = %fp, "Duplicate detected at commit");
                Err(error)
            }
            Err(e) => Err(ImportError::Repository(e.to_string())),
        }
    }

    /// Apply a partial progress update to a stored book
    pub async fn update_progress(
        &self,
        fingerprint: &ContentFingerprint,
        update: PositionUpdate,
    ) -> Result<BookRecord, PositionError> {
        let record = self
            .repository
            .find_by_fingerprint(fingerprint)
            .await
            .map_err(|e| PositionError::Repository(e.to_string()))?
            .ok_or_else(|| PositionError::NotFound(fingerprint.to_string()))?;

        let position = apply_update(&record.position, update)?;

        self.repository
            .update_position(fingerprint, position)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound(id) => PositionError::NotFound(id),
                other => PositionError::Repository(other.to_string()),
            })
    }

    /// Remove a book from the library and delete its stored file.
    ///
    /// The record goes first so the fingerprint is free for re-import even if
    /// the file cannot be deleted; a missing or undeletable file only warns.
    pub async fn remove(
        &self,
        fingerprint: &ContentFingerprint,
    ) -> Result<BookRecord, RepositoryError> {
        let record = self.repository.remove(fingerprint).await?;

        if let Err(e) = self.storage.delete(&record.storage_path).await {
            tracing::warn!(
                fingerprint = %fingerprint,
                path = %record.storage_path,
                error = %e,
                "Could not delete stored book file"
            );
        }

        tracing::info!(fingerprint = %fingerprint, title = %record.title(), "Removed book");
        Ok(record)
    }

    async fn find_existing(
        &self,
        fp: &ContentFingerprint,
    ) -> Result<Option<BookRecord>, ImportError> {
        self.repository
            .find_by_fingerprint(fp)
            .await
            .map_err(|e| ImportError::Repository(e.to_string()))
    }

    /// Write the book file, removing anything partial on failure
    async fn store(&self, path: &str, data: &Arc<Vec<u8>>) -> Result<(), ImportError> {
        let expected = data.len() as u64;
        let Err(e) = self.storage.write(path, data.to_vec()).await else {
            return Ok(());
        };

        tracing::warn!(path = %path, error = %e, "Failed to store book file");

        // A complete file may belong to a concurrent import of the same bytes
        let complete = matches!(self.storage.size(path).await, Ok(size) if size == expected);
        if !complete && self.storage.exists(path).await.unwrap_or(false) {
            if let Err(cleanup) = self.storage.delete(path).await {
                tracing::warn!(path = %path, error = %cleanup, "Could not remove partial file");
            }
        }

        Err(ImportError::StorageWriteFailed(e))
    }

    /// Run metadata and cover extraction on the blocking pool
    async fn extract(&self, data: Arc<Vec<u8>>) -> (ExtractedMetadata, Option<CoverAsset>) {
        let parser = self.parser;
        let covers = self.covers.clone();

        let metadata_task = {
            let data = Arc::clone(&data);
            tokio::task::spawn_blocking(move || parser.parse_bytes(&data))
        };
        let cover_task = tokio::task::spawn_blocking(move || covers.resolve_bytes(&data));

        let (metadata, cover) = tokio::join!(metadata_task, cover_task);

        (
            settle(metadata, "metadata extraction", ExtractedMetadata::default),
            settle(cover, "cover extraction", || None),
        )
    }
}

/// Unwrap a blocking task's result, substituting `fallback` if it panicked
/// or was cancelled
fn settle<T>(joined: Result<T, JoinError>, task: &str, fallback: impl FnOnce() -> T) -> T {
    joined.unwrap_or_else(|e| {
        tracing::error!(task, error = %e, "Blocking task failed, using fallback");
        fallback()
    })
}

fn duplicate_of(existing: &BookRecord) -> ImportError {
    ImportError::DuplicateContent {
        title: existing.metadata.title.clone(),
        author: existing.metadata.author.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_settle_passes_value_through() {
        let joined = tokio::task::spawn_blocking(|| 7).await;
        assert_eq!(settle(joined, "answer", || 0), 7);
    }

    #[tokio::test]
    async fn test_settle_recovers_from_panic() {
        let joined = tokio::task::spawn_blocking(|| -> ExtractedMetadata {
            panic!("parser blew up");
        })
        .await;
        assert!(joined.as_ref().is_err_and(JoinError::is_panic));

        let metadata = settle(joined, "metadata extraction", ExtractedMetadata::default);
        assert!(metadata.is_placeholder());
    }

    #[tokio::test]
    async fn test_settle_recovers_from_cancellation() {
        let task = tokio::spawn(async {
            tokio::time::sleep(std::time::Duration::from_secs(60)).await;
            Some(1u8)
        });
        task.abort();
        let joined = task.await;

        assert_eq!(settle(joined, "cover extraction", || None), None);
    }
}
