//! Persistence seam for book records
//!
//! The core never owns a database. It talks to a [`BookRepository`] that
//! enforces fingerprint uniqueness; the pipeline maps a uniqueness violation
//! to a duplicate-content result.

mod json;

pub use json::JsonRepository;

use crate::error::RepositoryError;
use crate::types::{BookRecord, ContentFingerprint, ReadingPosition};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Result type for repository operations
pub type RepositoryResult<T> = std::result::Result<T, RepositoryError>;

/// Storage of book records keyed by content fingerprint
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Look up the record holding this fingerprint
    async fn find_by_fingerprint(
        &self,
        fingerprint: &ContentFingerprint,
    ) -> RepositoryResult<Option<BookRecord>>;

    /// Insert a new record; fails with `UniqueViolation` if the fingerprint is taken
    async fn insert(&self, record: BookRecord) -> RepositoryResult<BookRecord>;

    /// Replace the reading position of an existing record
    async fn update_position(
        &self,
        fingerprint: &ContentFingerprint,
        position: ReadingPosition,
    ) -> RepositoryResult<BookRecord>;

    /// Delete a record, returning it; fails with `NotFound` if absent
    async fn remove(&self, fingerprint: &ContentFingerprint) -> RepositoryResult<BookRecord>;

    /// All records, newest import first
    async fn list(&self) -> RepositoryResult<Vec<BookRecord>>;
}

/// Sort records newest import first, as library listings show them
pub(crate) fn newest_first(mut records: Vec<BookRecord>) -> Vec<BookRecord> {
    records.sort_by(|a, b| b.imported_at.cmp(&a.imported_at));
    records
}

/// In-memory repository (for testing and embedding)
#[derive(Default)]
pub struct MemoryRepository {
    records: RwLock<HashMap<ContentFingerprint, BookRecord>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl BookRepository for MemoryRepository {
    async fn find_by_fingerprint(
        &self,
        fingerprint: &ContentFingerprint,
    ) -> RepositoryResult<Option<BookRecord>> {
        Ok(self.records.read().await.get(fingerprint).cloned())
    }

    async fn insert(&self, record: BookRecord) -> RepositoryResult<BookRecord> {
        let mut records = self.records.write().await;
        if records.contains_key(&record.fingerprint) {
            return Err(RepositoryError::UniqueViolation(record.fingerprint.to_string()));
        }
        records.insert(record.fingerprint.clone(), record.clone());
        Ok(record)
    }

    async fn update_position(
        &self,
        fingerprint: &ContentFingerprint,
        position: ReadingPosition,
    ) -> RepositoryResult<BookRecord> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(fingerprint)
            .ok_or_else(|| RepositoryError::NotFound(fingerprint.to_string()))?;
        record.position = position;
        Ok(record.clone())
    }

    async fn remove(&self, fingerprint: &ContentFingerprint) -> RepositoryResult<BookRecord> {
        self.records
            .write()
            .await
            .remove(fingerprint)
            .ok_or_else(|| RepositoryError::NotFound(fingerprint.to_string()))
    }

    async fn list(&self) -> RepositoryResult<Vec<BookRecord>> {
        let records = self.records.read().await.values().cloned().collect();
        Ok(newest_first(records))
    }
}
