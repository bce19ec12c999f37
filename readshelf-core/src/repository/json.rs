//! JSON index file repository

use super::{newest_first, BookRepository, RepositoryResult};
use crate::error::RepositoryError;
use crate::types::{BookRecord, ContentFingerprint, ReadingPosition};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

/// On-disk library index
#[derive(Debug, Default, Serialize, Deserialize)]
struct LibraryIndex {
    books: BTreeMap<ContentFingerprint, BookRecord>,
}

impl LibraryIndex {
    /// Load the index from a JSON file; a missing file is an empty library
    async fn load(path: &Path) -> RepositoryResult<Self> {
        match tokio::fs::read_to_string(path).await {
            Ok(data) => {
                serde_json::from_str(&data).map_err(|e| RepositoryError::BackendError(e.to_string()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(RepositoryError::BackendError(e.to_string())),
        }
    }

    /// Save the index atomically
    /// Writes to a uniquely named temp file then renames over the index
    async fn save(&self, path: &Path) -> RepositoryResult<()> {
        let data = serde_json::to_string_pretty(self)
            .map_err(|e| RepositoryError::BackendError(e.to_string()))?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| RepositoryError::BackendError(e.to_string()))?;
        }

        // Temp file in the same directory so the rename stays on one filesystem
        let temp_path = temp_path_for(path);
        let written = match tokio::fs::write(&temp_path, &data).await {
            Ok(()) => tokio::fs::rename(&temp_path, path).await,
            Err(e) => Err(e),
        };

        if let Err(e) = written {
            if let Err(cleanup) = tokio::fs::remove_file(&temp_path).await {
                if cleanup.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(path = %temp_path.display(), error = %cleanup, "Could not remove temp index");
                }
            }
            return Err(RepositoryError::BackendError(e.to_string()));
        }
        Ok(())
    }
}

/// `library.json` becomes `library.json.<uuid>.tmp`
fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(format!(".{}.tmp", uuid::Uuid::new_v4().simple()));
    path.with_file_name(name)
}

/// Repository persisted as a single JSON file.
///
/// Every mutation rewrites the file while holding the write lock, so saves are
/// serialized within a process. There is no cross-process lock: two processes
/// writing the same index will each replace the file with their own view, and
/// the last rename wins. Point each running process at its own library.
pub struct JsonRepository {
    path: PathBuf,
    index: RwLock<LibraryIndex>,
}

impl JsonRepository {
    /// Open (or start) the index at `path`
    pub async fn open(path: impl Into<PathBuf>) -> RepositoryResult<Self> {
        let path = path.into();
        let index = LibraryIndex::load(&path).await?;
        tracing::debug!(path = %path.display(), books = index.books.len(), "Loaded library index");
        Ok(Self {
            path,
            index: RwLock::new(index),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl BookRepository for JsonRepository {
    async fn find_by_fingerprint(
        &self,
        fingerprint: &ContentFingerprint,
    ) -> RepositoryResult<Option<BookRecord>> {
        Ok(self.index.read().await.books.get(fingerprint).cloned())
    }

    async fn insert(&self, record: BookRecord) -> RepositoryResult<BookRecord> {
        let mut index = self.index.write().await;
        if index.books.contains_key(&record.fingerprint) {
            return Err(RepositoryError::UniqueViolation(record.fingerprint.to_string()));
        }

        index.books.insert(record.fingerprint.clone(), record.clone());
        if let Err(e) = index.save(&self.path).await {
            // Keep memory consistent with disk
            index.books.remove(&record.fingerprint);
            return Err(e);
        }
        Ok(record)
    }

    async fn update_position(
        &self,
        fingerprint: &ContentFingerprint,
        position: ReadingPosition,
    ) -> RepositoryResult<BookRecord> {
        let mut index = self.index.write().await;
        let record = index
            .books
            .get_mut(fingerprint)
            .ok_or_else(|| RepositoryError::NotFound(fingerprint.to_string()))?;

        let previous = std::mem::replace(&mut record.position, position);
        let updated = record.clone();

        if let Err(e) = index.save(&self.path).await {
            if let Some(record) = index.books.get_mut(fingerprint) {
                record.position = previous;
            }
            return Err(e);
        }
        Ok(updated)
    }

    async fn remove(&self, fingerprint: &ContentFingerprint) -> RepositoryResult<BookRecord> {
        let mut index = self.index.write().await;
        let removed = index
            .books
            .remove(fingerprint)
            .ok_or_else(|| RepositoryError::NotFound(fingerprint.to_string()))?;

        if let Err(e) = index.save(&self.path).await {
            index.books.insert(fingerprint.clone(), removed);
            return Err(e);
        }
        Ok(removed)
    }

    async fn list(&self) -> RepositoryResult<Vec<BookRecord>> {
        let records = self.index.read().await.books.values().cloned().collect();
        Ok(newest_first(records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hasher::fingerprint;
    use crate::types::ExtractedMetadata;
    use tempfile::TempDir;

    fn record(bytes: &[u8]) -> BookRecord {
        let fp = fingerprint(bytes);
        let path = fp.storage_file_name();
        BookRecord::new(fp, path, bytes.len() as u64, ExtractedMetadata::default(), None)
    }

    #[tokio::test]
    async fn test_persists_across_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("library.json");

        {
            let repo = JsonRepository::open(&path).await.unwrap();
            let inserted = repo.insert(record(b"book")).await.unwrap();
            let position = ReadingPosition {
                percentage: 0.75,
                ..Default::default()
            };
            repo.update_position(&inserted.fingerprint, position)
                .await
                .unwrap();
        }

        let reopened = JsonRepository::open(&path).await.unwrap();
        let found = reopened
            .find_by_fingerprint(&fingerprint(b"book"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.position.percentage, 0.75);
    }

    #[tokio::test]
    async fn test_saves_leave_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("library.json");
        let repo = JsonRepository::open(&path).await.unwrap();

        repo.insert(record(b"one")).await.unwrap();
        repo.insert(record(b"two")).await.unwrap();
        repo.remove(&fingerprint(b"one")).await.unwrap();

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("library.json")]);
    }

    #[test]
    fn test_temp_paths_are_unique() {
        let path = Path::new("/lib/library.json");
        let first = temp_path_for(path);
        let second = temp_path_for(path);
        assert_ne!(first, second);
        assert_eq!(first.parent(), path.parent());
        let name = first.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("library.json."));
        assert!(name.ends_with(".tmp"));
    }

    #[tokio::test]
    async fn test_failed_save_keeps_memory_consistent() {
        let dir = TempDir::new().unwrap();
        // A directory where the index file should be makes the rename fail
        let path = dir.path().join("library.json");
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("occupied"), b"x").unwrap();

        let repo = JsonRepository {
            path: path.clone(),
            index: RwLock::new(LibraryIndex::default()),
        };
        assert!(repo.insert(record(b"book")).await.is_err());
        assert!(repo.list().await.unwrap().is_empty());

        let leftovers = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[tokio::test]
    async fn test_remove_persists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("library.json");
        {
            let repo = JsonRepository::open(&path).await.unwrap();
            repo.insert(record(b"keep")).await.unwrap();
            repo.insert(record(b"drop")).await.unwrap();
            repo.remove(&fingerprint(b"drop")).await.unwrap();
            assert!(matches!(
                repo.remove(&fingerprint(b"drop")).await,
                Err(RepositoryError::NotFound(_))
            ));
        }

        let reopened = JsonRepository::open(&path).await.unwrap();
        let listed = reopened.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].fingerprint, fingerprint(b"keep"));
    }

    #[tokio::test]
    async fn test_invalid_fingerprint_key_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("library.json");
        std::fs::write(&path, r#"{ "books": { "not-a-hash": {} } }"#).unwrap();

        let err = JsonRepository::open(&path).await.err().unwrap();
        assert!(err.to_string().contains("invalid content fingerprint"));
    }

    #[tokio::test]
    async fn test_missing_index_is_empty() {
        let dir = TempDir::new().unwrap();
        let repo = JsonRepository::open(dir.path().join("none.json")).await.unwrap();
        assert!(repo.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_index_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("library.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(JsonRepository::open(&path).await.is_err());
    }

    #[tokio::test]
    async fn test_duplicate_insert() {
        let dir = TempDir::new().unwrap();
        let repo = JsonRepository::open(dir.path().join("library.json"))
            .await
            .unwrap();
        repo.insert(record(b"x")).await.unwrap();
        assert!(matches!(
            repo.insert(record(b"x")).await,
            Err(RepositoryError::UniqueViolation(_))
        ));
    }
}
