//! Storage abstraction for imported book files

use crate::error::StorageError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::RwLock;

/// Result type for storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Abstract storage provider trait
///
/// Paths are relative to the provider's root. A failed `write` must not leave
/// a partial file at `path`.
#[async_trait]
pub trait StorageProvider: Send + Sync {
    /// Read data from the given path
    async fn read(&self, path: &str) -> StorageResult<Vec<u8>>;

    /// Write data to the given path, replacing any existing file
    async fn write(&self, path: &str, data: Vec<u8>) -> StorageResult<()>;

    /// Delete data at the given path
    async fn delete(&self, path: &str) -> StorageResult<()>;

    /// Check if a path exists
    async fn exists(&self, path: &str) -> StorageResult<bool>;

    /// Get the size of a file in bytes
    async fn size(&self, path: &str) -> StorageResult<u64>;
}

/// Local filesystem storage provider
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    /// Create a new local storage provider with the given root directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Safely resolve a path, preventing path traversal attacks
    pub fn full_path(&self, path: &str) -> StorageResult<PathBuf> {
        // Normalize path components, rejecting any that escape the root
        let mut normalized = PathBuf::new();
        for component in Path::new(path).components() {
            match component {
                Component::Normal(c) => normalized.push(c),
                Component::CurDir => {} // Ignore "."
                Component::ParentDir | Component::Prefix(_) | Component::RootDir => {
                    return Err(StorageError::BackendError(
                        "Path traversal attempt detected".to_string(),
                    ));
                }
            }
        }

        if normalized.as_os_str().is_empty() {
            return Err(StorageError::BackendError("Empty storage path".to_string()));
        }

        Ok(self.root.join(normalized))
    }
}

fn map_io(e: std::io::Error) -> StorageError {
    match e.kind() {
        std::io::ErrorKind::NotFound => StorageError::NotFound(e.to_string()),
        std::io::ErrorKind::PermissionDenied => StorageError::PermissionDenied(e.to_string()),
        _ => StorageError::BackendError(e.to_string()),
    }
}

#[async_trait]
impl StorageProvider for LocalStorage {
    async fn read(&self, path: &str) -> StorageResult<Vec<u8>> {
        let full_path = self.full_path(path)?;
        tokio::fs::read(full_path).await.map_err(map_io)
    }

    /// Writes to a temp sibling, syncs, then renames over the target
    async fn write(&self, path: &str, data: Vec<u8>) -> StorageResult<()> {
        use tokio::io::AsyncWriteExt;

        let full_path = self.full_path(path)?;
        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(map_io)?;
        }

        // Unique per write so concurrent writers of the same path never share a temp file
        let mut temp_name = full_path.as_os_str().to_owned();
        temp_name.push(format!(".{}.tmp", uuid::Uuid::new_v4().simple()));
        let temp_path = PathBuf::from(temp_name);

        let result = async {
            let mut file = tokio::fs::File::create(&temp_path).await?;
            file.write_all(&data).await?;
            file.sync_all().await?;
            drop(file);
            tokio::fs::rename(&temp_path, &full_path).await
        }
        .await;

        if let Err(e) = result {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(map_io(e));
        }
        Ok(())
    }

    async fn delete(&self, path: &str) -> StorageResult<()> {
        let full_path = self.full_path(path)?;
        tokio::fs::remove_file(full_path).await.map_err(map_io)
    }

    async fn exists(&self, path: &str) -> StorageResult<bool> {
        let full_path = self.full_path(path)?;
        tokio::fs::try_exists(full_path).await.map_err(map_io)
    }

    async fn size(&self, path: &str) -> StorageResult<u64> {
        let full_path = self.full_path(path)?;
        let metadata = tokio::fs::metadata(full_path).await.map_err(map_io)?;
        Ok(metadata.len())
    }
}

/// In-memory storage provider (for testing)
#[derive(Default)]
pub struct MemoryStorage {
    data: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored files
    pub fn len(&self) -> usize {
        self.data.read().map(|d| d.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> StorageError {
    StorageError::BackendError("storage lock poisoned".to_string())
}

#[async_trait]
impl StorageProvider for MemoryStorage {
    async fn read(&self, path: &str) -> StorageResult<Vec<u8>> {
        self.data
            .read()
            .map_err(|_| poisoned())?
            .get(path)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(path.to_string()))
    }

    async fn write(&self, path: &str, data: Vec<u8>) -> StorageResult<()> {
        self.data
            .write()
            .map_err(|_| poisoned())?
            .insert(path.to_string(), data);
        Ok(())
    }

    async fn delete(&self, path: &str) -> StorageResult<()> {
        self.data
            .write()
            .map_err(|_| poisoned())?
            .remove(path)
            .ok_or_else(|| StorageError::NotFound(path.to_string()))?;
        Ok(())
    }

    async fn exists(&self, path: &str) -> StorageResult<bool> {
        Ok(self.data.read().map_err(|_| poisoned())?.contains_key(path))
    }

    async fn size(&self, path: &str) -> StorageResult<u64> {
        self.data
            .read()
            .map_err(|_| poisoned())?
            .get(path)
            .map(|d| d.len() as u64)
            .ok_or_else(|| StorageError::NotFound(path.to_string()))
    }
}
