//! Error types for Readshelf Core

use thiserror::Error;

/// Result type alias using ReadshelfError
pub type Result<T> = std::result::Result<T, ReadshelfError>;

/// Top-level error type for all Readshelf operations
#[derive(Debug, Error)]
pub enum ReadshelfError {
    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    #[error("Position error: {0}")]
    Position(#[from] PositionError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors surfaced by a library import
#[derive(Debug, Error)]
pub enum ImportError {
    /// The same bytes were imported before
    #[error("This book is already in your library: '{title}' by {author}")]
    DuplicateContent { title: String, author: String },

    #[error("Failed to store book file: {0}")]
    StorageWriteFailed(#[source] StorageError),

    #[error("Repository failure: {0}")]
    Repository(String),
}

/// Errors surfaced by reading position updates
#[derive(Debug, Error, PartialEq)]
pub enum PositionError {
    #[error("Percentage must be between 0.0 and 1.0, got {0}")]
    PercentageOutOfRange(f64),

    #[error("Book not found: {0}")]
    NotFound(String),

    #[error("Repository failure: {0}")]
    Repository(String),
}

/// Errors that occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Backend error: {0}")]
    BackendError(String),
}

/// Errors raised by a book repository
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// A record with this fingerprint already exists
    #[error("Duplicate fingerprint: {0}")]
    UniqueViolation(String),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Backend error: {0}")]
    BackendError(String),
}

/// Failures while reading an EPUB container.
///
/// These never leave the crate: the parser and cover resolver absorb them
/// into defaults.
#[derive(Debug, Error)]
pub(crate) enum ContainerError {
    #[error("Invalid archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No package document found")]
    MissingPackage,

    #[error("Entry {name} exceeds {limit} bytes")]
    EntryTooLarge { name: String, limit: u64 },

    #[error("Invalid XML in {path}: {message}")]
    Xml { path: String, message: String },
}
