//! Readshelf Core Library
//!
//! This crate ingests EPUB files into a personal reading library. It
//! fingerprints uploads for duplicate detection, stores them under
//! content-addressed paths, extracts Dublin Core metadata and a cover image
//! from the container, and tracks each book's reading position.
//!
//! Persistence and file storage are collaborators behind the
//! [`repository::BookRepository`] and [`storage::StorageProvider`] traits.

pub mod config;
mod container;
pub mod cover;
pub mod error;
pub mod hasher;
pub mod parser;
pub mod pipeline;
pub mod position;
pub mod repository;
pub mod storage;
pub mod types;

pub use config::LibraryConfig;
pub use cover::{CoverOptions, CoverResolver, CoverStrategy};
pub use error::{ImportError, PositionError, ReadshelfError, RepositoryError, Result, StorageError};
pub use hasher::fingerprint;
pub use parser::ContainerParser;
pub use pipeline::LibraryPipeline;
pub use position::{apply_update, apply_update_at};
pub use types::{
    BookRecord, ContentFingerprint, CoverAsset, ExtractedMetadata, PositionUpdate,
    ReadingPosition,
};
