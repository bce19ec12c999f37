//! The library record assembled by an import

use super::{ContentFingerprint, CoverAsset, ExtractedMetadata, ReadingPosition};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A book in the library.
///
/// Everything except `position` is fixed at import time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookRecord {
    /// Unique identifier for this record
    pub id: Uuid,

    /// Content fingerprint, unique across the library
    pub fingerprint: ContentFingerprint,

    /// Path of the stored file, relative to the storage root
    pub storage_path: String,

    /// Size of the stored file in bytes
    pub file_size: u64,

    /// Bibliographic metadata
    pub metadata: ExtractedMetadata,

    /// Cover image, if one could be extracted
    pub cover: Option<CoverAsset>,

    /// Current reading position
    pub position: ReadingPosition,

    /// When the book was imported
    pub imported_at: DateTime<Utc>,
}

impl BookRecord {
    /// Assemble a freshly imported record with an unread position
    pub fn new(
        fingerprint: ContentFingerprint,
        storage_path: impl Into<String>,
        file_size: u64,
        metadata: ExtractedMetadata,
        cover: Option<CoverAsset>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            fingerprint,
            storage_path: storage_path.into(),
            file_size,
            metadata,
            cover,
            position: ReadingPosition::default(),
            imported_at: Utc::now(),
        }
    }

    /// Get the book title
    pub fn title(&self) -> &str {
        &self.metadata.title
    }

    /// Get the book author
    pub fn author(&self) -> &str {
        &self.metadata.author
    }
}
