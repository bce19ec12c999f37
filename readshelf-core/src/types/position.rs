//! Reading position types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where the reader is in a book.
///
/// `exact_location_token` is authoritative for resuming; `percentage` is what
/// library listings show. `numeric_location_backup` is a cached value only.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ReadingPosition {
    /// Opaque reader location (e.g. an EPUB CFI)
    pub exact_location_token: Option<String>,

    /// Spine index of the current chapter
    pub chapter_index: Option<u32>,

    /// Fraction read, always within `0.0..=1.0`
    pub percentage: f64,

    /// Numeric location index kept as a fallback for the token
    pub numeric_location_backup: Option<u64>,

    /// Serialized locations table produced by the reader
    pub locations_cache: Option<String>,

    /// Set on every accepted update; `None` until the book is first opened
    pub last_read_timestamp: Option<DateTime<Utc>>,
}

/// A partial progress update; only present fields are applied
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PositionUpdate {
    #[serde(default)]
    pub exact_location_token: Option<String>,

    #[serde(default)]
    pub chapter_index: Option<u32>,

    #[serde(default)]
    pub percentage: Option<f64>,

    #[serde(default)]
    pub numeric_location_backup: Option<u64>,

    #[serde(default)]
    pub locations_cache: Option<String>,
}

impl PositionUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_location(mut self, token: impl Into<String>) -> Self {
        self.exact_location_token = Some(token.into());
        self
    }

    pub fn with_chapter(mut self, index: u32) -> Self {
        self.chapter_index = Some(index);
        self
    }

    pub fn with_percentage(mut self, percentage: f64) -> Self {
        self.percentage = Some(percentage);
        self
    }

    pub fn with_location_backup(mut self, index: u64) -> Self {
        self.numeric_location_backup = Some(index);
        self
    }

    pub fn with_locations_cache(mut self, cache: impl Into<String>) -> Self {
        self.locations_cache = Some(cache.into());
        self
    }
}
