//! Bibliographic metadata extracted from an EPUB package (Dublin Core subset)

use serde::{Deserialize, Serialize};

/// Placeholder used when a book has no readable title
pub const UNKNOWN_TITLE: &str = "Unknown Title";

/// Placeholder used when a book has no readable creator
pub const UNKNOWN_AUTHOR: &str = "Unknown Author";

/// Book metadata as shown in the library
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtractedMetadata {
    /// Book title, never empty
    pub title: String,

    /// Primary author, never empty
    pub author: String,

    /// Publisher name
    pub publisher: Option<String>,

    /// Language code as written in the package (not validated)
    pub language: Option<String>,

    /// Book description/summary
    pub description: Option<String>,

    /// First identifier marked as an ISBN
    pub isbn: Option<String>,
}

impl ExtractedMetadata {
    /// Build metadata from individually extracted fields, substituting the
    /// placeholders for a missing title or author
    pub fn from_fields(fields: MetadataFields) -> Self {
        Self {
            title: fields.title.unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
            author: fields.author.unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
            publisher: fields.publisher,
            language: fields.language,
            description: fields.description,
            isbn: fields.isbn,
        }
    }

    /// Whether both required fields fell back to their placeholders
    pub fn is_placeholder(&self) -> bool {
        self.title == UNKNOWN_TITLE && self.author == UNKNOWN_AUTHOR
    }
}

impl Default for ExtractedMetadata {
    fn default() -> Self {
        Self::from_fields(MetadataFields::default())
    }
}

/// Per-field extraction results; `None` means the field was absent or unreadable
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataFields {
    pub title: Option<String>,
    pub author: Option<String>,
    pub publisher: Option<String>,
    pub language: Option<String>,
    pub description: Option<String>,
    pub isbn: Option<String>,
}
