//! Core data types for the Readshelf library

mod cover;
mod fingerprint;
mod metadata;
mod position;
mod record;

pub use cover::{CoverAsset, COVER_DATA_URI_PREFIX};
pub use fingerprint::{ContentFingerprint, FINGERPRINT_LEN};
pub use metadata::{ExtractedMetadata, MetadataFields, UNKNOWN_AUTHOR, UNKNOWN_TITLE};
pub use position::{PositionUpdate, ReadingPosition};
pub use record::BookRecord;
