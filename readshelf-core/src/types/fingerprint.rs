//! Content fingerprint type

use serde::{Deserialize, Serialize};
use std::fmt;

/// Length of a hex-encoded SHA-256 digest
pub const FINGERPRINT_LEN: usize = 64;

/// Hex SHA-256 digest of a book file's raw bytes.
///
/// The fingerprint is the only identity stored content has: it names the file
/// on disk and is unique across the library.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentFingerprint(String);

impl ContentFingerprint {
    /// Wrap an already-computed lowercase hex digest
    pub(crate) fn from_digest(hex: String) -> Self {
        Self(hex)
    }

    /// Parse a fingerprint supplied from outside (CLI, index file)
    ///
    /// Accepts 64 hex digits in either case and normalises to lowercase.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.len() == FINGERPRINT_LEN && value.chars().all(|c| c.is_ascii_hexdigit()) {
            Some(Self(value.to_ascii_lowercase()))
        } else {
            None
        }
    }

    /// The hex digest
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Storage path for a book with this fingerprint, relative to the books root
    pub fn storage_file_name(&self) -> String {
        format!("{}.epub", self.0)
    }
}

impl fmt::Display for ContentFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ContentFingerprint {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("invalid content fingerprint: {:?}", value))
    }
}

impl From<ContentFingerprint> for String {
    fn from(fingerprint: ContentFingerprint) -> Self {
        fingerprint.0
    }
}

impl AsRef<str> for ContentFingerprint {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
