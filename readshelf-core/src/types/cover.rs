//! Cover image payload

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};

/// Prefix of every cover data URI
pub const COVER_DATA_URI_PREFIX: &str = "data:image/jpeg;base64,";

/// A re-encoded JPEG cover ready to be embedded inline
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CoverAsset {
    /// JPEG bytes
    #[serde(with = "base64_serde")]
    pub jpeg: Vec<u8>,

    /// Output width in pixels
    pub width: u32,

    /// Output height in pixels
    pub height: u32,

    /// Manifest href the cover was taken from
    pub source_href: String,
}

impl CoverAsset {
    /// Wrap encoded JPEG bytes
    pub fn from_jpeg(jpeg: Vec<u8>, width: u32, height: u32, source_href: impl Into<String>) -> Self {
        Self {
            jpeg,
            width,
            height,
            source_href: source_href.into(),
        }
    }

    /// `data:image/jpeg;base64,...` wrapper of the JPEG bytes
    pub fn data_uri(&self) -> String {
        format!("{}{}", COVER_DATA_URI_PREFIX, STANDARD.encode(&self.jpeg))
    }
}

/// Base64 serialization for binary data
mod base64_serde {
    use base64::{engine::general_purpose::STANDARD, Engine};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&STANDARD.encode(data))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        STANDARD.decode(&s).map_err(serde::de::Error::custom)
    }
}
