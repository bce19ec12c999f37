//! Cover image extraction
//!
//! Candidates are searched with an ordered list of [`CoverStrategy`] values;
//! the first strategy that names a manifest item wins. The chosen image is
//! downscaled to fit the configured bounding box, re-encoded as JPEG and
//! wrapped in a data URI. A cover that cannot be read or decoded is reported
//! as no cover at all.

use crate::container::{EpubContainer, ManifestItem, Package};
use crate::types::CoverAsset;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Bounding box and encoding settings for covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverOptions {
    pub max_width: u32,
    pub max_height: u32,

    /// JPEG quality, 1-100
    pub quality: u8,
}

impl Default for CoverOptions {
    fn default() -> Self {
        Self {
            max_width: 400,
            max_height: 600,
            quality: 85,
        }
    }
}

/// Ways of picking the cover among manifest items, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverStrategy {
    /// Item declared as the cover (`properties="cover-image"` or `<meta name="cover">`)
    Declared,

    /// First image whose id or href mentions "cover"
    Named,

    /// First image in manifest order
    FirstImage,
}

impl CoverStrategy {
    /// Search order
    pub const ORDER: [CoverStrategy; 3] = [Self::Declared, Self::Named, Self::FirstImage];

    pub(crate) fn select(self, package: &Package) -> Option<&ManifestItem> {
        match self {
            Self::Declared => package
                .manifest
                .iter()
                .find(|item| item.has_property("cover-image"))
                .or_else(|| {
                    let id = package.cover_meta_id.as_deref()?;
                    // Some EPUB 2 tools write the href instead of the id
                    package
                        .item_by_id(id)
                        .or_else(|| package.manifest.iter().find(|item| item.href == id))
                        .filter(|item| item.is_image())
                }),
            Self::Named => package.manifest.iter().filter(|i| i.is_image()).find(|item| {
                item.id.to_lowercase().contains("cover")
                    || item.href.to_lowercase().contains("cover")
            }),
            Self::FirstImage => package.manifest.iter().find(|item| item.is_image()),
        }
    }
}

/// Pick the cover item using the strategies in order
pub(crate) fn select_candidate(package: &Package) -> Option<(CoverStrategy, &ManifestItem)> {
    CoverStrategy::ORDER
        .iter()
        .find_map(|strategy| strategy.select(package).map(|item| (*strategy, item)))
}

/// Extracts and normalizes cover images from EPUB files
#[derive(Debug, Clone, Default)]
pub struct CoverResolver {
    options: CoverOptions,
}

impl CoverResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: CoverOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CoverOptions {
        &self.options
    }

    /// Resolve the cover of an EPUB on disk
    pub fn resolve(&self, container_path: &Path) -> Option<CoverAsset> {
        match std::fs::read(container_path) {
            Ok(data) => self.resolve_bytes(&data),
            Err(e) => {
                tracing::warn!(
                    path = %container_path.display(),
                    error = %e,
                    "Could not read EPUB for cover extraction"
                );
                None
            }
        }
    }

    /// Resolve the cover of an EPUB held in memory
    pub fn resolve_bytes(&self, data: &[u8]) -> Option<CoverAsset> {
        let mut container = match EpubContainer::open(data) {
            Ok(container) => container,
            Err(e) => {
                tracing::warn!(error = %e, "Could not open EPUB container for cover");
                return None;
            }
        };

        let (strategy, item) = match select_candidate(container.package()) {
            Some((strategy, item)) => (strategy, item.clone()),
            None => {
                tracing::debug!("No cover candidate in manifest");
                return None;
            }
        };

        tracing::debug!(?strategy, href = %item.href, "Selected cover candidate");

        let bytes = match container.read_item(&item) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(href = %item.href, error = %e, "Could not read cover image");
                return None;
            }
        };

        match self.render(&bytes, &item.href) {
            Ok(cover) => Some(cover),
            Err(e) => {
                tracing::warn!(href = %item.href, error = %e, "Could not decode cover image");
                None
            }
        }
    }

    /// Decode, downscale and re-encode an image as a JPEG cover
    pub fn render(&self, data: &[u8], source_href: &str) -> Result<CoverAsset, image::ImageError> {
        let decoded = image::load_from_memory(data)?;
        let resized = fit_within(decoded, self.options.max_width, self.options.max_height);

        // JPEG has no alpha channel
        let rgb = DynamicImage::ImageRgb8(resized.to_rgb8());

        let mut jpeg = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut jpeg, self.options.quality.clamp(1, 100));
        rgb.write_with_encoder(encoder)?;

        Ok(CoverAsset::from_jpeg(jpeg, rgb.width(), rgb.height(), source_href))
    }
}

/// Shrink an image to fit the box, preserving aspect ratio; never enlarges
fn fit_within(image: DynamicImage, max_width: u32, max_height: u32) -> DynamicImage {
    let max_width = max_width.max(1);
    let max_height = max_height.max(1);
    if image.width() <= max_width && image.height() <= max_height {
        image
    } else {
        image.resize(max_width, max_height, FilterType::Lanczos3)
    }
}
