//! EPUB container access
//!
//! An EPUB is a zip archive whose `META-INF/container.xml` points at a package
//! document (OPF). [`EpubContainer`] opens the archive, locates and parses the
//! package document, and reads manifest entries by href. Real-world files are
//! often sloppy, so lookups tolerate a missing container.xml and entry names
//! that differ only in case.

mod package;

pub(crate) use package::{ManifestItem, Package};

use crate::error::ContainerError;
use std::io::{Cursor, Read};
use zip::ZipArchive;

const CONTAINER_XML: &str = "META-INF/container.xml";

/// Largest entry (package document, cover image) read into memory
pub(crate) const MAX_ENTRY_SIZE: u64 = 64 * 1024 * 1024;

/// An opened EPUB archive with its parsed package document
pub(crate) struct EpubContainer<'a> {
    archive: ZipArchive<Cursor<&'a [u8]>>,
    package: Package,
}

impl<'a> EpubContainer<'a> {
    /// Open an archive and parse its package document
    pub fn open(data: &'a [u8]) -> Result<Self, ContainerError> {
        let mut archive = ZipArchive::new(Cursor::new(data))?;

        let opf_path = find_package_path(&mut archive)?;
        let opf_bytes = read_entry(&mut archive, &opf_path)?;
        let package = Package::parse(&decode_text(&opf_bytes), &opf_path)?;

        tracing::debug!(
            opf = %package.path,
            manifest_items = package.manifest.len(),
            "Opened EPUB container"
        );

        Ok(Self { archive, package })
    }

    pub fn package(&self) -> &Package {
        &self.package
    }

    /// Read the bytes of a manifest item
    pub fn read_item(&mut self, item: &ManifestItem) -> Result<Vec<u8>, ContainerError> {
        read_entry(&mut self.archive, &item.path)
    }
}

/// Find the package document path, preferring container.xml and falling back
/// to the first `.opf` entry in the archive
fn find_package_path(archive: &mut ZipArchive<Cursor<&[u8]>>) -> Result<String, ContainerError> {
    match read_entry(archive, CONTAINER_XML) {
        Ok(bytes) => match rootfile_path(&decode_text(&bytes)) {
            Some(path) => return Ok(path),
            None => tracing::warn!("container.xml has no usable rootfile"),
        },
        Err(e) => tracing::warn!(error = %e, "Could not read container.xml"),
    }

    archive
        .file_names()
        .find(|name| name.to_ascii_lowercase().ends_with(".opf"))
        .map(str::to_string)
        .ok_or(ContainerError::MissingPackage)
}

/// Extract the first `rootfile/@full-path` from container.xml
fn rootfile_path(xml: &str) -> Option<String> {
    let doc = roxmltree::Document::parse_with_options(xml, package::parsing_options()).ok()?;
    doc.descendants()
        .filter(|n| n.tag_name().name() == "rootfile")
        .filter_map(|n| n.attribute("full-path"))
        .map(|p| p.trim().trim_start_matches('/').to_string())
        .find(|p| !p.is_empty())
}

/// Read an archive entry by name, falling back to a case-insensitive match
fn read_entry(
    archive: &mut ZipArchive<Cursor<&[u8]>>,
    name: &str,
) -> Result<Vec<u8>, ContainerError> {
    read_entry_limited(archive, name, MAX_ENTRY_SIZE)
}

/// Read an entry, refusing anything that inflates past `limit` bytes.
///
/// The declared size is checked first, but the read itself is bounded too
/// since a crafted header can understate it.
fn read_entry_limited(
    archive: &mut ZipArchive<Cursor<&[u8]>>,
    name: &str,
    limit: u64,
) -> Result<Vec<u8>, ContainerError> {
    let resolved = if archive.file_names().any(|candidate| candidate == name) {
        name.to_string()
    } else {
        let lower = name.to_ascii_lowercase();
        archive
            .file_names()
            .find(|candidate| candidate.to_ascii_lowercase() == lower)
            .map(str::to_string)
            .ok_or(zip::result::ZipError::FileNotFound)?
    };

    let too_large = || ContainerError::EntryTooLarge {
        name: resolved.clone(),
        limit,
    };

    let file = archive.by_name(&resolved)?;
    if file.size() > limit {
        return Err(too_large());
    }

    let mut content = Vec::with_capacity(file.size() as usize);
    file.take(limit + 1).read_to_end(&mut content)?;
    if content.len() as u64 > limit {
        return Err(too_large());
    }
    Ok(content)
}

/// Decode XML bytes as UTF-8, tolerating a BOM and invalid sequences
fn decode_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .trim_start_matches('\u{feff}')
        .to_string()
}
