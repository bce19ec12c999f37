//! Bibliographic metadata extraction from EPUB containers
//!
//! Every field is extracted independently into an `Option`; a field that is
//! missing or unreadable never prevents the others from being read. Only a
//! container that cannot be opened at all yields the all-default metadata.

use crate::container::{EpubContainer, Package};
use crate::types::{ExtractedMetadata, MetadataFields};
use std::path::Path;

/// Marker that identifies an ISBN among `dc:identifier` entries
const ISBN_MARKER: &str = "ISBN";

/// Reads Dublin Core metadata from EPUB files
#[derive(Debug, Clone, Copy, Default)]
pub struct ContainerParser;

impl ContainerParser {
    pub fn new() -> Self {
        Self
    }

    /// Extract metadata from an EPUB on disk
    pub fn parse(&self, container_path: &Path) -> ExtractedMetadata {
        match std::fs::read(container_path) {
            Ok(data) => self.parse_bytes(&data),
            Err(e) => {
                tracing::warn!(
                    path = %container_path.display(),
                    error = %e,
                    "Could not read EPUB, using default metadata"
                );
                ExtractedMetadata::default()
            }
        }
    }

    /// Extract metadata from EPUB bytes
    pub fn parse_bytes(&self, data: &[u8]) -> ExtractedMetadata {
        match EpubContainer::open(data) {
            Ok(container) => ExtractedMetadata::from_fields(extract_fields(container.package())),
            Err(e) => {
                tracing::warn!(error = %e, "Could not open EPUB container, using default metadata");
                ExtractedMetadata::default()
            }
        }
    }
}

/// Pull each descriptive field out of a parsed package
pub(crate) fn extract_fields(package: &Package) -> MetadataFields {
    MetadataFields {
        title: first(package, "title"),
        author: first(package, "creator"),
        publisher: first(package, "publisher"),
        language: first(package, "language"),
        description: first(package, "description"),
        isbn: find_isbn(package),
    }
}

fn first(package: &Package, name: &str) -> Option<String> {
    package.dc_first(name).map(str::to_string)
}

/// First identifier whose value or any attribute value mentions ISBN
fn find_isbn(package: &Package) -> Option<String> {
    let mentions_isbn = |text: &str| text.to_ascii_uppercase().contains(ISBN_MARKER);

    package
        .dc_values("identifier")
        .find(|entry| {
            mentions_isbn(&entry.value)
                || entry.attributes.iter().any(|(_, value)| mentions_isbn(value))
        })
        .map(|entry| entry.value.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn package(metadata: &str) -> Package {
        let xml = format!(
            r#"<package xmlns="http://www.idpf.org/2007/opf" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:opf="http://www.idpf.org/2007/opf">
<metadata>{}</metadata><manifest/></package>"#,
            metadata
        );
        Package::parse(&xml, "content.opf").unwrap()
    }

    #[test]
    fn test_all_fields() {
        let fields = extract_fields(&package(
            r#"<dc:title>Title</dc:title>
               <dc:creator>First Author</dc:creator>
               <dc:creator>Second Author</dc:creator>
               <dc:publisher>Pub</dc:publisher>
               <dc:language>fr</dc:language>
               <dc:description>About</dc:description>
               <dc:identifier>urn:isbn:9781234567897</dc:identifier>"#,
        ));
        assert_eq!(fields.title.as_deref(), Some("Title"));
        assert_eq!(fields.author.as_deref(), Some("First Author"));
        assert_eq!(fields.publisher.as_deref(), Some("Pub"));
        assert_eq!(fields.language.as_deref(), Some("fr"));
        assert_eq!(fields.description.as_deref(), Some("About"));
        assert_eq!(fields.isbn.as_deref(), Some("urn:isbn:9781234567897"));
    }

    #[test]
    fn test_missing_fields_stay_absent() {
        let fields = extract_fields(&package("<dc:language>en</dc:language>"));
        assert_eq!(fields.title, None);
        assert_eq!(fields.author, None);
        assert_eq!(fields.language.as_deref(), Some("en"));

        let metadata = ExtractedMetadata::from_fields(fields);
        assert_eq!(metadata.title, "Unknown Title");
        assert_eq!(metadata.author, "Unknown Author");
    }

    #[test]
    fn test_isbn_picks_first_marked_identifier() {
        let fields = extract_fields(&package(
            r#"<dc:identifier>urn:uuid:abc</dc:identifier>
               <dc:identifier>ISBN 978-0-00-000000-2</dc:identifier>
               <dc:identifier>isbn:9781111111111</dc:identifier>"#,
        ));
        assert_eq!(fields.isbn.as_deref(), Some("ISBN 978-0-00-000000-2"));
    }

    #[test]
    fn test_isbn_from_scheme_attribute() {
        let fields = extract_fields(&package(
            r#"<dc:identifier opf:scheme="uuid">abc</dc:identifier>
               <dc:identifier opf:scheme="isbn">9780306406157</dc:identifier>"#,
        ));
        assert_eq!(fields.isbn.as_deref(), Some("9780306406157"));
    }

    #[test]
    fn test_isbn_from_id_attribute() {
        let fields = extract_fields(&package(
            r#"<dc:identifier id="uuid_id">urn:uuid:abc</dc:identifier>
               <dc:identifier id="isbn">9780306406157</dc:identifier>"#,
        ));
        assert_eq!(fields.isbn.as_deref(), Some("9780306406157"));
    }

    #[test]
    fn test_isbn_from_refined_scheme_value() {
        let fields = extract_fields(&package(
            r#"<dc:identifier opf:scheme="ISBN-13">9780306406157</dc:identifier>"#,
        ));
        assert_eq!(fields.isbn.as_deref(), Some("9780306406157"));
    }

    #[test]
    fn test_no_isbn() {
        let fields = extract_fields(&package("<dc:identifier>urn:uuid:abc</dc:identifier>"));
        assert!(fields.isbn.is_none());
    }

    #[test]
    fn test_garbage_bytes_yield_defaults() {
        let metadata = ContainerParser::new().parse_bytes(b"PK\x03\x04 broken");
        assert_eq!(metadata, ExtractedMetadata::default());
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let metadata = ContainerParser::new().parse(Path::new("/nonexistent/book.epub"));
        assert!(metadata.is_placeholder());
    }
}
