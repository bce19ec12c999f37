//! OPF (Open Packaging Format) package document parsing

use crate::error::ContainerError;

/// Dublin Core element names kept from `<metadata>`
const DC_ELEMENTS: &[&str] = &[
    "title",
    "creator",
    "contributor",
    "publisher",
    "language",
    "description",
    "identifier",
    "subject",
    "date",
    "rights",
];

/// The parts of a package document the library cares about
#[derive(Debug, Clone, Default)]
pub(crate) struct Package {
    /// Archive path of the package document
    pub path: String,

    /// Dublin Core entries in document order
    pub dc: Vec<DcEntry>,

    /// Manifest items in document order
    pub manifest: Vec<ManifestItem>,

    /// Manifest id named by an EPUB 2 `<meta name="cover">`
    pub cover_meta_id: Option<String>,
}

/// A single Dublin Core element
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DcEntry {
    /// Local element name, e.g. `title`
    pub name: String,

    /// Trimmed text content, never empty
    pub value: String,

    /// Attributes as (local name, trimmed value), e.g. `opf:scheme` or `id`
    pub attributes: Vec<(String, String)>,
}

/// A manifest `<item>`
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ManifestItem {
    pub id: String,

    /// href as written in the manifest
    pub href: String,

    /// href resolved to an archive path
    pub path: String,

    pub media_type: String,

    /// Space-separated `properties` attribute, split
    pub properties: Vec<String>,
}

impl ManifestItem {
    pub fn is_image(&self) -> bool {
        self.media_type
            .trim()
            .to_ascii_lowercase()
            .starts_with("image/")
    }

    pub fn has_property(&self, property: &str) -> bool {
        self.properties.iter().any(|p| p == property)
    }
}

impl Package {
    /// Parse a package document located at `path` inside the archive
    pub fn parse(xml: &str, path: &str) -> Result<Self, ContainerError> {
        let doc = roxmltree::Document::parse_with_options(xml, parsing_options()).map_err(|e| {
            ContainerError::Xml {
                path: path.to_string(),
                message: e.to_string(),
            }
        })?;

        let base_dir = path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("");

        // Some packages omit <metadata>; fall back to scanning the whole document
        let metadata_root = doc
            .descendants()
            .find(|n| n.is_element() && n.tag_name().name() == "metadata")
            .unwrap_or_else(|| doc.root_element());

        let mut dc = Vec::new();
        let mut cover_meta_id = None;

        for node in metadata_root.descendants().filter(|n| n.is_element()) {
            let name = node.tag_name().name();

            if name == "meta" {
                if cover_meta_id.is_none() && node.attribute("name") == Some("cover") {
                    cover_meta_id = node
                        .attribute("content")
                        .map(|c| c.trim().to_string())
                        .filter(|c| !c.is_empty());
                }
                continue;
            }

            if !DC_ELEMENTS.contains(&name) {
                continue;
            }

            let value = text_content(&node);
            if value.is_empty() {
                continue;
            }

            let attributes = node
                .attributes()
                .map(|a| (a.name().to_string(), a.value().trim().to_string()))
                .collect();

            dc.push(DcEntry {
                name: name.to_string(),
                value,
                attributes,
            });
        }

        let manifest = doc
            .descendants()
            .filter(|n| n.is_element() && n.tag_name().name() == "item")
            .filter_map(|node| {
                let href = node.attribute("href")?.trim();
                if href.is_empty() {
                    return None;
                }
                Some(ManifestItem {
                    id: node.attribute("id").unwrap_or_default().trim().to_string(),
                    href: href.to_string(),
                    path: resolve_href(base_dir, href),
                    media_type: node
                        .attribute("media-type")
                        .unwrap_or_default()
                        .trim()
                        .to_string(),
                    properties: node
                        .attribute("properties")
                        .map(|p| p.split_whitespace().map(str::to_string).collect())
                        .unwrap_or_default(),
                })
            })
            .collect();

        Ok(Self {
            path: path.to_string(),
            dc,
            manifest,
            cover_meta_id,
        })
    }

    /// All values of a Dublin Core element, in document order
    pub fn dc_values<'p, 'n>(&'p self, name: &'n str) -> impl Iterator<Item = &'p DcEntry> + 'n
    where
        'p: 'n,
    {
        self.dc.iter().filter(move |entry| entry.name == name)
    }

    /// First value of a Dublin Core element
    pub fn dc_first(&self, name: &str) -> Option<&str> {
        self.dc
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.value.as_str())
    }

    /// Manifest item by id
    pub fn item_by_id(&self, id: &str) -> Option<&ManifestItem> {
        self.manifest.iter().find(|item| item.id == id)
    }
}

/// Options shared by every XML parse: EPUB 2 documents often carry a DOCTYPE
pub(crate) fn parsing_options() -> roxmltree::ParsingOptions {
    roxmltree::ParsingOptions {
        allow_dtd: true,
        ..roxmltree::ParsingOptions::default()
    }
}

/// Concatenated, trimmed text of an element and its descendants
fn text_content(node: &roxmltree::Node) -> String {
    node.descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect::<String>()
        .trim()
        .to_string()
}

/// Resolve a manifest href against the package directory into an archive path
fn resolve_href(base_dir: &str, href: &str) -> String {
    let href = href.split('#').next().unwrap_or(href);
    let decoded = urlencoding::decode(href)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| href.to_string());

    let joined = if decoded.starts_with('/') || base_dir.is_empty() {
        decoded.trim_start_matches('/').to_string()
    } else {
        format!("{}/{}", base_dir, decoded)
    };

    let mut segments: Vec<&str> = Vec::new();
    for segment in joined.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    segments.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    const OPF: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="2.0" unique-identifier="uid">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:opf="http://www.idpf.org/2007/opf">
    <dc:title>  The Test Book </dc:title>
    <dc:creator opf:role="aut">Ada Author</dc:creator>
    <dc:identifier id="uid">urn:uuid:1234</dc:identifier>
    <dc:identifier opf:scheme="ISBN">9780000000002</dc:identifier>
    <dc:description></dc:description>
    <meta name="cover" content="cover-img"/>
  </metadata>
  <manifest>
    <item id="ch1" href="text/ch1.xhtml" media-type="application/xhtml+xml"/>
    <item id="cover-img" href="images/My%20Cover.jpg" media-type="image/jpeg"/>
    <item id="nav" href="nav.xhtml" media-type="application/xhtml+xml" properties="nav"/>
  </manifest>
  <spine><itemref idref="ch1"/></spine>
</package>"#;

    #[test]
    fn test_parse_metadata_and_manifest() {
        let package = Package::parse(OPF, "OEBPS/content.opf").unwrap();

        assert_eq!(package.dc_first("title"), Some("The Test Book"));
        assert_eq!(package.dc_first("creator"), Some("Ada Author"));
        assert_eq!(package.dc_first("description"), None);
        assert_eq!(package.dc_values("identifier").count(), 2);
        assert_eq!(package.cover_meta_id.as_deref(), Some("cover-img"));

        let ids: Vec<_> = package.manifest.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["ch1", "cover-img", "nav"]);

        let cover = package.item_by_id("cover-img").unwrap();
        assert!(cover.is_image());
        assert_eq!(cover.path, "OEBPS/images/My Cover.jpg");
        assert!(package.item_by_id("nav").unwrap().has_property("nav"));
    }

    #[test]
    fn test_attributes_are_captured() {
        let package = Package::parse(OPF, "content.opf").unwrap();
        let identifiers: Vec<_> = package.dc_values("identifier").collect();
        let pair = |key: &str, value: &str| (key.to_string(), value.to_string());

        assert_eq!(identifiers[0].attributes, vec![pair("id", "uid")]);
        assert_eq!(identifiers[1].attributes, vec![pair("scheme", "ISBN")]);
        assert_eq!(identifiers[1].value, "9780000000002");
    }

    #[test]
    fn test_dc_first_outlives_name() {
        let package = Package::parse(OPF, "content.opf").unwrap();
        let title = {
            let name = String::from("title");
            package.dc_first(&name)
        };
        assert_eq!(title, Some("The Test Book"));
    }

    #[test]
    fn test_doctype_is_accepted() {
        let xml = r#"<?xml version="1.0"?>
<!DOCTYPE package>
<package><metadata><title>Doc</title></metadata></package>"#;
        let package = Package::parse(xml, "content.opf").unwrap();
        assert_eq!(package.dc_first("title"), Some("Doc"));
    }

    #[test]
    fn test_malformed_xml_is_an_error() {
        let result = Package::parse("<package><metadata>", "content.opf");
        assert!(matches!(result, Err(ContainerError::Xml { .. })));
    }

    #[test]
    fn test_resolve_href() {
        assert_eq!(resolve_href("", "cover.jpg"), "cover.jpg");
        assert_eq!(resolve_href("OEBPS", "img/a.png"), "OEBPS/img/a.png");
        assert_eq!(resolve_href("OEBPS/text", "../img/a.png"), "OEBPS/img/a.png");
        assert_eq!(resolve_href("OEBPS", "./a.png#frag"), "OEBPS/a.png");
        assert_eq!(resolve_href("OEBPS", "/root.png"), "root.png");
    }
}
