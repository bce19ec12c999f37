//! EPUB fixtures built in memory for integration tests

#![allow(dead_code)]

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::{Cursor, Write};

pub const CONTAINER_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>"#;

pub const CHAPTER: &[u8] = br#"<?xml version="1.0" encoding="UTF-8"?>
<html xmlns="http://www.w3.org/1999/xhtml"><head><title>One</title></head>
<body><h1>Chapter One</h1><p>It was a dark and stormy night.</p></body></html>"#;

/// Build a package document from raw `<metadata>` and `<manifest>` contents
pub fn opf(metadata: &str, manifest: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="3.0" unique-identifier="uid">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:opf="http://www.idpf.org/2007/opf">
    {metadata}
  </metadata>
  <manifest>
    <item id="ch1" href="text/ch1.xhtml" media-type="application/xhtml+xml"/>
    {manifest}
  </manifest>
  <spine><itemref idref="ch1"/></spine>
</package>"#
    )
}

/// Zip the given entries in order, with `mimetype` first as EPUBs require
pub fn zip_entries(entries: &[(&str, Vec<u8>)]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let stored = zip::write::FileOptions::default()
        .compression_method(zip::CompressionMethod::Stored);
    let deflated = zip::write::FileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);

    writer.start_file("mimetype", stored).unwrap();
    writer.write_all(b"application/epub+zip").unwrap();

    for (name, data) in entries {
        writer.start_file(*name, deflated).unwrap();
        writer.write_all(data).unwrap();
    }

    writer.finish().unwrap().into_inner()
}

/// A standard EPUB: container.xml → OEBPS/content.opf, one chapter, plus `files`
/// (paths relative to OEBPS/)
pub fn epub(package: &str, files: &[(&str, Vec<u8>)]) -> Vec<u8> {
    let names: Vec<String> = files
        .iter()
        .map(|(name, _)| format!("OEBPS/{}", name))
        .collect();

    let mut entries = vec![
        ("META-INF/container.xml", CONTAINER_XML.as_bytes().to_vec()),
        ("OEBPS/content.opf", package.as_bytes().to_vec()),
        ("OEBPS/text/ch1.xhtml", CHAPTER.to_vec()),
    ];
    for (name, (_, data)) in names.iter().zip(files) {
        entries.push((name.as_str(), data.clone()));
    }
    zip_entries(&entries)
}

/// A complete book with a title, author, and a 800×1200 declared cover
pub fn sample_book(title: &str, author: &str) -> Vec<u8> {
    let cover = png(800, 1200, [30, 60, 90]);
    epub(
        &opf(
            &format!(
                r#"<dc:title>{title}</dc:title>
                   <dc:creator>{author}</dc:creator>
                   <dc:language>en</dc:language>
                   <dc:identifier id="uid">urn:uuid:{title}</dc:identifier>"#
            ),
            r#"<item id="cover" href="images/cover.png" media-type="image/png" properties="cover-image"/>"#,
        ),
        &[("images/cover.png", cover)],
    )
}

/// Solid-colour PNG of the given size
pub fn png(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
    encode(width, height, rgb, ImageFormat::Png)
}

/// Solid-colour JPEG of the given size
pub fn jpeg(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
    encode(width, height, rgb, ImageFormat::Jpeg)
}

fn encode(width: u32, height: u32, rgb: [u8; 3], format: ImageFormat) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb(rgb));
    let mut out = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut out), format)
        .unwrap();
    out
}

/// Decode a cover's JPEG payload and return its dimensions
pub fn jpeg_dimensions(data: &[u8]) -> (u32, u32) {
    let img = image::load_from_memory_with_format(data, ImageFormat::Jpeg).unwrap();
    (img.width(), img.height())
}
