//! Info command implementation

use anyhow::{Context, Result};
use readshelf_core::{fingerprint, ContainerParser, CoverResolver, LibraryConfig};
use serde::Serialize;
use std::path::Path;

/// Book info output
#[derive(Serialize)]
struct BookInfo {
    fingerprint: String,
    title: String,
    author: String,
    publisher: Option<String>,
    language: Option<String>,
    description: Option<String>,
    isbn: Option<String>,
    cover: Option<CoverInfo>,
}

#[derive(Serialize)]
struct CoverInfo {
    width: u32,
    height: u32,
    source: String,
}

/// Display metadata and cover of an EPUB without importing it
pub fn info(config: &LibraryConfig, input: &str, json: bool) -> Result<()> {
    let input_path = Path::new(input);
    let data =
        std::fs::read(input_path).with_context(|| format!("Failed to open input file: {}", input))?;

    let metadata = ContainerParser::new().parse_bytes(&data);
    let cover = CoverResolver::with_options(config.cover).resolve_bytes(&data);

    let info = BookInfo {
        fingerprint: fingerprint(&data).to_string(),
        title: metadata.title,
        author: metadata.author,
        publisher: metadata.publisher,
        language: metadata.language,
        description: metadata.description,
        isbn: metadata.isbn,
        cover: cover.map(|c| CoverInfo {
            width: c.width,
            height: c.height,
            source: c.source_href,
        }),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        println!("Title:       {}", info.title);
        println!("Author:      {}", info.author);
        if let Some(lang) = &info.language {
            println!("Language:    {}", lang);
        }
        if let Some(pub_) = &info.publisher {
            println!("Publisher:   {}", pub_);
        }
        if let Some(isbn) = &info.isbn {
            println!("ISBN:        {}", isbn);
        }
        if let Some(desc) = &info.description {
            println!("Description: {}", desc);
        }
        match &info.cover {
            Some(cover) => println!("Cover:       {}x{} ({})", cover.width, cover.height, cover.source),
            None => println!("Cover:       none"),
        }
        println!("Fingerprint: {}", info.fingerprint);
    }

    Ok(())
}
