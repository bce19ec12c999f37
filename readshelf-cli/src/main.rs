//! Readshelf CLI - Command-line interface for a personal EPUB library

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use readshelf_core::{LibraryConfig, PositionUpdate};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Parse and validate jobs argument (must be at least 1)
fn parse_jobs(s: &str) -> Result<usize, String> {
    let n: usize = s.parse().map_err(|_| format!("'{}' is not a valid number", s))?;
    if n < 1 {
        Err("jobs must be at least 1".to_string())
    } else {
        Ok(n)
    }
}

#[derive(Parser)]
#[command(name = "readshelf")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Library directory (overrides READSHELF_LIBRARY_PATH)
    #[arg(long, global = true)]
    library: Option<PathBuf>,

    /// Number of concurrent imports (must be at least 1)
    #[arg(short, long, global = true, value_parser = parse_jobs)]
    jobs: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import EPUB files into the library
    Import {
        /// EPUB files to import
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// List the books in the library
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Display metadata and cover of an EPUB without importing it
    Info {
        /// Input file path
        input: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Record reading progress for a book
    Progress {
        /// Fingerprint of the book, as shown by `list`
        fingerprint: String,

        /// Exact location token (e.g. an EPUB CFI)
        #[arg(long)]
        location: Option<String>,

        /// Zero-based chapter index
        #[arg(long)]
        chapter: Option<u32>,

        /// Fraction read, between 0.0 and 1.0
        #[arg(long, allow_negative_numbers = true)]
        percentage: Option<f64>,
    },

    /// Remove a book and its stored file from the library
    Remove {
        /// Fingerprint of the book, as shown by `list`
        fingerprint: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        "readshelf_cli=debug,readshelf_core=debug"
    } else {
        "readshelf_cli=info"
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = LibraryConfig::from_env();
    if let Some(library) = cli.library {
        config.library_root = library;
    }
    if let Some(jobs) = cli.jobs {
        config = config.with_max_concurrent_imports(jobs);
    }
    tracing::debug!(library = %config.library_root.display(), "Using library");

    match cli.command {
        Commands::Import { files } => commands::import(config, &files).await,

        Commands::List { json } => commands::list(config, json).await,

        Commands::Info { input, json } => commands::info(&config, &input, json),

        Commands::Progress {
            fingerprint,
            location,
            chapter,
            percentage,
        } => {
            let update = PositionUpdate {
                exact_location_token: location,
                chapter_index: chapter,
                percentage,
                ..PositionUpdate::default()
            };
            commands::progress(config, &fingerprint, update).await
        }

        Commands::Remove { fingerprint } => commands::remove(config, &fingerprint).await,
    }
}
