//! Import command implementation

use anyhow::{bail, Result};
use indicatif::{ProgressBar, ProgressStyle};
use readshelf_core::{BookRecord, ImportError, LibraryConfig};
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// What happened to one file
enum Outcome {
    Imported(BookRecord),
    Duplicate(String),
    Failed(String),
}

/// Import EPUB files into the library
pub async fn import(config: LibraryConfig, files: &[PathBuf]) -> Result<()> {
    let permits = Arc::new(Semaphore::new(config.max_concurrent_imports.max(1)));
    let pipeline = Arc::new(super::open_library(config).await?);

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7} {msg}")?
            .progress_chars("##-"),
    );

    // A file is only read into memory once its task holds a permit
    let mut tasks = JoinSet::new();
    for (index, path) in files.iter().cloned().enumerate() {
        let pipeline = Arc::clone(&pipeline);
        spawn_bounded(&mut tasks, &permits, async move {
            let outcome = match tokio::fs::read(&path).await {
                Ok(data) => match pipeline.import(data).await {
                    Ok(record) => Outcome::Imported(record),
                    Err(e @ ImportError::DuplicateContent { .. }) => Outcome::Duplicate(e.to_string()),
                    Err(e) => Outcome::Failed(e.to_string()),
                },
                Err(e) => Outcome::Failed(format!("Failed to read file: {}", e)),
            };
            (index, path, outcome)
        });
    }

    let mut results = Vec::with_capacity(files.len());
    while let Some(joined) = tasks.join_next().await {
        results.push(joined?);
        pb.inc(1);
    }
    pb.finish_and_clear();

    results.sort_by_key(|(index, _, _)| *index);

    let mut imported = 0;
    let mut duplicates = 0;
    let mut errors = 0;

    for (_, path, outcome) in &results {
        match outcome {
            Outcome::Imported(record) => {
                imported += 1;
                println!(
                    "Imported: '{}' by {} ({})",
                    record.title(),
                    record.author(),
                    record.fingerprint
                );
            }
            Outcome::Duplicate(message) => {
                duplicates += 1;
                println!("Skipped {}: {}", path.display(), message);
            }
            Outcome::Failed(message) => {
                errors += 1;
                tracing::error!("Failed to import {:?}: {}", path, message);
                println!("Failed {}: {}", path.display(), message);
            }
        }
    }

    println!("\nImport complete:");
    println!("  Imported:   {}", imported);
    println!("  Duplicates: {}", duplicates);
    println!("  Errors:     {}", errors);

    if errors > 0 {
        bail!("Import completed with {} errors", errors);
    }

    Ok(())
}

/// Spawn `work` so that it starts only after taking one of `permits`
fn spawn_bounded<T, F>(tasks: &mut JoinSet<T>, permits: &Arc<Semaphore>, work: F)
where
    T: Send + 'static,
    F: Future<Output = T> + Send + 'static,
{
    let permits = Arc::clone(permits);
    tasks.spawn(async move {
        // The semaphore is never closed, so acquiring only waits
        let _permit = permits.acquire_owned().await;
        work.await
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_spawn_bounded_limits_concurrency() {
        let permits = Arc::new(Semaphore::new(2));
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let mut tasks = JoinSet::new();
        for _ in 0..8 {
            let active = Arc::clone(&active);
            let peak = Arc::clone(&peak);
            spawn_bounded(&mut tasks, &permits, async move {
                let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(10)).await;
                active.fetch_sub(1, Ordering::SeqCst);
            });
        }

        let mut finished = 0;
        while let Some(joined) = tasks.join_next().await {
            joined.unwrap();
            finished += 1;
        }
        assert_eq!(finished, 8);
        assert_eq!(peak.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_spawn_bounded_defers_work() {
        let permits = Arc::new(Semaphore::new(1));
        let held = Arc::clone(&permits).acquire_owned().await.unwrap();
        let started = Arc::new(AtomicUsize::new(0));

        let mut tasks = JoinSet::new();
        let flag = Arc::clone(&started);
        spawn_bounded(&mut tasks, &permits, async move {
            flag.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(started.load(Ordering::SeqCst), 0);

        drop(held);
        tasks.join_next().await.unwrap().unwrap();
        assert_eq!(started.load(Ordering::SeqCst), 1);
    }
}
