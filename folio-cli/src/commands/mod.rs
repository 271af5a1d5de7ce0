//! CLI command implementations

mod annotate;
mod chapter;
mod info;

pub use annotate::annotate;
pub use chapter::chapter;
pub use info::info;

use anyhow::{Context, Result};
use folio_core::decoder::{EpubContainer, EpubDecomposer};
use folio_core::{FolioConfig, ReadingSession};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Extract an EPUB and open a reading session over it
async fn open_session(input: &Path, config: &FolioConfig) -> Result<ReadingSession> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));

    pb.set_message("Reading EPUB...");
    let container = EpubContainer::open(input)
        .await
        .with_context(|| format!("Failed to open {}", input.display()));
    let mut container = match container {
        Ok(container) => container,
        Err(err) => {
            pb.finish_and_clear();
            return Err(err);
        }
    };

    pb.set_message("Extracting chapters...");
    let book = EpubDecomposer::new(config.decomposer.clone())
        .decompose(&mut container)
        .await
        .with_context(|| format!("Failed to extract {}", input.display()));
    pb.finish_and_clear();
    let book = book?;

    Ok(ReadingSession::new(book_name(input), Arc::new(book), &config.reader))
}

/// Name resource URLs use for the book at `path`: its file name
fn book_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default()
}
