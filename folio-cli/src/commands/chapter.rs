//! Chapter command implementation

use anyhow::{Context, Result};
use folio_core::FolioConfig;
use std::path::Path;

/// Print a chapter by display number, as raw text or rendered HTML
pub async fn chapter(input: &Path, number: u32, html: bool, config: &FolioConfig) -> Result<()> {
    let session = super::open_session(input, config).await?;

    if html {
        let ticket = session.begin_navigation();
        let view = session
            .navigate(ticket, number, None)
            .with_context(|| format!("Cannot show chapter {}", number))?
            .context("Navigation was superseded")?;
        tracing::info!("Chapter {} is real chapter {}", number, view.real_number);
        println!("{}", view.html);
    } else {
        let chapter = session
            .chapter(number)
            .with_context(|| format!("Cannot show chapter {}", number))?;
        tracing::info!("Chapter {} is real chapter {}", number, chapter.real_number);
        println!("{}", chapter.content);
    }

    Ok(())
}
