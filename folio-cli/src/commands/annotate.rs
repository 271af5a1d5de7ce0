//! Annotate command implementation

use anyhow::{Context, Result};
use folio_core::annotate::{
    AnnotationDocument, AnnotationRangeResolver, ChapterRenderer, ChapterStats, HtmlOverlayRenderer,
};
use folio_core::sidebar::{build_cards, SidebarCard};
use folio_core::FolioConfig;
use serde::Serialize;
use std::path::Path;

/// Annotated chapter output
#[derive(Serialize)]
struct AnnotateOutput {
    html: String,
    anchors: Vec<String>,
    cards: Vec<SidebarCard>,
    stats: ChapterStats,
}

/// Resolve an annotation document against a chapter text and print the annotated HTML
pub async fn annotate(text: &Path, tags: &Path, json: bool, config: &FolioConfig) -> Result<()> {
    let raw = tokio::fs::read_to_string(text)
        .await
        .with_context(|| format!("Failed to read {}", text.display()))?;
    let tags_json = tokio::fs::read_to_string(tags)
        .await
        .with_context(|| format!("Failed to read {}", tags.display()))?;

    let document = AnnotationDocument::from_json(&tags_json)
        .with_context(|| format!("Failed to parse {}", tags.display()))?;
    let resolution = AnnotationRangeResolver::new().resolve(&raw, &document);

    let book_name = super::book_name(text);
    let html = ChapterRenderer::from_config(&config.reader).render(&raw, &book_name);
    let annotated = HtmlOverlayRenderer::new().render(&html, &raw, &resolution.ranges);

    let stats = ChapterStats::new(&raw, &resolution.ranges);
    tracing::info!("{}", stats.summary());
    if !resolution.dropped.is_empty() || !annotated.skipped.is_empty() {
        tracing::info!(
            "{} annotation(s) not found, {} not rendered",
            resolution.dropped.len(),
            annotated.skipped.len()
        );
    }

    if json {
        let output = AnnotateOutput {
            cards: build_cards(&resolution.ranges, &annotated.anchors),
            html: annotated.html,
            anchors: annotated.anchors,
            stats,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", annotated.html);
    }

    Ok(())
}
