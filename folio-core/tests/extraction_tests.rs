//! Extraction tests for folio-core
//!
//! These tests drive the decomposer through whole books, from container to
//! numbered reading session.
//!
//! ## Test Strategy
//!
//! 1. **End-to-end**: an in-memory book with continuation fragments, an
//!    excluded entry and short chapters, read back by display number
//! 2. **Properties**: continuation stitching stops at the first missing suffix
//! 3. **Real EPUB**: a small book generated with `epub-builder` and parsed by
//!    the `epub` crate

use folio_core::decoder::{EpubContainer, EpubDecomposer, MemoryContainer};
use folio_core::types::TocEntry;
use folio_core::{DecomposerConfig, ReaderConfig, ReadingSession};
use proptest::prelude::*;
use std::sync::Arc;

// =============================================================================
// Helpers
// =============================================================================

fn paragraph(len: usize) -> String {
    format!("<p>{}</p>", "x".repeat(len))
}

fn decomposer(min: usize) -> EpubDecomposer {
    EpubDecomposer::new(DecomposerConfig::default().with_min_content_length(min))
}

fn reader(threshold: usize) -> ReaderConfig {
    ReaderConfig {
        visibility_threshold: threshold,
        ..ReaderConfig::default()
    }
}

// =============================================================================
// End-to-end
// =============================================================================

#[tokio::test]
async fn test_end_to_end_display_numbering() {
    let mut container = MemoryContainer::new()
        .with_metadata("title", "Sample")
        .with_metadata("creator", "A. Writer")
        .with_metadata("date", "2020-05-01")
        .with_fragment("copyright", "copyright.xhtml", paragraph(300))
        .with_fragment("ch1", "ch1.xhtml", paragraph(200))
        .with_fragment("ch2", "ch2.xhtml", paragraph(300))
        .with_fragment("ch2a", "ch2a.xhtml", paragraph(400))
        .with_fragment("ch3", "ch3.xhtml", paragraph(200))
        .with_toc_entry(TocEntry::new("Copyright", "copyright.xhtml").with_id("copyright"))
        .with_toc_entry(TocEntry::new("One", "ch1.xhtml").with_id("ch1"))
        .with_toc_entry(TocEntry::new("Two", "ch2.xhtml").with_id("ch2"))
        .with_toc_entry(TocEntry::new("Three", "ch3.xhtml").with_id("ch3"));

    let book = decomposer(100).decompose(&mut container).await.unwrap();
    assert_eq!(book.chapters.len(), 3);
    assert_eq!(book.display_title(), "Sample — A. Writer (2020)");

    let session = ReadingSession::new("sample.epub", Arc::new(book), &reader(500));
    assert_eq!(session.display_map().len(), 1);

    let chapter = session.chapter(1).unwrap();
    assert_eq!(chapter.real_number, 2);
    assert_eq!(chapter.name, "Two");
    // two fragments and the blank line between them
    assert_eq!(chapter.content_length, 702);
    assert!(session.chapter(2).is_err());

    let info = serde_json::to_value(session.book_info(|_| false)).unwrap();
    assert_eq!(info["displayToRealMap"]["1"], 2);
    assert_eq!(info["chapters"][0]["contentLength"], 702);
}

#[tokio::test]
async fn test_grouped_week_layout() {
    let mut container = MemoryContainer::new()
        .with_fragment("intro", "intro.xhtml", paragraph(50))
        .with_fragment("m1", "m1.xhtml", paragraph(50))
        .with_fragment("t1", "t1.xhtml", paragraph(50))
        .with_fragment("end", "end.xhtml", paragraph(50))
        .with_toc_entry(TocEntry::new("Introduction", "intro.xhtml").with_id("intro"))
        .with_toc_entry(TocEntry::new("Monday", "monday.xhtml"))
        .with_toc_entry(TocEntry::new("Morning", "m1.xhtml").with_level(1).with_id("m1"))
        .with_toc_entry(TocEntry::new("Tuesday", "tuesday.xhtml"))
        .with_toc_entry(TocEntry::new("Evening", "t1.xhtml").with_level(1).with_id("t1"))
        .with_toc_entry(TocEntry::new("Afterword", "end.xhtml").with_id("end"));

    let book = decomposer(0).decompose(&mut container).await.unwrap();
    let session = ReadingSession::new("week.epub", Arc::new(book), &reader(0));
    let grouping = session.grouping();

    let labels: Vec<Option<&str>> = grouping.sections.iter().map(|s| s.label).collect();
    assert_eq!(labels, vec![Some("Monday"), Some("Tuesday")]);
    assert_eq!(grouping.before[0].name, "Introduction");
    assert_eq!(grouping.after[0].name, "Afterword");

    let order: Vec<u32> = grouping.iter().map(|c| c.real_number).collect();
    assert_eq!(order, vec![1, 2, 3, 4]);
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn prop_continuation_stops_at_first_gap(present in proptest::collection::vec(any::<bool>(), 0..8)) {
        let mut container = MemoryContainer::new()
            .with_fragment("ch", "ch.xhtml", "<p>base</p>")
            .with_toc_entry(TocEntry::new("Chapter", "ch.xhtml").with_id("ch"));
        for (suffix, exists) in ('a'..='z').zip(&present) {
            if *exists {
                let id = format!("ch{}", suffix);
                container = container.with_fragment(
                    id.clone(),
                    format!("{}.xhtml", id),
                    format!("<p>{}</p>", suffix),
                );
            }
        }

        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let book = runtime.block_on(decomposer(0).decompose(&mut container)).unwrap();

        let contiguous = present.iter().take_while(|exists| **exists).count();
        let expected: Vec<String> = std::iter::once("base".to_string())
            .chain(('a'..='z').take(contiguous).map(|c| c.to_string()))
            .collect();
        prop_assert_eq!(&book.chapters[0].content, &expected.join("\n\n"));
    }
}

// =============================================================================
// Real EPUB
// =============================================================================

fn build_epub() -> Vec<u8> {
    use epub_builder::{EpubBuilder, EpubContent, ReferenceType, ZipLibrary};

    let chapter = |title: &str, body: &str| {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<html xmlns="http://www.w3.org/1999/xhtml"><head><title>{title}</title></head>
<body><h1>{title}</h1><p>{body}</p></body></html>"#
        )
    };
    let long_text = "It was a bright cold day in April. ".repeat(10);

    let mut builder = EpubBuilder::new(ZipLibrary::new().unwrap()).unwrap();
    builder.metadata("title", "Generated Book").unwrap();
    builder.metadata("author", "Test Author").unwrap();
    builder
        .add_content(
            EpubContent::new("copyright.xhtml", chapter("Copyright", "All rights reserved.").as_bytes())
                .title("Copyright")
                .reftype(ReferenceType::Copyright),
        )
        .unwrap();
    builder
        .add_content(
            EpubContent::new("chapter_1.xhtml", chapter("Chapter One", &long_text).as_bytes())
                .title("Chapter One")
                .reftype(ReferenceType::Text),
        )
        .unwrap();
    builder
        .add_content(
            EpubContent::new("chapter_2.xhtml", chapter("Chapter Two", "Too short.").as_bytes())
                .title("Chapter Two"),
        )
        .unwrap();

    let mut data = Vec::new();
    builder.generate(&mut data).unwrap();
    data
}

#[tokio::test]
async fn test_generated_epub_is_decomposed() {
    let mut container = EpubContainer::from_bytes(build_epub()).unwrap();
    let book = decomposer(100).decompose(&mut container).await.unwrap();

    assert_eq!(book.title, "Generated Book");
    assert_eq!(book.author, "Test Author");
    assert_eq!(book.chapters.len(), 1);

    let chapter = &book.chapters[0];
    assert_eq!(chapter.name, "Chapter One");
    assert!(chapter.content.starts_with("# Chapter One"));
    assert!(chapter.content.contains("bright cold day in April."));
}

#[tokio::test]
async fn test_garbage_is_not_an_epub() {
    assert!(EpubContainer::from_bytes(b"definitely not a zip".to_vec()).is_err());
}
