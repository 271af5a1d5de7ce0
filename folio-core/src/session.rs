//! Per-book reading state and chapter view assembly

use crate::annotate::{
    AnnotationDocument, AnnotationRangeResolver, ChapterRenderer, ChapterStats, HtmlOverlayRenderer,
};
use crate::config::ReaderConfig;
use crate::error::{NumberingError, Result};
use crate::grouping::{group_chapters, ChapterGrouping};
use crate::numbering::{BookInfo, DisplayMap};
use crate::sidebar::{build_cards, SidebarCard, SidebarLayoutEngine};
use crate::types::{Book, Chapter, ResolvedRangeSet};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Hands out navigation tickets; only the most recent ticket is current
///
/// Clones share the same generation counter.
#[derive(Debug, Clone, Default)]
pub struct NavigationGuard {
    generation: Arc<AtomicU64>,
}

/// Proof that a navigation was started at a given generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationTicket(u64);

impl NavigationGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a navigation, superseding every earlier ticket
    pub fn begin(&self) -> NavigationTicket {
        NavigationTicket(self.generation.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: NavigationTicket) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket.0
    }

    /// Pass `value` through only while `ticket` is still current
    pub fn complete<T>(&self, ticket: NavigationTicket, value: T) -> Option<T> {
        if self.is_current(ticket) {
            Some(value)
        } else {
            tracing::debug!("Discarding result of superseded navigation {}", ticket.0);
            None
        }
    }
}

/// Everything the reading view shows for one chapter
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterView {
    pub display_number: u32,
    pub real_number: u32,
    pub name: String,
    pub html: String,
    /// Rendered anchor ids in reading order
    pub anchors: Vec<String>,
    pub cards: Vec<SidebarCard>,
    pub stats: ChapterStats,
}

/// One open book: its chapters, the active threshold and the numbering it implies
pub struct ReadingSession {
    book_name: String,
    book: Arc<Book>,
    map: DisplayMap,
    renderer: ChapterRenderer,
    sidebar: SidebarLayoutEngine,
    navigation: NavigationGuard,
}

impl ReadingSession {
    /// `book_name` identifies the source file for resource URLs
    pub fn new(book_name: impl Into<String>, book: Arc<Book>, config: &ReaderConfig) -> Self {
        let map = DisplayMap::build(&book.chapters, config.visibility_threshold);
        Self {
            book_name: book_name.into(),
            book,
            map,
            renderer: ChapterRenderer::from_config(config),
            sidebar: SidebarLayoutEngine::from_config(config),
            navigation: NavigationGuard::new(),
        }
    }

    pub fn book(&self) -> &Book {
        &self.book
    }

    pub fn book_name(&self) -> &str {
        &self.book_name
    }

    pub fn threshold(&self) -> usize {
        self.map.threshold()
    }

    /// Change the visibility threshold and renumber
    pub fn set_threshold(&mut self, threshold: usize) {
        if threshold == self.map.threshold() {
            return;
        }
        self.map = DisplayMap::build(&self.book.chapters, threshold);
        tracing::debug!(
            "Threshold {} leaves {} visible chapter(s)",
            threshold,
            self.map.len()
        );
    }

    pub fn display_map(&self) -> &DisplayMap {
        &self.map
    }

    /// Layout engine configured with this session's card gap
    pub fn sidebar(&self) -> &SidebarLayoutEngine {
        &self.sidebar
    }

    pub fn navigation(&self) -> &NavigationGuard {
        &self.navigation
    }

    /// Start navigating to a chapter; any earlier navigation becomes stale
    pub fn begin_navigation(&self) -> NavigationTicket {
        self.navigation.begin()
    }

    pub fn book_info(&self, processed: impl Fn(&str) -> bool) -> BookInfo {
        BookInfo::new(&self.book, &self.map, processed)
    }

    /// Visible chapters in display order
    pub fn visible_chapters(&self) -> impl Iterator<Item = (u32, &Chapter)> + '_ {
        self.map
            .iter()
            .filter_map(|(display, real)| Some((display, self.book.chapter(real)?)))
    }

    /// Visible chapters split into sections
    pub fn grouping(&self) -> ChapterGrouping<'_> {
        group_chapters(self.visible_chapters().map(|(_, chapter)| chapter))
    }

    /// The chapter shown as `display`
    pub fn chapter(&self, display: u32) -> std::result::Result<&Chapter, NumberingError> {
        let real = self.map.display_to_real(display)?;
        self.book
            .chapter(real)
            .ok_or(NumberingError::InvalidDisplayNumber {
                requested: display,
                max: self.map.len(),
            })
    }

    /// Display number after `display`, `None` at the end
    pub fn next_display(&self, display: u32) -> Option<u32> {
        (display >= 1 && display < self.map.len()).then(|| display + 1)
    }

    /// Display number before `display`, `None` at the start
    pub fn previous_display(&self, display: u32) -> Option<u32> {
        (display > 1 && display <= self.map.len()).then(|| display - 1)
    }

    /// Join per-chapter outputs (keyed by real number) in display order under the book title
    pub fn combine_outputs(&self, outputs: &HashMap<u32, String>) -> String {
        let mut parts = vec![format!("# {}", self.book.display_title())];
        parts.extend(
            self.map
                .iter()
                .filter_map(|(_, real)| outputs.get(&real))
                .map(|output| output.trim().to_string())
                .filter(|output| !output.is_empty()),
        );
        parts.join("\n\n")
    }

    /// Render the chapter shown as `display`, annotated when a document is given
    pub fn open_chapter(
        &self,
        display: u32,
        annotations: Option<&AnnotationDocument>,
    ) -> Result<ChapterView> {
        let chapter = self.chapter(display)?;
        let html = self.renderer.render(&chapter.content, &self.book_name);

        let ranges = match annotations {
            Some(document) => AnnotationRangeResolver::new()
                .resolve(&chapter.content, document)
                .ranges,
            None => ResolvedRangeSet::default(),
        };
        let annotated = HtmlOverlayRenderer::new().render(&html, &chapter.content, &ranges);
        let cards = build_cards(&ranges, &annotated.anchors);

        Ok(ChapterView {
            display_number: display,
            real_number: chapter.real_number,
            name: chapter.name.clone(),
            html: annotated.html,
            anchors: annotated.anchors,
            cards,
            stats: ChapterStats::new(&chapter.content, &ranges),
        })
    }

    /// Open a chapter for the navigation `ticket` was issued to
    ///
    /// Returns `Ok(None)` when a later navigation has started meanwhile, so a
    /// slow chapter never replaces the one the reader moved on to.
    pub fn navigate(
        &self,
        ticket: NavigationTicket,
        display: u32,
        annotations: Option<&AnnotationDocument>,
    ) -> Result<Option<ChapterView>> {
        if !self.navigation.is_current(ticket) {
            return Ok(None);
        }
        let view = self.open_chapter(display, annotations)?;
        Ok(self.navigation.complete(ticket, view))
    }
}
