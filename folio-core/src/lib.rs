//! Folio Core Library
//!
//! This crate turns an EPUB into a numbered sequence of readable chapters and
//! overlays model-produced annotations onto a chapter's rendered HTML.
//! Extraction stitches each table of contents entry from its content fragments;
//! the reading side maps dense display numbers onto the chapters long enough
//! to show, resolves annotation snippets against the raw chapter text and lays
//! out the sidebar cards that explain them.

pub mod annotate;
pub mod config;
pub mod decoder;
pub mod error;
pub mod grouping;
pub mod numbering;
pub mod session;
pub mod sidebar;
pub mod types;

pub use annotate::{
    AnnotatedHtml, AnnotationDocument, AnnotationRangeResolver, ChapterRenderer, ChapterStats,
    HtmlOverlayRenderer,
};
pub use config::{DecomposerConfig, FolioConfig, ReaderConfig};
pub use decoder::{Container, EpubContainer, EpubDecomposer, MemoryContainer};
pub use error::{AnnotationError, ExtractionError, FolioError, NumberingError, Result};
pub use grouping::{group_chapters, ChapterGrouping, ChapterSection};
pub use numbering::{format_char_count, BookInfo, DisplayMap};
pub use session::{ChapterView, NavigationGuard, NavigationTicket, ReadingSession};
pub use sidebar::{build_cards, CardContent, PaneGeometry, SidebarCard, SidebarLayoutEngine};
pub use types::{AnnotationType, Book, Chapter, ResolvedRangeSet, TocEntry};
