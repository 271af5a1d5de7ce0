//! Annotation pipeline: document parsing, range resolution, HTML overlay
//!
//! Raw chapter text and an annotation document go in; annotated HTML and an
//! ordered list of anchor ids come out:
//!
//! ```text
//! AnnotationDocument ──► AnnotationRangeResolver ──► ResolvedRangeSet
//!                                                        │
//! chapter markdown ──► ChapterRenderer ──► HTML ──► HtmlOverlayRenderer ──► AnnotatedHtml
//! ```

mod document;
mod overlay;
mod render;
mod resolver;
mod stats;

pub use document::AnnotationDocument;
pub use overlay::{AnnotatedHtml, HtmlOverlayRenderer};
pub use render::ChapterRenderer;
pub use resolver::{AnnotationRangeResolver, Resolution};
pub use stats::{ChapterStats, TagCounts};
