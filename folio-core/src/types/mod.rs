//! Core types shared by extraction, numbering and annotation

mod annotation;
mod book;
mod chapter;
mod toc;

pub use annotation::{
    AnnotationEntry, AnnotationSpan, AnnotationType, CommentEntry, ResolvedRangeSet, SpanKind,
    TermEntry,
};
pub use book::Book;
pub use chapter::Chapter;
pub use toc::TocEntry;
pub(crate) use toc::strip_fragment;
