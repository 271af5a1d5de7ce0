//! Error types for Folio Core

use thiserror::Error;

/// Result type alias using FolioError
pub type Result<T> = std::result::Result<T, FolioError>;

/// Top-level error type for all Folio operations
#[derive(Debug, Error)]
pub enum FolioError {
    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Numbering error: {0}")]
    Numbering(#[from] NumberingError),

    #[error("Annotation error: {0}")]
    Annotation(#[from] AnnotationError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that occur while decomposing an EPUB into chapters
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// A single content fragment could not be read; the fragment is skipped
    #[error("Fragment '{id}' unreadable: {reason}")]
    FragmentUnreadable { id: String, reason: String },

    /// No chapter survived filtering
    #[error("No usable chapters in '{title}'")]
    BookEmpty { title: String },

    #[error("Invalid EPUB: {0}")]
    InvalidEpub(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by the display numbering
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NumberingError {
    #[error("{}", invalid_display_message(.requested, .max))]
    InvalidDisplayNumber { requested: u32, max: u32 },
}

fn invalid_display_message(requested: &u32, max: &u32) -> String {
    if *max == 0 {
        format!("Display number {} is invalid: no chapter is visible", requested)
    } else {
        format!(
            "Display number {} is out of range, valid range is 1..={}",
            requested, max
        )
    }
}

/// Which part of an annotation failed to resolve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnippetRole {
    Start,
    End,
    Anchor,
}

impl std::fmt::Display for SnippetRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SnippetRole::Start => "start",
            SnippetRole::End => "end",
            SnippetRole::Anchor => "anchor",
        };
        f.write_str(name)
    }
}

/// Errors that occur while resolving or rendering annotations
#[derive(Debug, Clone, Error)]
pub enum AnnotationError {
    /// The snippet text is absent; the annotation is dropped
    #[error("{role} snippet not found: {snippet:?}")]
    SnippetNotFound { role: SnippetRole, snippet: String },

    /// Two ranges overlap; the later-processed one is not rendered
    #[error("Annotation '{id}' overlaps already rendered '{other}'")]
    Overlapping { id: String, other: String },

    #[error("Invalid annotation document: {0}")]
    InvalidDocument(String),
}
