//! Annotation entries and the ranges they resolve to

use serde::{Deserialize, Serialize};

/// Opaque annotation category, taken from the key an entry was nested under
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct AnnotationType(String);

impl AnnotationType {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Human-readable label for well-known categories, the raw name otherwise
    pub fn label(&self) -> &str {
        match self.0.to_lowercase().as_str() {
            "def" | "definition" | "definitions" => "Definition",
            "ex" | "example" | "examples" => "Example",
            "tip" | "tips" => "Tip",
            "q" | "doubtful" => "Doubtful",
            _ if self.0.is_empty() => "Tag",
            _ => &self.0,
        }
    }

    /// CSS class fragment, restricted to `[A-Za-z0-9_-]`
    pub fn css_class(&self) -> String {
        self.0
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
            .collect()
    }
}

impl std::fmt::Display for AnnotationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A model-identified substring of interest, delimited by literal snippets
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TermEntry {
    /// Containing key in the source document (e.g. "definitions")
    pub kind: Option<AnnotationType>,
    pub start_snippet: String,
    pub end_snippet: String,
    /// Explanation shown in the sidebar
    pub text: String,
}

/// Free-text commentary anchored to a point in the text
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CommentEntry {
    pub anchor_snippet: String,
    pub text: String,
}

/// One classified object of an annotation document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "entry", rename_all = "snake_case")]
pub enum AnnotationEntry {
    Term(TermEntry),
    Comment(CommentEntry),
}

/// What a resolved span marks
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", content = "type", rename_all = "snake_case")]
pub enum SpanKind {
    /// A wrapped term range
    Term(Option<AnnotationType>),
    /// A zero-length comment anchor
    Comment,
}

/// An annotation resolved to byte offsets of the raw chapter text
///
/// The literal snippets travel with the span so that it can be located again
/// in a different string (the rendered HTML).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationSpan {
    /// Stable anchor id (`tag_N` for terms, `tag_c_N` for comments)
    pub id: String,
    pub kind: SpanKind,
    /// Inclusive start offset into the raw text
    pub start: usize,
    /// Exclusive end offset; equals `start` for anchor-only spans
    pub end: usize,
    pub start_snippet: String,
    /// Empty for anchor-only spans
    pub end_snippet: String,
    /// Sidebar text of the term or comment
    pub text: String,
}

impl AnnotationSpan {
    pub fn is_anchor_only(&self) -> bool {
        matches!(self.kind, SpanKind::Comment)
    }

    /// Annotation type of a term span
    pub fn annotation_type(&self) -> Option<&AnnotationType> {
        match &self.kind {
            SpanKind::Term(kind) => kind.as_ref(),
            SpanKind::Comment => None,
        }
    }

    /// Whether two spans share at least one byte of raw text
    pub fn overlaps(&self, other: &AnnotationSpan) -> bool {
        if self.is_anchor_only() || other.is_anchor_only() {
            return false;
        }
        self.start < other.end && other.start < self.end
    }
}

/// Resolved spans in order of resolution (terms first, then comments)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct ResolvedRangeSet {
    spans: Vec<AnnotationSpan>,
}

impl ResolvedRangeSet {
    pub fn new(spans: Vec<AnnotationSpan>) -> Self {
        Self { spans }
    }

    pub fn push(&mut self, span: AnnotationSpan) {
        self.spans.push(span);
    }

    pub fn iter(&self) -> impl Iterator<Item = &AnnotationSpan> {
        self.spans.iter()
    }

    pub fn terms(&self) -> impl Iterator<Item = &AnnotationSpan> {
        self.spans.iter().filter(|s| !s.is_anchor_only())
    }

    pub fn comments(&self) -> impl Iterator<Item = &AnnotationSpan> {
        self.spans.iter().filter(|s| s.is_anchor_only())
    }

    pub fn get(&self, id: &str) -> Option<&AnnotationSpan> {
        self.spans.iter().find(|s| s.id == id)
    }

    pub fn as_slice(&self) -> &[AnnotationSpan] {
        &self.spans
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}
