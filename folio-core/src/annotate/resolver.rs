//! Snippet search against raw chapter text

use super::AnnotationDocument;
use crate::error::{AnnotationError, SnippetRole};
use crate::types::{AnnotationSpan, ResolvedRangeSet, SpanKind};

/// Outcome of resolving one document against one chapter text
#[derive(Debug, Default)]
pub struct Resolution {
    pub ranges: ResolvedRangeSet,
    /// Entries whose snippets were not found
    pub dropped: Vec<AnnotationError>,
}

/// Resolves annotation entries to byte offsets of a raw text
///
/// Terms are searched monotonically: each start snippet is looked up from the
/// end of the previous resolved range, falling back to the beginning of the
/// text, and its end snippet after the start match. Comment anchors are found
/// by first occurrence.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnnotationRangeResolver;

impl AnnotationRangeResolver {
    pub fn new() -> Self {
        Self
    }

    pub fn resolve(&self, raw: &str, document: &AnnotationDocument) -> Resolution {
        let mut resolution = Resolution::default();
        self.resolve_terms(raw, document, &mut resolution);
        self.resolve_comments(raw, document, &mut resolution);

        tracing::debug!(
            "Resolved {} annotation(s), dropped {}",
            resolution.ranges.len(),
            resolution.dropped.len()
        );
        resolution
    }

    fn resolve_terms(&self, raw: &str, document: &AnnotationDocument, out: &mut Resolution) {
        let mut cursor = 0;
        let mut next_id = 0;

        for term in document.terms() {
            let start_snippet = term.start_snippet.as_str();
            let found = (!start_snippet.is_empty())
                .then(|| find_from(raw, start_snippet, cursor).or_else(|| raw.find(start_snippet)))
                .flatten();
            let Some(start) = found else {
                drop_entry(out, SnippetRole::Start, start_snippet);
                continue;
            };

            let Some(end_at) = find_from(raw, &term.end_snippet, start + start_snippet.len()) else {
                drop_entry(out, SnippetRole::End, &term.end_snippet);
                continue;
            };
            let end = end_at + term.end_snippet.len();

            out.ranges.push(AnnotationSpan {
                id: format!("tag_{}", next_id),
                kind: SpanKind::Term(term.kind.clone()),
                start,
                end,
                start_snippet: term.start_snippet.clone(),
                end_snippet: term.end_snippet.clone(),
                text: term.text.clone(),
            });
            next_id += 1;
            cursor = end;
        }
    }

    fn resolve_comments(&self, raw: &str, document: &AnnotationDocument, out: &mut Resolution) {
        let mut next_id = 0;

        for comment in document.comments() {
            let anchor = comment.anchor_snippet.trim();
            let Some(position) = (!anchor.is_empty()).then(|| raw.find(anchor)).flatten() else {
                drop_entry(out, SnippetRole::Anchor, anchor);
                continue;
            };

            out.ranges.push(AnnotationSpan {
                id: format!("tag_c_{}", next_id),
                kind: SpanKind::Comment,
                start: position,
                end: position,
                start_snippet: anchor.to_string(),
                end_snippet: String::new(),
                text: comment.text.clone(),
            });
            next_id += 1;
        }
    }
}

fn drop_entry(out: &mut Resolution, role: SnippetRole, snippet: &str) {
    let err = AnnotationError::SnippetNotFound {
        role,
        snippet: snippet.to_string(),
    };
    tracing::warn!("Dropping annotation: {}", err);
    out.dropped.push(err);
}

/// First occurrence of `needle` at or after byte offset `from`
pub(super) fn find_from(haystack: &str, needle: &str, from: usize) -> Option<usize> {
    haystack.get(from..)?.find(needle).map(|i| i + from)
}
