//! Splicing resolved ranges into rendered chapter HTML

use super::resolver::find_from;
use crate::error::{AnnotationError, SnippetRole};
use crate::types::{AnnotationSpan, ResolvedRangeSet};
use serde::Serialize;

/// Chapter HTML with annotation markers inserted
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnnotatedHtml {
    pub html: String,
    /// Ids of the rendered markers, ordered by raw start offset, comments first on ties
    pub anchors: Vec<String>,
    /// Ranges that could not be rendered
    #[serde(skip)]
    pub skipped: Vec<AnnotationError>,
}

/// Inserts underline spans and comment markers into HTML
///
/// Ranges are located again in the HTML by their literal snippets and spliced
/// in descending raw start order, so every splice happens to the right of
/// the ranges still waiting to be processed. A snippet's occurrence rank is
/// counted over the Markdown prose only, ignoring link targets and inline tags.
#[derive(Debug, Clone)]
pub struct HtmlOverlayRenderer {
    comment_marker: String,
}

impl Default for HtmlOverlayRenderer {
    fn default() -> Self {
        Self {
            comment_marker: "💬".to_string(),
        }
    }
}

impl HtmlOverlayRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the glyph shown at comment anchors
    pub fn with_comment_marker(mut self, marker: impl Into<String>) -> Self {
        self.comment_marker = marker.into();
        self
    }

    /// Render `ranges`, resolved against `raw`, into `html`
    ///
    /// The output does not depend on the order of `ranges`.
    pub fn render(&self, html: &str, raw: &str, ranges: &ResolvedRangeSet) -> AnnotatedHtml {
        let mut order: Vec<&AnnotationSpan> = ranges.iter().collect();
        order.sort_by(|a, b| {
            b.start
                .cmp(&a.start)
                .then(a.is_anchor_only().cmp(&b.is_anchor_only()))
                .then(b.end.cmp(&a.end))
                .then(a.id.cmp(&b.id))
        });

        let mut output = html.to_string();
        let mut bounds = Bounds::new(output.len());
        let mut rendered: Vec<&AnnotationSpan> = Vec::new();
        let mut skipped = Vec::new();

        for span in order {
            if let Some(other) = rendered.iter().find(|other| other.overlaps(span)) {
                let err = AnnotationError::Overlapping {
                    id: span.id.clone(),
                    other: other.id.clone(),
                };
                tracing::warn!("Not rendering annotation: {}", err);
                skipped.push(err);
                continue;
            }

            match self.splice(&mut output, raw, span, &mut bounds) {
                Ok(()) => rendered.push(span),
                Err(err) => {
                    tracing::warn!("Not rendering annotation '{}': {}", span.id, err);
                    skipped.push(err);
                }
            }
        }

        rendered.reverse();
        AnnotatedHtml {
            html: output,
            anchors: rendered.into_iter().map(|span| span.id.clone()).collect(),
            skipped,
        }
    }

    fn splice(
        &self,
        html: &mut String,
        raw: &str,
        span: &AnnotationSpan,
        bounds: &mut Bounds,
    ) -> Result<(), AnnotationError> {
        let rank = prose_occurrences(raw, &span.start_snippet)
            .take_while(|at| *at < span.start)
            .count();
        let start_limit = bounds.start;
        let (start, start_len) = locate(html, &span.start_snippet, rank, 0, |at, _| at <= start_limit)
            .ok_or_else(|| AnnotationError::SnippetNotFound {
                role: if span.is_anchor_only() {
                    SnippetRole::Anchor
                } else {
                    SnippetRole::Start
                },
                snippet: span.start_snippet.clone(),
            })?;

        if span.is_anchor_only() {
            let marker = format!(
                r#"<span id="{}" class="tag-comment-emoji">{}</span>"#,
                span.id, self.comment_marker
            );
            html.insert_str(start, &marker);
            bounds.inserted(start, marker.len());
            return Ok(());
        }

        let after = start + start_len;
        let end_limit = bounds.end;
        let (end_at, end_len) = if span.end_snippet.is_empty() {
            (after, 0)
        } else {
            locate(html, &span.end_snippet, 0, after, |at, len| at + len <= end_limit).ok_or_else(|| {
                AnnotationError::SnippetNotFound {
                    role: SnippetRole::End,
                    snippet: span.end_snippet.clone(),
                }
            })?
        };
        let end = end_at + end_len;

        let class = span
            .annotation_type()
            .map(|kind| kind.css_class())
            .filter(|class| !class.is_empty())
            .map(|class| format!("tag-underline type-{}", class))
            .unwrap_or_else(|| "tag-underline".to_string());
        let opening = format!(r#"<span id="{}" class="{}">"#, span.id, class);

        html.insert_str(end, "</span>");
        html.insert_str(start, &opening);
        bounds.wrapped(start, opening.len());
        Ok(())
    }
}

/// Where the next splice may land in the HTML
///
/// Splices run right to left: a start snippet must begin at or before the
/// end of the previous opening markup, and an end snippet must finish before
/// the opening tag of the previous underline.
#[derive(Debug, Clone, Copy)]
struct Bounds {
    start: usize,
    end: usize,
}

impl Bounds {
    fn new(len: usize) -> Self {
        Self { start: len, end: len }
    }

    /// A comment marker of `len` bytes was inserted at `at`
    fn inserted(&mut self, at: usize, len: usize) {
        self.start = at + len;
        if self.end >= at {
            self.end += len;
        }
    }

    /// An underline whose opening tag of `len` bytes begins at `at` was spliced
    fn wrapped(&mut self, at: usize, len: usize) {
        self.start = at + len;
        self.end = at;
    }
}

/// Offset and matched length of the `rank`-th text occurrence of `snippet`
/// accepted by `fits`, or of the last accepted one when there are fewer; the
/// HTML-escaped form is tried when the literal is absent
fn locate(
    html: &str,
    snippet: &str,
    rank: usize,
    from: usize,
    fits: impl Fn(usize, usize) -> bool,
) -> Option<(usize, usize)> {
    for candidate in escaped_forms(snippet) {
        let len = candidate.len();
        let matches: Vec<usize> = text_occurrences(html, &candidate, from)
            .take_while(|at| fits(*at, len))
            .collect();
        if let Some(last) = matches.last() {
            let at = matches.get(rank).unwrap_or(last);
            return Some((*at, len));
        }
    }
    None
}

fn escaped_forms(snippet: &str) -> Vec<String> {
    let body = snippet
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;");
    let attribute = body.replace('"', "&quot;");

    let mut forms = vec![snippet.to_string()];
    for form in [body, attribute] {
        if !forms.contains(&form) {
            forms.push(form);
        }
    }
    forms
}

/// Every occurrence of `needle` at or after `from`, overlapping ones included
fn occurrences<'a>(haystack: &'a str, needle: &'a str, from: usize) -> impl Iterator<Item = usize> + 'a {
    let mut cursor = from;
    std::iter::from_fn(move || {
        let at = find_from(haystack, needle, cursor)?;
        cursor = at + haystack[at..].chars().next().map_or(1, char::len_utf8);
        Some(at)
    })
}

/// Occurrences that do not begin inside a markup tag
fn text_occurrences<'a>(html: &'a str, needle: &'a str, from: usize) -> impl Iterator<Item = usize> + 'a {
    let bytes = html.as_bytes();
    let mut scanned = 0;
    let mut in_tag = false;
    occurrences(html, needle, from).filter(move |at| {
        for byte in &bytes[scanned..*at] {
            match byte {
                b'<' => in_tag = true,
                b'>' => in_tag = false,
                _ => {}
            }
        }
        scanned = *at;
        !in_tag
    })
}

/// Occurrences in Markdown text that are not part of inline HTML or a link destination
fn prose_occurrences<'a>(raw: &'a str, needle: &'a str) -> impl Iterator<Item = usize> + 'a {
    let bytes = raw.as_bytes();
    let mut scanned = 0;
    let mut previous = 0u8;
    let mut in_tag = false;
    let mut in_destination = false;
    occurrences(raw, needle, 0).filter(move |at| {
        for &byte in &bytes[scanned..*at] {
            match byte {
                b'<' if previous != b'\\' && !in_destination => in_tag = true,
                b'>' if in_tag => in_tag = false,
                b'(' if previous == b']' && !in_tag => in_destination = true,
                b')' if in_destination => in_destination = false,
                _ => {}
            }
            previous = byte;
        }
        scanned = *at;
        !in_tag && !in_destination
    })
}
