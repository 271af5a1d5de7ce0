//! Classification of a loosely structured annotation document

use crate::error::AnnotationError;
use crate::types::{AnnotationEntry, AnnotationType, CommentEntry, TermEntry};
use serde_json::{Map, Value};

/// Deeper subtrees are ignored
const MAX_DEPTH: usize = 32;

const START_KEYS: &[&str] = &["start", "s"];
const END_KEYS: &[&str] = &["end", "e"];
const ANCHOR_KEYS: &[&str] = &["anchor", "a"];
const TEXT_KEYS: &[&str] = &["text", "t"];

/// Term and comment entries found in an arbitrarily nested JSON document
///
/// Any object carrying a start and an end snippet is a term, typed by the
/// nearest enclosing object key. Any other object carrying an anchor and a
/// text is a comment. Entries keep document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnotationDocument {
    entries: Vec<AnnotationEntry>,
}

impl AnnotationDocument {
    /// Parse a JSON annotation document
    pub fn from_json(json: &str) -> Result<Self, AnnotationError> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| AnnotationError::InvalidDocument(e.to_string()))?;
        Ok(Self::from_value(&value))
    }

    /// Classify an already parsed document
    pub fn from_value(value: &Value) -> Self {
        let root = match value {
            Value::Object(map) => map.get("data").filter(|d| d.is_object() || d.is_array()),
            _ => None,
        }
        .unwrap_or(value);

        let mut entries = Vec::new();
        walk(root, None, 0, &mut entries);
        Self { entries }
    }

    pub fn from_entries(entries: Vec<AnnotationEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[AnnotationEntry] {
        &self.entries
    }

    pub fn terms(&self) -> impl Iterator<Item = &TermEntry> {
        self.entries.iter().filter_map(|entry| match entry {
            AnnotationEntry::Term(term) => Some(term),
            AnnotationEntry::Comment(_) => None,
        })
    }

    pub fn comments(&self) -> impl Iterator<Item = &CommentEntry> {
        self.entries.iter().filter_map(|entry| match entry {
            AnnotationEntry::Comment(comment) => Some(comment),
            AnnotationEntry::Term(_) => None,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn walk(value: &Value, parent_key: Option<&str>, depth: usize, out: &mut Vec<AnnotationEntry>) {
    if depth > MAX_DEPTH {
        tracing::warn!("Annotation document nested deeper than {}, subtree ignored", MAX_DEPTH);
        return;
    }

    match value {
        Value::Array(items) => {
            for item in items {
                walk(item, parent_key, depth + 1, out);
            }
        }
        Value::Object(map) => {
            if let Some(entry) = classify(map, parent_key) {
                out.push(entry);
            }
            for (key, child) in map {
                if child.is_object() || child.is_array() {
                    walk(child, Some(key), depth + 1, out);
                }
            }
        }
        _ => {}
    }
}

fn classify(map: &Map<String, Value>, parent_key: Option<&str>) -> Option<AnnotationEntry> {
    if let (Some(start), Some(end)) = (field(map, START_KEYS), field(map, END_KEYS)) {
        return Some(AnnotationEntry::Term(TermEntry {
            kind: parent_key.map(AnnotationType::new),
            start_snippet: start,
            end_snippet: end,
            text: field(map, TEXT_KEYS).unwrap_or_default(),
        }));
    }

    let (anchor, text) = (field(map, ANCHOR_KEYS)?, field(map, TEXT_KEYS)?);
    Some(AnnotationEntry::Comment(CommentEntry {
        anchor_snippet: anchor,
        text,
    }))
}

/// First present key among `keys`, scalars coerced to text
fn field(map: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match map.get(*key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some(String::new()),
        Value::Array(_) | Value::Object(_) => None,
    })
}
