//! Table of contents types

use serde::{Deserialize, Serialize};

/// A single entry of the flattened table of contents, in document order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TocEntry {
    /// Display title
    pub title: String,

    /// Target path inside the container, possibly with a `#fragment`
    pub href: String,

    /// Nesting level (0 = top level)
    pub level: u32,

    /// Manifest identifier the href resolves to, when known
    pub id: Option<String>,
}

impl TocEntry {
    /// Create a new TOC entry
    pub fn new(title: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            href: href.into(),
            level: 0,
            id: None,
        }
    }

    /// Set the nesting level
    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }

    /// Set the manifest identifier
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// The href without any `#fragment` suffix
    pub fn path(&self) -> &str {
        strip_fragment(&self.href)
    }
}

/// Remove a `#fragment` suffix from a URL
pub(crate) fn strip_fragment(href: &str) -> &str {
    href.split_once('#').map(|(path, _)| path).unwrap_or(href)
}
