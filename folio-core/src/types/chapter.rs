//! Chapter type representing a single stitched reading unit

use serde::{Deserialize, Serialize};

/// A single chapter of a book, possibly stitched from several fragments
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    /// Chapter title from the table of contents
    pub name: String,

    /// Manifest identifier of the chapter's first fragment
    pub source_id: String,

    /// Converted structural text of all fragments
    pub content: String,

    /// Section label shared by a contiguous run of chapters
    pub group: Option<String>,

    /// 1-based position in the full extracted sequence
    pub real_number: u32,

    /// Length of `content` in characters
    pub content_length: usize,
}

impl Chapter {
    /// Create a chapter; `content_length` is derived from the content
    pub fn new(
        name: impl Into<String>,
        source_id: impl Into<String>,
        content: impl Into<String>,
        real_number: u32,
    ) -> Self {
        let content = content.into();
        Self {
            name: name.into(),
            source_id: source_id.into(),
            content_length: content.chars().count(),
            content,
            group: None,
            real_number,
        }
    }

    /// Set the group label
    pub fn with_group(mut self, group: Option<String>) -> Self {
        self.group = group;
        self
    }

    /// Whether the chapter meets a visibility threshold
    pub fn is_visible(&self, threshold: usize) -> bool {
        self.content_length >= threshold
    }
}
