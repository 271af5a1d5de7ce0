//! In-memory container for already loaded fragments

use super::Container;
use crate::error::ExtractionError;
use crate::types::{strip_fragment, TocEntry};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};

/// A manifest item held in memory
#[derive(Debug, Clone)]
struct Fragment {
    href: String,
    markup: String,
}

/// Container whose manifest, metadata and TOC are supplied directly
#[derive(Debug, Clone, Default)]
pub struct MemoryContainer {
    metadata: HashMap<String, String>,
    toc: Vec<TocEntry>,
    fragments: HashMap<String, Fragment>,
    unreadable: HashSet<String>,
}

impl MemoryContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a metadata value
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Add a manifest item
    pub fn with_fragment(
        mut self,
        id: impl Into<String>,
        href: impl Into<String>,
        markup: impl Into<String>,
    ) -> Self {
        self.fragments.insert(
            id.into(),
            Fragment {
                href: href.into(),
                markup: markup.into(),
            },
        );
        self
    }

    /// Append a TOC entry
    pub fn with_toc_entry(mut self, entry: TocEntry) -> Self {
        self.toc.push(entry);
        self
    }

    /// Make reads of a manifest item fail while keeping it listed
    pub fn with_unreadable(mut self, id: impl Into<String>) -> Self {
        self.unreadable.insert(id.into());
        self
    }
}

#[async_trait]
impl Container for MemoryContainer {
    fn metadata(&self, key: &str) -> Option<String> {
        self.metadata.get(key).cloned()
    }

    fn toc(&self) -> Vec<TocEntry> {
        self.toc.clone()
    }

    fn contains(&self, id: &str) -> bool {
        self.fragments.contains_key(id)
    }

    fn id_for_href(&self, href: &str) -> Option<String> {
        let path = strip_fragment(href);
        let mut ids: Vec<&String> = self
            .fragments
            .iter()
            .filter(|(_, fragment)| fragment.href == path)
            .map(|(id, _)| id)
            .collect();
        ids.sort();
        ids.first().map(|id| id.to_string())
    }

    async fn read_fragment(&mut self, id: &str) -> Result<String, ExtractionError> {
        if self.unreadable.contains(id) {
            return Err(ExtractionError::FragmentUnreadable {
                id: id.to_string(),
                reason: "read failed".to_string(),
            });
        }
        self.fragments
            .get(id)
            .map(|fragment| fragment.markup.clone())
            .ok_or_else(|| ExtractionError::FragmentUnreadable {
                id: id.to_string(),
                reason: "not in manifest".to_string(),
            })
    }
}
