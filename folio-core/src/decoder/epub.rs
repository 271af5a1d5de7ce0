//! EPUB 2/3 container backed by the `epub` crate

use super::Container;
use crate::error::ExtractionError;
use crate::types::{strip_fragment, TocEntry};
use async_trait::async_trait;
use epub::doc::{EpubDoc, NavPoint};
use std::io::{Cursor, Read, Seek};
use std::path::Path;

/// An opened EPUB file
pub struct EpubContainer<R: Read + Seek> {
    doc: EpubDoc<R>,
}

impl EpubContainer<Cursor<Vec<u8>>> {
    /// Parse an EPUB held in memory
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, ExtractionError> {
        let doc = EpubDoc::from_reader(Cursor::new(data))
            .map_err(|e| ExtractionError::InvalidEpub(e.to_string()))?;
        Ok(Self { doc })
    }

    /// Read and parse an EPUB file
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, ExtractionError> {
        let data = tokio::fs::read(path.as_ref()).await?;
        Self::from_bytes(data)
    }
}

impl<R: Read + Seek> EpubContainer<R> {
    /// Wrap an already parsed document
    pub fn new(doc: EpubDoc<R>) -> Self {
        Self { doc }
    }

    fn flatten_toc(&self, nav: &NavPoint, level: u32, out: &mut Vec<TocEntry>) {
        let href = nav.content.to_string_lossy().to_string();
        let id = self.id_for_path(strip_fragment(&href));

        let is_text = id
            .as_deref()
            .and_then(|id| self.doc.resources.get(id))
            .map(|item| item.mime.contains("html") || item.mime.contains("text"))
            .unwrap_or(true);

        if is_text {
            let mut entry = TocEntry::new(nav.label.trim(), href).with_level(level);
            entry.id = id;
            out.push(entry);
        } else {
            tracing::debug!("Skipping non-text TOC entry '{}'", nav.label);
        }

        for child in &nav.children {
            self.flatten_toc(child, level + 1, out);
        }
    }

    fn id_for_path(&self, path: &str) -> Option<String> {
        if path.is_empty() {
            return None;
        }
        let target = Path::new(path);
        self.doc
            .resources
            .iter()
            .find(|(_, item)| item.path == target)
            .or_else(|| {
                // Some containers record TOC paths relative to the package root
                self.doc
                    .resources
                    .iter()
                    .find(|(_, item)| item.path.ends_with(target) || target.ends_with(&item.path))
            })
            .map(|(id, _)| id.clone())
    }
}

#[async_trait]
impl<R: Read + Seek + Send> Container for EpubContainer<R> {
    fn metadata(&self, key: &str) -> Option<String> {
        self.doc
            .mdata(key)
            .map(|item| item.value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    fn toc(&self) -> Vec<TocEntry> {
        let mut entries = Vec::new();
        for nav in &self.doc.toc {
            self.flatten_toc(nav, 0, &mut entries);
        }
        entries
    }

    fn contains(&self, id: &str) -> bool {
        self.doc.resources.contains_key(id)
    }

    fn id_for_href(&self, href: &str) -> Option<String> {
        self.id_for_path(strip_fragment(href))
    }

    async fn read_fragment(&mut self, id: &str) -> Result<String, ExtractionError> {
        if !self.doc.resources.contains_key(id) {
            return Err(ExtractionError::FragmentUnreadable {
                id: id.to_string(),
                reason: "not in manifest".to_string(),
            });
        }

        self.doc
            .get_resource_str(id)
            .map(|(content, _mime)| content)
            .ok_or_else(|| ExtractionError::FragmentUnreadable {
                id: id.to_string(),
                reason: "could not be read as text".to_string(),
            })
    }
}
