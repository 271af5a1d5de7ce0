//! EPUB containers and their decomposition into chapters

mod decomposer;
mod epub;
mod markup;
mod memory;

pub use decomposer::EpubDecomposer;
pub use epub::EpubContainer;
pub use markup::{MarkdownConverter, MarkupConverter};
pub use memory::MemoryContainer;

use crate::error::ExtractionError;
use crate::types::TocEntry;
use async_trait::async_trait;

/// Read access to an e-book container's manifest, metadata and table of contents
///
/// Fragment reads are async and awaited one at a time by the decomposer.
#[async_trait]
pub trait Container: Send {
    /// Metadata value for a Dublin Core key ("title", "creator", "date", ...)
    fn metadata(&self, key: &str) -> Option<String>;

    /// Table of contents flattened in document order
    fn toc(&self) -> Vec<TocEntry>;

    /// Whether the manifest has an item with this identifier
    fn contains(&self, id: &str) -> bool;

    /// Manifest identifier of the item at `href`, ignoring any `#fragment`
    fn id_for_href(&self, href: &str) -> Option<String>;

    /// Read the markup of a manifest item
    async fn read_fragment(&mut self, id: &str) -> Result<String, ExtractionError>;
}
