//! Table of contents → stitched, grouped chapters

use super::{Container, MarkdownConverter, MarkupConverter};
use crate::config::DecomposerConfig;
use crate::error::ExtractionError;
use crate::types::{strip_fragment, Book, Chapter};
use chrono::{DateTime, Datelike, NaiveDate};
use std::collections::HashMap;

/// Turns a container's table of contents into an ordered chapter sequence
pub struct EpubDecomposer {
    config: DecomposerConfig,
    converter: Box<dyn MarkupConverter>,
}

impl EpubDecomposer {
    pub fn new(config: DecomposerConfig) -> Self {
        Self {
            config,
            converter: Box::new(MarkdownConverter::new()),
        }
    }

    /// Use a different markup converter
    pub fn with_converter(mut self, converter: impl MarkupConverter + 'static) -> Self {
        self.converter = Box::new(converter);
        self
    }

    pub fn config(&self) -> &DecomposerConfig {
        &self.config
    }

    /// Extract the book
    ///
    /// Unreadable fragments are skipped, chapters without readable content or
    /// below the length threshold are dropped. Fails only when no chapter is left.
    pub async fn decompose(&self, container: &mut dyn Container) -> Result<Book, ExtractionError> {
        let title = container
            .metadata("title")
            .unwrap_or_else(|| "Untitled".to_string());
        let author = container
            .metadata("creator")
            .unwrap_or_else(|| "Unknown author".to_string());
        let year = container.metadata("date").as_deref().and_then(parse_year);

        let toc = container.toc();
        let toc_hrefs: HashMap<String, String> = toc
            .iter()
            .filter_map(|entry| entry.id.clone().map(|id| (id, entry.href.clone())))
            .collect();

        let mut book = Book::new(title, author).with_year(year);
        let mut group: Option<String> = None;

        for entry in toc.iter().filter(|e| !self.config.is_excluded(&e.title)) {
            if entry.level == 0 {
                if self.config.is_section_header(&entry.title) {
                    group = Some(entry.title.clone());
                    continue;
                }
                group = None;
            }

            let Some(base_id) = entry.id.clone().or_else(|| container.id_for_href(&entry.href))
            else {
                tracing::warn!("No manifest item for TOC entry '{}' ({})", entry.title, entry.href);
                continue;
            };

            let mut fragments = Vec::new();
            for part in self.continuation_parts(&*container, &base_id) {
                match self.read_part(container, &part, &toc_hrefs).await {
                    Ok(text) if text.is_empty() => {}
                    Ok(text) => fragments.push(text),
                    Err(e) => tracing::warn!("Skipping fragment of '{}': {}", entry.title, e),
                }
            }

            if fragments.is_empty() {
                tracing::debug!("Dropping '{}': no readable fragments", entry.title);
                continue;
            }

            let content = fragments.join("\n\n");
            let length = content.chars().count();
            if length < self.config.min_content_length {
                tracing::debug!(
                    "Dropping '{}': {} characters is below {}",
                    entry.title,
                    length,
                    self.config.min_content_length
                );
                continue;
            }

            tracing::debug!(
                "Stitched '{}' from {} fragment(s), {} characters",
                entry.title,
                fragments.len(),
                length
            );

            let real_number = book.chapters.len() as u32 + 1;
            let chapter = Chapter::new(entry.title.clone(), base_id, content, real_number)
                .with_group(group.clone());
            book.chapters.push(chapter);
        }

        if book.chapters.is_empty() {
            return Err(ExtractionError::BookEmpty { title: book.title });
        }

        tracing::info!(
            "Extracted '{}' with {} chapters",
            book.title,
            book.chapters.len()
        );

        Ok(book)
    }

    /// The chapter's own id followed by `id + "a"`, `id + "b"`, ... up to the first missing suffix
    fn continuation_parts(&self, container: &dyn Container, base_id: &str) -> Vec<String> {
        let mut parts = vec![base_id.to_string()];
        for suffix in ('a'..='z').take(self.config.max_continuation_parts) {
            let part_id = format!("{}{}", base_id, suffix);
            if !container.contains(&part_id) {
                break;
            }
            parts.push(part_id);
        }
        parts
    }

    /// Read and convert one fragment, retrying through the manifest by URL
    async fn read_part(
        &self,
        container: &mut dyn Container,
        id: &str,
        toc_hrefs: &HashMap<String, String>,
    ) -> Result<String, ExtractionError> {
        let markup = match container.read_fragment(id).await {
            Ok(markup) => markup,
            Err(first) => {
                let fallback = toc_hrefs
                    .get(id)
                    .and_then(|href| container.id_for_href(strip_fragment(href)))
                    .filter(|alt| alt != id);
                match fallback {
                    Some(alt) => {
                        tracing::debug!("Retrying fragment '{}' as '{}'", id, alt);
                        container.read_fragment(&alt).await?
                    }
                    None => return Err(first),
                }
            }
        };

        Ok(self.converter.convert(&markup).trim().to_string())
    }
}

impl Default for EpubDecomposer {
    fn default() -> Self {
        Self::new(DecomposerConfig::default())
    }
}

/// Publication year from a metadata date ("2011", "2011-09-01", RFC 3339, ...)
fn parse_year(date: &str) -> Option<String> {
    let date = date.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(date) {
        return Some(parsed.year().to_string());
    }
    if let Ok(parsed) = NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        return Some(parsed.year().to_string());
    }
    let prefix: String = date.chars().take(4).collect();
    (prefix.len() == 4 && prefix.chars().all(|c| c.is_ascii_digit())).then_some(prefix)
}
