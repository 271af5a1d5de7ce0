//! Dense display numbering over the chapters that meet a visibility threshold

use crate::error::NumberingError;
use crate::types::{Book, Chapter};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Bijection between display numbers `1..=N` and the real numbers of visible chapters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayMap {
    threshold: usize,
    /// `display_to_real[d - 1]` is the real number shown as `d`
    display_to_real: Vec<u32>,
    real_to_display: HashMap<u32, u32>,
}

impl DisplayMap {
    /// Number the chapters with `content_length >= threshold`, in ascending real order
    pub fn build(chapters: &[Chapter], threshold: usize) -> Self {
        let mut visible: Vec<&Chapter> = chapters.iter().filter(|c| c.is_visible(threshold)).collect();
        visible.sort_by_key(|c| c.real_number);

        let display_to_real: Vec<u32> = visible.iter().map(|c| c.real_number).collect();
        let real_to_display = display_to_real
            .iter()
            .enumerate()
            .map(|(i, real)| (*real, i as u32 + 1))
            .collect();

        Self {
            threshold,
            display_to_real,
            real_to_display,
        }
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Number of visible chapters (N)
    pub fn len(&self) -> u32 {
        self.display_to_real.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.display_to_real.is_empty()
    }

    /// Real number for a display number; numbers outside `1..=N` are rejected
    pub fn display_to_real(&self, display: u32) -> Result<u32, NumberingError> {
        display
            .checked_sub(1)
            .and_then(|i| self.display_to_real.get(i as usize))
            .copied()
            .ok_or(NumberingError::InvalidDisplayNumber {
                requested: display,
                max: self.len(),
            })
    }

    /// Display number of a real number, `None` when that chapter is hidden
    pub fn real_to_display(&self, real: u32) -> Option<u32> {
        self.real_to_display.get(&real).copied()
    }

    /// `(display, real)` pairs in display order
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.display_to_real
            .iter()
            .enumerate()
            .map(|(i, real)| (i as u32 + 1, *real))
    }

    /// Display → real as an ordered map (serializes as a JSON object)
    pub fn to_display_map(&self) -> BTreeMap<u32, u32> {
        self.iter().collect()
    }

    /// Real → display as an ordered map
    pub fn to_real_map(&self) -> BTreeMap<u32, u32> {
        self.iter().map(|(display, real)| (real, display)).collect()
    }
}

/// JSON payload describing a book and its visible chapters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BookInfo {
    pub book: BookSummary,
    pub chapters: Vec<ChapterInfo>,
    pub display_to_real_map: BTreeMap<u32, u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BookSummary {
    pub title: String,
    pub chapters_count: usize,
}

/// A visible chapter with its numbering and existence metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChapterInfo {
    pub real_number: u32,
    pub display_number: u32,
    pub name: String,
    pub content_length: usize,
    /// Whether processed output already exists for this chapter
    pub exists: bool,
    pub group: Option<String>,
}

impl BookInfo {
    /// Describe `book` under `map`; `processed` decides existence by normalized chapter name
    pub fn new(book: &Book, map: &DisplayMap, processed: impl Fn(&str) -> bool) -> Self {
        let chapters = map
            .iter()
            .filter_map(|(display, real)| {
                let chapter = book.chapter(real)?;
                Some(ChapterInfo {
                    real_number: real,
                    display_number: display,
                    name: chapter.name.clone(),
                    content_length: chapter.content_length,
                    exists: processed(&normalize_name(&chapter.name)),
                    group: chapter.group.clone(),
                })
            })
            .collect();

        Self {
            book: BookSummary {
                title: book.display_title(),
                chapters_count: book.chapters.len(),
            },
            chapters,
            display_to_real_map: map.to_display_map(),
        }
    }
}

/// Chapter name with every whitespace run replaced by `_`
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join("_")
}

/// Compact size label: "12.3k" from 1000 characters up
pub fn format_char_count(count: usize) -> String {
    if count >= 1000 {
        format!("{:.1}k", count as f64 / 1000.0)
    } else {
        count.to_string()
    }
}
