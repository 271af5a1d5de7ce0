//! The Book type - an immutable, extracted sequence of chapters

use super::Chapter;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A book decomposed into stitched, grouped chapters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Book {
    /// Unique identifier for this extraction
    pub id: Uuid,

    /// Book title
    pub title: String,

    /// Primary author
    pub author: String,

    /// Publication year, when the container records a date
    pub year: Option<String>,

    /// Chapters in extraction order; `chapters[i].real_number == i + 1`
    pub chapters: Vec<Chapter>,
}

impl Book {
    /// Create a new book with no chapters
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            author: author.into(),
            year: None,
            chapters: Vec::new(),
        }
    }

    /// Set the publication year
    pub fn with_year(mut self, year: Option<String>) -> Self {
        self.year = year;
        self
    }

    /// Title line used for headings: "Title — Author (Year)"
    pub fn display_title(&self) -> String {
        format!(
            "{} — {} ({})",
            self.title,
            self.author,
            self.year.as_deref().unwrap_or("n/a")
        )
    }

    /// Look up a chapter by its real number
    pub fn chapter(&self, real_number: u32) -> Option<&Chapter> {
        let index = usize::try_from(real_number).ok()?.checked_sub(1)?;
        self.chapters.get(index)
    }
}
