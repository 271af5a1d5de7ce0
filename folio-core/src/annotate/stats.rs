//! Reading statistics for a chapter view

use crate::types::ResolvedRangeSet;
use serde::Serialize;

/// Resolved annotations counted by category
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct TagCounts {
    pub definitions: usize,
    pub examples: usize,
    pub tips: usize,
    pub doubtful: usize,
    pub comments: usize,
    /// Terms of any other type
    pub other: usize,
}

impl TagCounts {
    pub fn from_ranges(ranges: &ResolvedRangeSet) -> Self {
        let mut counts = Self::default();
        for term in ranges.terms() {
            let label = term.annotation_type().map(|kind| kind.label()).unwrap_or("");
            match label {
                "Definition" => counts.definitions += 1,
                "Example" => counts.examples += 1,
                "Tip" => counts.tips += 1,
                "Doubtful" => counts.doubtful += 1,
                _ => counts.other += 1,
            }
        }
        counts.comments = ranges.comments().count();
        counts
    }

    pub fn total(&self) -> usize {
        self.definitions + self.examples + self.tips + self.doubtful + self.comments + self.other
    }
}

/// Length and annotation summary of one chapter
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChapterStats {
    pub chars: usize,
    /// Approximate token count in thousands, at least 1
    pub tokens_k: usize,
    pub tags: TagCounts,
}

impl ChapterStats {
    pub fn new(content: &str, ranges: &ResolvedRangeSet) -> Self {
        let chars = content.chars().count();
        let tokens = ((chars as f64 / 4.0).round() as usize).max(1);
        Self {
            chars,
            tokens_k: ((tokens as f64 / 1000.0).round() as usize).max(1),
            tags: TagCounts::from_ranges(ranges),
        }
    }

    /// One line summary, e.g. "Length: 12 345 characters, 3k tokens. Tags: 2 (definitions: 2)"
    pub fn summary(&self) -> String {
        let mut line = format!(
            "Length: {} characters, {}k tokens",
            group_digits(self.chars),
            self.tokens_k
        );

        let total = self.tags.total();
        if total > 0 {
            let parts: Vec<String> = [
                ("definitions", self.tags.definitions),
                ("examples", self.tags.examples),
                ("tips", self.tags.tips),
                ("doubtful", self.tags.doubtful),
                ("comments", self.tags.comments),
                ("other", self.tags.other),
            ]
            .iter()
            .filter(|(_, count)| *count > 0)
            .map(|(name, count)| format!("{}: {}", name, count))
            .collect();
            line.push_str(&format!(". Tags: {} ({})", total, parts.join(", ")));
        }
        line
    }
}

/// Thousands separated by spaces
fn group_digits(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(' ');
        }
        out.push(c);
    }
    out
}
