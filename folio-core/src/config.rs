//! Configuration for extraction and the reading view

use crate::error::{FolioError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable naming a JSON configuration file
pub const CONFIG_ENV_VAR: &str = "FOLIO_CONFIG";

const DEFAULT_EXCLUDED_TITLES: &[&str] = &[
    "Cover",
    "Title Page",
    "Copyright",
    "Epigraph",
    "Contents",
    "Acknowledgments",
    "Notes",
    "Appendix",
    "What Should You Read Next?",
    "Index",
    "About the Author",
];

const DEFAULT_SECTION_HEADERS: &[&str] = &[
    "Set the Stage",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
];

/// Settings for turning a table of contents into chapters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DecomposerConfig {
    /// Chapters shorter than this (in characters) are dropped
    pub min_content_length: usize,

    /// Structural titles that never become chapters
    pub excluded_titles: Vec<String>,

    /// Top-level titles that label the chapters below them
    pub section_headers: Vec<String>,

    /// How many continuation suffixes (`a`, `b`, ...) are tried, at most 26
    pub max_continuation_parts: usize,
}

impl Default for DecomposerConfig {
    fn default() -> Self {
        Self {
            min_content_length: 5000,
            excluded_titles: DEFAULT_EXCLUDED_TITLES.iter().map(|s| s.to_string()).collect(),
            section_headers: DEFAULT_SECTION_HEADERS.iter().map(|s| s.to_string()).collect(),
            max_continuation_parts: 26,
        }
    }
}

impl DecomposerConfig {
    /// Set the minimum chapter length
    pub fn with_min_content_length(mut self, min: usize) -> Self {
        self.min_content_length = min;
        self
    }

    /// Replace the excluded title list
    pub fn with_excluded_titles<I, S>(mut self, titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_titles = titles.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the section header list
    pub fn with_section_headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.section_headers = headers.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_excluded(&self, title: &str) -> bool {
        matches_any(&self.excluded_titles, title)
    }

    pub fn is_section_header(&self, title: &str) -> bool {
        matches_any(&self.section_headers, title)
    }
}

fn matches_any(list: &[String], title: &str) -> bool {
    let title = title.trim().to_lowercase();
    list.iter().any(|t| t.trim().to_lowercase() == title)
}

/// Settings for the chapter reading view
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReaderConfig {
    /// Chapters shorter than this are not numbered for display
    pub visibility_threshold: usize,

    /// Vertical gap between sidebar cards, in pixels
    pub min_card_gap: f64,

    /// Route that serves container resources to the reading view
    pub resource_route: String,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            visibility_threshold: 500,
            min_card_gap: 4.0,
            resource_route: "/api/epub-resource".to_string(),
        }
    }
}

/// Complete configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FolioConfig {
    pub decomposer: DecomposerConfig,
    pub reader: ReaderConfig,
}

impl FolioConfig {
    /// Load from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        serde_json::from_str(&data)
            .map_err(|e| FolioError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Load from an explicit path, else from `FOLIO_CONFIG`, else defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::from_file(path);
        }
        match std::env::var(CONFIG_ENV_VAR) {
            Ok(env_path) if !env_path.is_empty() => Self::from_file(Path::new(&env_path)),
            _ => Ok(Self::default()),
        }
    }
}
