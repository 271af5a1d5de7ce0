//! Chapter text → display HTML

use crate::config::ReaderConfig;
use pulldown_cmark::{html, Options, Parser};
use regex::{Captures, Regex};
use std::sync::OnceLock;

fn hr_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"(?i)<hr\s*/?>").ok())
        .as_ref()
}

fn src_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r#"src="([^"]+)""#).ok())
        .as_ref()
}

/// Renders stitched chapter text into the HTML the reading view shows
#[derive(Debug, Clone)]
pub struct ChapterRenderer {
    resource_route: String,
    options: Options,
}

impl ChapterRenderer {
    /// Serve relative images through `resource_route`
    pub fn new(resource_route: impl Into<String>) -> Self {
        Self {
            resource_route: resource_route.into(),
            options: Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH,
        }
    }

    pub fn from_config(config: &ReaderConfig) -> Self {
        Self::new(config.resource_route.clone())
    }

    /// Markdown to HTML with the footer separated and resource URLs rewritten
    pub fn render(&self, markdown: &str, book_name: &str) -> String {
        let mut out = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut out, Parser::new_ext(markdown, self.options));

        let out = separate_footer(&out);
        self.rewrite_resource_urls(&out, book_name)
    }

    fn rewrite_resource_urls(&self, html: &str, book_name: &str) -> String {
        let Some(pattern) = src_pattern() else {
            return html.to_string();
        };
        pattern
            .replace_all(html, |caps: &Captures| {
                let url = &caps[1];
                if is_absolute(url) {
                    return caps[0].to_string();
                }
                format!(
                    r#"src="{}?book={}&amp;path={}""#,
                    self.resource_route,
                    urlencoding::encode(book_name),
                    urlencoding::encode(url)
                )
            })
            .into_owned()
    }
}

impl Default for ChapterRenderer {
    fn default() -> Self {
        Self::from_config(&ReaderConfig::default())
    }
}

fn is_absolute(url: &str) -> bool {
    ["http://", "https://", "/", "data:"]
        .iter()
        .any(|prefix| url.starts_with(prefix))
}

/// Everything after the first horizontal rule goes into a footer block
fn separate_footer(html: &str) -> String {
    let Some(rule) = hr_pattern().and_then(|p| p.find(html)) else {
        return html.to_string();
    };
    format!(
        r#"{}<hr><div class="chapter-footer">{}</div>"#,
        &html[..rule.start()],
        &html[rule.end()..]
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_footer_after_first_rule() {
        let html = ChapterRenderer::default().render("Body text\n\n* * *\n\nNotes\n\n* * *\n\nMore", "book");
        assert_eq!(
            html,
            "<p>Body text</p>\n<hr><div class=\"chapter-footer\">\n<p>Notes</p>\n<hr />\n<p>More</p>\n</div>"
        );
    }

    #[test]
    fn test_no_rule_no_footer() {
        let html = ChapterRenderer::default().render("# Title\n\nText", "book");
        assert_eq!(html, "<h1>Title</h1>\n<p>Text</p>\n");
    }

    #[test]
    fn test_relative_images_are_routed() {
        let renderer = ChapterRenderer::new("/api/epub-resource");
        let html = renderer.render("![logo](images/logo.png)", "My Book.epub");
        assert!(html.contains(
            r#"src="/api/epub-resource?book=My%20Book.epub&amp;path=images%2Flogo.png""#
        ));
    }

    #[test]
    fn test_absolute_urls_are_kept() {
        let renderer = ChapterRenderer::default();
        let html = renderer.rewrite_resource_urls(
            r#"<img src="https://example.com/a.png"><img src="/static/b.png">"#,
            "book",
        );
        assert_eq!(html, r#"<img src="https://example.com/a.png"><img src="/static/b.png">"#);
    }

    #[test]
    fn test_escaped_text_stays_text() {
        let markdown = "a \\<b onclick=\"x()\">bold\\</b> \\_id\\_\n\n1984\\. A year.";
        let html = ChapterRenderer::default().render(markdown, "book");
        assert!(html.contains("a &lt;b onclick="));
        assert!(!html.contains("<b onclick"));
        assert!(html.contains("_id_"));
        assert!(html.contains("<p>1984. A year.</p>"));
    }
}
