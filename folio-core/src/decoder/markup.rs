//! HTML to lightweight structural text (Markdown) conversion

use ego_tree::NodeRef;
use regex::Regex;
use scraper::{Html, Node};
use std::sync::OnceLock;

fn block_marker_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^(\s*)(-|\+ |=+|#{1,6} |~~~|>)").ok())
        .as_ref()
}

fn ordered_marker_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^(\s*)(\d+)\. ").ok())
        .as_ref()
}

/// Converts a fragment's markup into the text format chapters are stored in
pub trait MarkupConverter: Send + Sync {
    fn convert(&self, html: &str) -> String;
}

/// Converter producing CommonMark-compatible Markdown
#[derive(Debug, Clone)]
pub struct MarkdownConverter {
    /// Whether to keep image references
    keep_images: bool,
}

impl MarkdownConverter {
    pub fn new() -> Self {
        Self { keep_images: true }
    }

    /// Keep or drop `![alt](src)` image references
    pub fn with_images(mut self, keep: bool) -> Self {
        self.keep_images = keep;
        self
    }

    /// Convert the children of a node into Markdown blocks
    fn children_to_blocks(&self, node: NodeRef<Node>) -> Vec<String> {
        let mut blocks = Vec::new();
        let mut pending = String::new();

        for child in node.children() {
            match child.value() {
                Node::Text(text) => pending.push_str(&text_to_markdown(text)),
                Node::Element(el) if is_block(el.name()) => {
                    flush(&mut pending, &mut blocks);
                    if let Some(block) = self.element_to_block(el, child) {
                        blocks.push(block);
                    }
                }
                Node::Element(el) => pending.push_str(&self.element_to_inline(el, child)),
                _ => {}
            }
        }
        flush(&mut pending, &mut blocks);

        blocks
    }

    /// Convert a block-level element
    fn element_to_block(&self, element: &scraper::node::Element, node: NodeRef<Node>) -> Option<String> {
        let tag = element.name();

        let block = match tag {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let level = tag[1..].parse::<usize>().unwrap_or(1);
                let text = self.children_to_inline(node);
                if text.is_empty() {
                    return None;
                }
                format!("{} {}", "#".repeat(level), text)
            }
            "p" => self.children_to_inline(node),
            "ul" | "ol" => self.list_to_block(node, tag == "ol"),
            "blockquote" => {
                let inner = self.children_to_blocks(node).join("\n\n");
                inner
                    .lines()
                    .map(|line| if line.is_empty() { ">".to_string() } else { format!("> {}", line) })
                    .collect::<Vec<_>>()
                    .join("\n")
            }
            "pre" => {
                let code = text_content(node);
                format!("```\n{}\n```", code.trim_end_matches('\n'))
            }
            "hr" => "* * *".to_string(),
            "table" => self.table_to_block(node),
            "script" | "style" | "head" | "title" | "nav" => return None,
            _ => self.children_to_blocks(node).join("\n\n"),
        };

        let block = block.trim().to_string();
        (!block.is_empty()).then_some(block)
    }

    fn list_to_block(&self, node: NodeRef<Node>, ordered: bool) -> String {
        let mut lines = Vec::new();
        let mut index = 1;

        for child in node.children() {
            let Some(el) = child.value().as_element() else {
                continue;
            };
            if el.name() != "li" {
                continue;
            }

            let marker = if ordered {
                format!("{}. ", index)
            } else {
                "- ".to_string()
            };
            index += 1;

            let body = self.children_to_blocks(child).join("\n");
            let indent = " ".repeat(marker.len());
            let mut item_lines = body.lines();
            let first = item_lines.next().unwrap_or_default();
            lines.push(format!("{}{}", marker, first));
            for line in item_lines {
                lines.push(format!("{}{}", indent, line));
            }
        }

        lines.join("\n")
    }

    fn table_to_block(&self, node: NodeRef<Node>) -> String {
        node.descendants()
            .filter(|n| n.value().as_element().map(|e| e.name() == "tr").unwrap_or(false))
            .map(|row| {
                row.children()
                    .filter(|c| {
                        c.value()
                            .as_element()
                            .map(|e| matches!(e.name(), "td" | "th"))
                            .unwrap_or(false)
                    })
                    .map(|cell| self.children_to_inline(cell))
                    .collect::<Vec<_>>()
                    .join(" | ")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Convert children to inline Markdown
    fn children_to_inline(&self, node: NodeRef<Node>) -> String {
        let mut out = String::new();
        for child in node.children() {
            match child.value() {
                Node::Text(text) => out.push_str(&text_to_markdown(text)),
                Node::Element(el) => out.push_str(&self.element_to_inline(el, child)),
                _ => {}
            }
        }
        out.trim().to_string()
    }

    /// Convert an inline element
    fn element_to_inline(&self, element: &scraper::node::Element, node: NodeRef<Node>) -> String {
        match element.name() {
            "b" | "strong" => wrap("**", &self.children_to_inline(node)),
            "i" | "em" => wrap("_", &self.children_to_inline(node)),
            "code" => wrap("`", text_content(node).trim()),
            "a" => {
                let text = self.children_to_inline(node);
                match element.attr("href") {
                    Some(href) if !text.is_empty() => format!("[{}]({})", text, href),
                    _ => text,
                }
            }
            "img" if self.keep_images => {
                let src = element.attr("src").unwrap_or_default();
                let alt = element.attr("alt").unwrap_or_default();
                format!("![{}]({})", alt, src)
            }
            "img" => String::new(),
            "br" => "  \n".to_string(),
            "script" | "style" => String::new(),
            _ => {
                // Keep surrounding whitespace for spans and other pass-through elements
                let mut out = String::new();
                for child in node.children() {
                    match child.value() {
                        Node::Text(text) => out.push_str(&text_to_markdown(text)),
                        Node::Element(el) => out.push_str(&self.element_to_inline(el, child)),
                        _ => {}
                    }
                }
                out
            }
        }
    }
}

impl Default for MarkdownConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkupConverter for MarkdownConverter {
    fn convert(&self, html: &str) -> String {
        let document = Html::parse_document(html);
        let root = *document.root_element();
        let body = root
            .descendants()
            .find(|n| n.value().as_element().map(|e| e.name() == "body").unwrap_or(false))
            .unwrap_or(root);

        self.children_to_blocks(body).join("\n\n")
    }
}

fn is_block(tag: &str) -> bool {
    matches!(
        tag,
        "p" | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "ul"
            | "ol"
            | "blockquote"
            | "pre"
            | "hr"
            | "table"
            | "div"
            | "section"
            | "article"
            | "aside"
            | "header"
            | "footer"
            | "main"
            | "figure"
            | "figcaption"
            | "nav"
            | "body"
            | "head"
            | "script"
            | "style"
            | "title"
            | "dl"
            | "dt"
            | "dd"
    )
}

fn flush(pending: &mut String, blocks: &mut Vec<String>) {
    let text = pending.trim();
    if !text.is_empty() {
        blocks.push(text.to_string());
    }
    pending.clear();
}

fn wrap(marker: &str, text: &str) -> String {
    if text.is_empty() {
        String::new()
    } else {
        format!("{marker}{text}{marker}")
    }
}

/// A text node as Markdown: whitespace collapsed, syntax characters escaped
fn text_to_markdown(text: &str) -> String {
    escape_markdown(&collapse_whitespace(text))
}

/// Backslash-escape characters that Markdown would read as syntax
///
/// Emphasis, code, link, HTML and escape characters are escaped anywhere;
/// list, heading, rule and quote markers only at the start of the text.
fn escape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '*' | '_' | '`' | '[' | ']' | '<') {
            out.push('\\');
        }
        out.push(c);
    }

    if let Some(pattern) = block_marker_pattern() {
        out = pattern.replace(&out, "${1}\\${2}").into_owned();
    }
    if let Some(pattern) = ordered_marker_pattern() {
        out = pattern.replace(&out, "${1}${2}\\. ").into_owned();
    }
    out
}

/// Replace every whitespace run with a single space
fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

/// Get the raw text content of a node
fn text_content(node: NodeRef<Node>) -> String {
    let mut text = String::new();
    for descendant in node.descendants() {
        if let Node::Text(t) = descendant.value() {
            text.push_str(t);
        }
    }
    text
}
