//! Visible-text extraction.
//!
//! Walks the text nodes under `<body>` in document order, skipping
//! non-content subtrees and anything the style probe reports as not
//! rendered. Each text node is whitespace-collapsed and trimmed; the
//! pieces are joined with single spaces and capped at [`MAX_TEXT_CHARS`].

use std::sync::Arc;

use scraper::{Html, Node, Selector};
use tracing::debug;
use veritas_core::PageSnapshot;

use crate::page::PageDocument;
use crate::style::{ComputedStyle, StyleProbe};

/// Size guard on snapshot text, in characters.
pub const MAX_TEXT_CHARS: usize = 150_000;

/// Elements whose subtree never contributes text.
pub const SKIPPED_TAGS: &[&str] = &[
    "script", "style", "noscript", "svg", "path", "iframe", "nav", "footer", "header",
];

/// Computes page snapshots and remembers the most recent one.
pub struct Extractor {
    probe: Arc<dyn StyleProbe>,
    latest: Option<PageSnapshot>,
}

impl Extractor {
    pub fn new(probe: Arc<dyn StyleProbe>) -> Self {
        Self {
            probe,
            latest: None,
        }
    }

    /// Recompute the snapshot for `page`, replacing the cached one.
    pub fn refresh(&mut self, page: &PageDocument) -> PageSnapshot {
        let document = Html::parse_document(&page.html);
        let snapshot = PageSnapshot {
            url: page.url.clone(),
            title: page_title(&document),
            text: truncate_chars(visible_text(&document, self.probe.as_ref()), MAX_TEXT_CHARS),
        };
        debug!(
            "Extracted {} chars from {}",
            snapshot.text.chars().count(),
            snapshot.url
        );
        self.latest = Some(snapshot.clone());
        snapshot
    }

    /// Last snapshot computed, if any.
    pub fn latest(&self) -> Option<&PageSnapshot> {
        self.latest.as_ref()
    }
}

fn page_title(document: &Html) -> String {
    Selector::parse("title")
        .ok()
        .and_then(|sel| document.select(&sel).next())
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        .unwrap_or_default()
}

/// Visible text of the document body, untruncated.
pub fn visible_text(document: &Html, probe: &dyn StyleProbe) -> String {
    let root = Selector::parse("body")
        .ok()
        .and_then(|sel| document.select(&sel).next())
        .unwrap_or_else(|| document.root_element());

    let mut pieces: Vec<String> = Vec::new();
    // Explicit stack so deeply nested markup cannot exhaust the call stack.
    // Each entry carries the computed style of the node's parent element.
    let mut stack = vec![(*root, ComputedStyle::default())];

    while let Some((node, parent_style)) = stack.pop() {
        match node.value() {
            Node::Text(text) => {
                if parent_style.is_visible() {
                    let collapsed = collapse_whitespace(text);
                    if !collapsed.is_empty() {
                        pieces.push(collapsed);
                    }
                }
            }
            Node::Element(element) => {
                if SKIPPED_TAGS.contains(&element.name()) {
                    continue;
                }
                let style = probe.computed_style(element, &parent_style);
                if style.display_none {
                    continue;
                }
                let children: Vec<_> = node.children().collect();
                stack.extend(children.into_iter().rev().map(|child| (child, style)));
            }
            _ => {}
        }
    }

    pieces.join(" ").trim().to_string()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate_chars(text: String, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => text[..cut].to_string(),
        None => text,
    }
}
