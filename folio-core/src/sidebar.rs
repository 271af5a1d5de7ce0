//! Sidebar cards aligned with their anchors in the reading pane
//!
//! Layout is a pure function of the current geometry. Hosts call it again
//! after every render, scroll or resize and apply the result as a whole.

use crate::config::ReaderConfig;
use crate::types::{AnnotationSpan, ResolvedRangeSet};
use serde::Serialize;
use std::collections::HashMap;

/// What a card shows
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CardContent {
    Term { label: String, text: String },
    Comment { text: String },
}

impl CardContent {
    fn for_span(span: &AnnotationSpan) -> Self {
        if span.is_anchor_only() {
            let text = if span.text.trim().is_empty() {
                "Comment".to_string()
            } else {
                span.text.clone()
            };
            return CardContent::Comment { text };
        }
        CardContent::Term {
            label: span
                .annotation_type()
                .map(|kind| kind.label().to_string())
                .unwrap_or_else(|| "Tag".to_string()),
            text: span.text.clone(),
        }
    }
}

/// A sidebar entry tied to one rendered anchor
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SidebarCard {
    pub anchor_id: String,
    pub content: CardContent,
    /// Raw start offset of the anchor, the reading order key
    pub order: usize,
    /// Measured height, supplied by the host
    pub height: f64,
    /// Computed vertical offset within the sidebar
    pub top: f64,
}

impl SidebarCard {
    pub fn with_height(mut self, height: f64) -> Self {
        self.height = height;
        self
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// Cards for the anchors that actually rendered, in reading order
pub fn build_cards(ranges: &ResolvedRangeSet, anchors: &[String]) -> Vec<SidebarCard> {
    let mut cards: Vec<SidebarCard> = anchors
        .iter()
        .filter_map(|id| ranges.get(id))
        .map(|span| SidebarCard {
            anchor_id: span.id.clone(),
            content: CardContent::for_span(span),
            order: span.start,
            height: 0.0,
            top: 0.0,
        })
        .collect();
    cards.sort_by_key(|card| card.order);
    cards
}

/// Position of the reading pane at layout time
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PaneGeometry {
    /// Top of the pane in viewport coordinates
    pub pane_top: f64,
    pub scroll_top: f64,
}

/// Result of one layout pass
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SidebarLayout {
    /// Positioned cards, top to bottom
    pub cards: Vec<SidebarCard>,
    /// Cards whose anchor has no geometry
    pub hidden: Vec<String>,
}

/// Places cards next to their anchors without letting them overlap
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SidebarLayoutEngine {
    min_gap: f64,
}

impl Default for SidebarLayoutEngine {
    fn default() -> Self {
        Self { min_gap: 4.0 }
    }
}

impl SidebarLayoutEngine {
    pub fn new(min_gap: f64) -> Self {
        Self {
            min_gap: min_gap.max(0.0),
        }
    }

    pub fn from_config(config: &ReaderConfig) -> Self {
        Self::new(config.min_card_gap)
    }

    pub fn min_gap(&self) -> f64 {
        self.min_gap
    }

    /// Lay out `cards` against anchor tops given in viewport coordinates
    ///
    /// Each card targets its anchor's offset within the scrolled pane. Sorted
    /// by target, every card that would start above the previous card's bottom
    /// plus the gap is pushed down to exactly that line.
    pub fn layout(
        &self,
        cards: &[SidebarCard],
        anchor_tops: &HashMap<String, f64>,
        pane: PaneGeometry,
    ) -> SidebarLayout {
        let mut hidden = Vec::new();
        let mut placed: Vec<SidebarCard> = Vec::with_capacity(cards.len());

        for card in cards {
            let Some(anchor_top) = anchor_tops.get(&card.anchor_id) else {
                hidden.push(card.anchor_id.clone());
                continue;
            };
            let mut card = card.clone();
            card.top = (anchor_top - pane.pane_top + pane.scroll_top).max(0.0).floor();
            card.height = card.height.max(0.0);
            placed.push(card);
        }

        placed.sort_by(|a, b| a.top.total_cmp(&b.top));

        let mut previous_bottom: Option<f64> = None;
        for card in &mut placed {
            if let Some(bottom) = previous_bottom {
                card.top = card.top.max(bottom + self.min_gap);
            }
            previous_bottom = Some(card.bottom());
        }

        if !hidden.is_empty() {
            tracing::debug!("{} sidebar card(s) without anchor geometry", hidden.len());
        }

        SidebarLayout {
            cards: placed,
            hidden,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AnnotationType, SpanKind};

    fn card(id: &str, height: f64) -> SidebarCard {
        SidebarCard {
            anchor_id: id.to_string(),
            content: CardContent::Comment { text: String::new() },
            order: 0,
            height,
            top: 0.0,
        }
    }

    fn tops(pairs: &[(&str, f64)]) -> HashMap<String, f64> {
        pairs.iter().map(|(id, top)| (id.to_string(), *top)).collect()
    }

    #[test]
    fn test_cards_follow_anchors() {
        let engine = SidebarLayoutEngine::default();
        let layout = engine.layout(
            &[card("a", 20.0), card("b", 20.0)],
            &tops(&[("a", 150.5), ("b", 400.0)]),
            PaneGeometry {
                pane_top: 100.0,
                scroll_top: 30.0,
            },
        );
        assert_eq!(layout.cards[0].top, 80.0);
        assert_eq!(layout.cards[1].top, 330.0);
    }

    #[test]
    fn test_crowded_cards_are_pushed_down() {
        let engine = SidebarLayoutEngine::new(4.0);
        let layout = engine.layout(
            &[card("a", 50.0), card("b", 30.0), card("c", 10.0)],
            &tops(&[("a", 10.0), ("b", 20.0), ("c", 200.0)]),
            PaneGeometry::default(),
        );
        let placed: Vec<(&str, f64)> = layout
            .cards
            .iter()
            .map(|c| (c.anchor_id.as_str(), c.top))
            .collect();
        assert_eq!(placed, vec![("a", 10.0), ("b", 64.0), ("c", 200.0)]);
    }

    #[test]
    fn test_anchor_above_pane_clamps_to_zero() {
        let layout = SidebarLayoutEngine::default().layout(
            &[card("a", 10.0)],
            &tops(&[("a", 20.0)]),
            PaneGeometry {
                pane_top: 100.0,
                scroll_top: 0.0,
            },
        );
        assert_eq!(layout.cards[0].top, 0.0);
    }

    #[test]
    fn test_missing_geometry_is_hidden() {
        let layout = SidebarLayoutEngine::default().layout(
            &[card("a", 10.0), card("gone", 10.0)],
            &tops(&[("a", 0.0)]),
            PaneGeometry::default(),
        );
        assert_eq!(layout.cards.len(), 1);
        assert_eq!(layout.hidden, vec!["gone"]);
    }

    #[test]
    fn test_build_cards_labels_and_order() {
        let span = |id: &str, kind: SpanKind, start: usize, text: &str| AnnotationSpan {
            id: id.to_string(),
            kind,
            start,
            end: start,
            start_snippet: String::new(),
            end_snippet: String::new(),
            text: text.to_string(),
        };
        let ranges = ResolvedRangeSet::new(vec![
            span("tag_0", SpanKind::Term(Some(AnnotationType::new("ex"))), 30, "story"),
            span("tag_1", SpanKind::Term(None), 50, "plain"),
            span("tag_c_0", SpanKind::Comment, 10, " "),
        ]);
        let anchors = vec!["tag_c_0".to_string(), "tag_0".to_string()];

        let cards = build_cards(&ranges, &anchors);
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].content, CardContent::Comment { text: "Comment".to_string() });
        assert_eq!(
            cards[1].content,
            CardContent::Term {
                label: "Example".to_string(),
                text: "story".to_string()
            }
        );
    }
}
