//! Annotation pipeline tests for folio-core
//!
//! These tests run raw chapter text and annotation documents through
//! resolution, rendering and sidebar layout together.

use folio_core::annotate::{AnnotationDocument, AnnotationRangeResolver, ChapterRenderer, HtmlOverlayRenderer};
use folio_core::sidebar::{build_cards, PaneGeometry, SidebarCard, SidebarLayoutEngine};
use folio_core::types::Chapter;
use folio_core::{DisplayMap, ResolvedRangeSet};
use proptest::prelude::*;
use std::collections::HashMap;

fn annotate(raw: &str, tags: &str) -> (String, Vec<String>) {
    let document = AnnotationDocument::from_json(tags).unwrap();
    let resolution = AnnotationRangeResolver::new().resolve(raw, &document);
    let html = ChapterRenderer::default().render(raw, "book.epub");
    let out = HtmlOverlayRenderer::new().render(&html, raw, &resolution.ranges);
    (out.html, out.anchors)
}

// =============================================================================
// Pipeline
// =============================================================================

#[test]
fn test_repeated_phrase_is_underlined_twice() {
    let raw = "The cat sat. The cat ran.";
    let tags = r#"{"def": [{"s": "The cat", "e": "."}, {"s": "The cat", "e": "."}]}"#;
    let document = AnnotationDocument::from_json(tags).unwrap();

    let ranges = AnnotationRangeResolver::new().resolve(raw, &document).ranges;
    let offsets: Vec<(usize, usize)> = ranges.iter().map(|s| (s.start, s.end)).collect();
    assert_eq!(offsets, vec![(0, 12), (13, 25)]);

    let (html, anchors) = annotate(raw, tags);
    insta::assert_snapshot!(html.trim_end(), @r#"<p><span id="tag_0" class="tag-underline type-def">The cat sat.</span> <span id="tag_1" class="tag-underline type-def">The cat ran.</span></p>"#);
    assert_eq!(anchors, vec!["tag_0", "tag_1"]);
}

#[test]
fn test_snapshot_with_comment_and_footer() {
    let raw = "Deep work is *rare*. It is valuable.\n\n* * *\n\nNotes follow.";
    let tags = r#"{
        "data": {
            "tips": [{"start": "It is", "end": "valuable.", "text": "the core claim"}],
            "comments": [{"anchor": "Notes", "text": "skip these"}]
        }
    }"#;

    let (html, anchors) = annotate(raw, tags);
    insta::assert_snapshot!(html.trim_end(), @r#"
    <p>Deep work is <em>rare</em>. <span id="tag_0" class="tag-underline type-tips">It is valuable.</span></p>
    <hr><div class="chapter-footer">
    <p><span id="tag_c_0" class="tag-comment-emoji">💬</span>Notes follow.</p>
    </div>
    "#);
    assert_eq!(anchors, vec!["tag_0", "tag_c_0"]);
}

#[test]
fn test_rendering_ignores_discovery_order() {
    let raw = "a b a b a b";
    let tags = r#"{"x": [{"s": "a", "e": "b"}, {"s": "a", "e": "b"}], "c": [{"a": "b", "t": "?"}]}"#;
    let document = AnnotationDocument::from_json(tags).unwrap();
    let ranges = AnnotationRangeResolver::new().resolve(raw, &document).ranges;
    let reversed = ResolvedRangeSet::new(ranges.as_slice().iter().rev().cloned().collect());

    let html = ChapterRenderer::default().render(raw, "book.epub");
    let renderer = HtmlOverlayRenderer::new();
    let forward = renderer.render(&html, raw, &ranges);
    let backward = renderer.render(&html, raw, &reversed);

    assert_eq!(forward.html, backward.html);
    assert_eq!(forward.anchors, backward.anchors);
    assert_eq!(forward.anchors.len(), 3);
}

#[test]
fn test_sidebar_cards_follow_rendered_anchors() {
    let raw = "alpha beta gamma";
    let document = AnnotationDocument::from_json(
        r#"{"ex": [{"s": "gamma", "e": "gamma", "t": "late"}], "comments": [{"a": "alpha", "t": "early"}]}"#,
    )
    .unwrap();
    let ranges = AnnotationRangeResolver::new().resolve(raw, &document).ranges;
    let out = HtmlOverlayRenderer::new().render("<p>alpha beta gamma</p>", raw, &ranges);

    // the term's end snippet cannot follow its own start, so only the comment renders
    let cards = build_cards(&ranges, &out.anchors);
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].anchor_id, "tag_c_0");
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn prop_display_numbering_round_trips(
        lengths in proptest::collection::vec(0usize..1000, 0..30),
        threshold in 0usize..1000,
    ) {
        let chapters: Vec<Chapter> = lengths
            .iter()
            .enumerate()
            .map(|(i, len)| Chapter::new(format!("c{}", i), format!("id{}", i), "x".repeat(*len), i as u32 + 1))
            .collect();
        let map = DisplayMap::build(&chapters, threshold);

        let visible = lengths.iter().filter(|len| **len >= threshold).count() as u32;
        prop_assert_eq!(map.len(), visible);
        for display in 1..=map.len() {
            let real = map.display_to_real(display).unwrap();
            prop_assert_eq!(map.real_to_display(real), Some(display));
            prop_assert!(chapters[real as usize - 1].content_length >= threshold);
        }
        prop_assert!(map.display_to_real(0).is_err());
        prop_assert!(map.display_to_real(map.len() + 1).is_err());
    }

    #[test]
    fn prop_resolved_ranges_match_their_snippets(
        words in proptest::collection::vec("[a-c]{1,3}", 1..20),
        picks in proptest::collection::vec((0usize..20, 0usize..20), 0..6),
    ) {
        let raw = words.join(" ");
        let terms: Vec<serde_json::Value> = picks
            .iter()
            .map(|(s, e)| serde_json::json!({
                "s": words[s % words.len()],
                "e": words[e % words.len()],
            }))
            .collect();
        let document = AnnotationDocument::from_value(&serde_json::json!({ "def": terms }));
        let ranges = AnnotationRangeResolver::new().resolve(&raw, &document).ranges;

        for span in ranges.iter() {
            let covered = &raw[span.start..span.end];
            prop_assert!(covered.starts_with(&span.start_snippet));
            prop_assert!(covered.ends_with(&span.end_snippet));
            prop_assert!(covered.len() >= span.start_snippet.len() + span.end_snippet.len());
        }
    }

    #[test]
    fn prop_sidebar_cards_never_overlap(
        geometry in proptest::collection::vec((-200.0f64..2000.0, 0.0f64..150.0), 0..25),
        gap in 0.0f64..20.0,
        scroll in 0.0f64..500.0,
    ) {
        let mut cards = Vec::new();
        let mut anchors = HashMap::new();
        for (i, (top, height)) in geometry.iter().enumerate() {
            let id = format!("tag_{}", i);
            anchors.insert(id.clone(), *top);
            cards.push(SidebarCard {
                anchor_id: id,
                content: folio_core::sidebar::CardContent::Comment { text: String::new() },
                order: i,
                height: *height,
                top: 0.0,
            });
        }

        let pane = PaneGeometry { pane_top: 50.0, scroll_top: scroll };
        let layout = SidebarLayoutEngine::new(gap).layout(&cards, &anchors, pane);

        prop_assert_eq!(layout.cards.len(), cards.len());
        for pair in layout.cards.windows(2) {
            prop_assert!(pair[1].top >= pair[0].top + pair[0].height + gap - 1e-9);
        }
        for card in &layout.cards {
            let target = (anchors[&card.anchor_id] - pane.pane_top + pane.scroll_top).max(0.0).floor();
            prop_assert!(card.top >= target);
        }
    }

    #[test]
    fn prop_overlay_ignores_range_order(
        words in proptest::collection::vec("[a-c]{1,3}", 1..20),
        picks in proptest::collection::vec((0usize..20, 0usize..20), 0..6),
        anchors in proptest::collection::vec(0usize..20, 0..4),
        keys in proptest::collection::vec(any::<u32>(), 10),
    ) {
        let raw = words.join(" ");
        let terms: Vec<serde_json::Value> = picks
            .iter()
            .map(|(s, e)| serde_json::json!({
                "s": words[s % words.len()],
                "e": words[e % words.len()],
            }))
            .collect();
        let comments: Vec<serde_json::Value> = anchors
            .iter()
            .map(|a| serde_json::json!({ "a": words[a % words.len()], "t": "" }))
            .collect();
        let document = AnnotationDocument::from_value(&serde_json::json!({
            "def": terms,
            "comments": comments,
        }));
        let ranges = AnnotationRangeResolver::new().resolve(&raw, &document).ranges;

        let mut shuffled: Vec<_> = ranges.iter().cloned().zip(keys.iter().copied()).collect();
        shuffled.sort_by_key(|(_, key)| *key);
        let shuffled = ResolvedRangeSet::new(shuffled.into_iter().map(|(span, _)| span).collect());

        let html = ChapterRenderer::default().render(&raw, "book.epub");
        let renderer = HtmlOverlayRenderer::new();
        let expected = renderer.render(&html, &raw, &ranges);
        let actual = renderer.render(&html, &raw, &shuffled);

        prop_assert_eq!(actual.html, expected.html);
        prop_assert_eq!(actual.anchors, expected.anchors);
    }
}
