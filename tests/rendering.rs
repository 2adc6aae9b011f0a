use postmark::document::{Document, RenderBlock, StyledRun, StyledText};
use postmark::highlight::{self, HighlightRange, Rgba};
use postmark::rules::{RuleTable, StyleTag, split};
use proptest::prelude::*;

fn first_text(doc: &Document) -> &StyledText {
    doc.blocks()
        .iter()
        .find_map(RenderBlock::styled_text)
        .expect("document should have a text block")
}

fn run<'a>(text: &'a StyledText, needle: &str) -> &'a StyledRun {
    text.runs()
        .iter()
        .find(|run| run.text() == needle)
        .unwrap_or_else(|| panic!("no run {needle:?} in {:?}", text.runs()))
}

fn range(start: i64, length: i64) -> HighlightRange {
    HighlightRange {
        post_id: "post-1".to_string(),
        start,
        length,
        color: Rgba::opaque(255, 230, 0),
        note: Some("remember this".to_string()),
    }
}

#[test]
fn test_rendering_is_repeatable() {
    let source = include_str!("fixtures/post.md");
    let first = Document::parse(source);
    let second = Document::parse(source);
    assert_eq!(first.blocks(), second.blocks());
    assert_eq!(
        serde_json::to_string(first.blocks()).unwrap(),
        serde_json::to_string(second.blocks()).unwrap()
    );
}

#[test]
fn test_bold_does_not_close_on_inner_italic() {
    let doc = Document::parse("**bold *and italic* text**");
    let text = first_text(&doc);
    assert_eq!(text.plain_text(), "bold and italic text");
    assert!(text.runs().iter().all(|run| run.has_style(StyleTag::Bold)));
    assert_eq!(run(text, "and italic").styles(), &[StyleTag::Bold, StyleTag::Italic]);
    assert_eq!(run(text, "bold ").styles(), &[StyleTag::Bold]);
}

#[test]
fn test_unterminated_delimiter_stays_literal() {
    let doc = Document::parse("this is *broken");
    let text = first_text(&doc);
    assert_eq!(text.plain_text(), "this is *broken");
    assert_eq!(text.runs().len(), 1);
    assert_eq!(text.runs()[0].styles(), &[StyleTag::PlainText]);
}

#[test]
fn test_split_image_renders_like_single_line_image() {
    let split_source = Document::parse("![alt](\nhttps://x.com/img.png)");
    let joined = Document::parse("![alt](https://x.com/img.png)");
    assert_eq!(split_source.blocks(), joined.blocks());
    assert_eq!(
        joined.blocks(),
        &[RenderBlock::Image {
            url: "https://x.com/img.png".to_string(),
            alt: Some("alt".to_string()),
        }]
    );
}

#[test]
fn test_unfinished_image_keeps_following_blocks() {
    let doc = Document::parse("Intro ![a](\n\n## Next section\n- item\n---");
    assert_eq!(doc.headings().len(), 1);
    assert_eq!(doc.headings()[0].level, 2);
    assert_eq!(doc.block_count(), 3);
    assert!(matches!(doc.blocks()[1], RenderBlock::ListItem(_)));
    assert_eq!(doc.blocks()[2], RenderBlock::Divider);
    assert!(doc.images().is_empty());
}

#[test]
fn test_image_markup_without_url_on_next_line_is_not_joined() {
    let doc = Document::parse("![a](\n# Title\ntext (aside)");
    assert_eq!(doc.headings().len(), 1);
    assert_eq!(doc.headings()[0].text, "Title");
    assert_eq!(
        first_text(&doc).plain_text(),
        "![a](\nTitle\ntext (aside)"
    );
}

#[test]
fn test_mid_line_image_is_not_a_link() {
    let doc = Document::parse("Look: ![cat](https://x.com/c.png) nice");
    assert!(doc.links().is_empty());
    assert_eq!(doc.images().len(), 1);
    assert_eq!(doc.images()[0].alt.as_deref(), Some("cat"));
    assert!(
        doc.blocks()
            .iter()
            .filter_map(RenderBlock::plain_text)
            .all(|text| !text.contains('!'))
    );
}

#[test]
fn test_link_title_is_dropped() {
    let doc = Document::parse(r#"[text](https://x.com "My Title")"#);
    assert_eq!(doc.links().len(), 1);
    assert_eq!(doc.links()[0].url, "https://x.com");
    assert_eq!(doc.links()[0].text, "text");
}

#[test]
fn test_stale_highlight_is_skipped() {
    let painted = highlight::apply("abcd", &[range(5, 3)]);
    assert_eq!(painted, StyledText::plain("abcd"));
}

#[test]
fn test_highlight_composes_with_bold() {
    let doc = Document::parse("plain **bold** text");
    let painted = doc.highlight_block(0, &[range(6, 4)]).unwrap();
    let bold = run(&painted, "bold");
    assert!(bold.has_style(StyleTag::Bold));
    let mark = bold.highlight().expect("bold run should be highlighted");
    assert_eq!(mark.note.as_deref(), Some("remember this"));
    assert!(run(&painted, "plain ").highlight().is_none());
    assert_eq!(painted.plain_text(), "plain bold text");
}

#[test]
fn test_highlight_keeps_link_target() {
    let doc = Document::parse("go [here](https://x.com) now");
    let painted = doc.highlight_block(0, &[range(0, 7)]).unwrap();
    let link = run(&painted, "here");
    assert_eq!(link.link(), Some("https://x.com"));
    assert!(link.highlight().is_some());
}

#[test]
fn test_link_url_is_not_autolinked() {
    let doc = Document::parse("[click](https://x.com)");
    let text = first_text(&doc);
    assert_eq!(text.runs().len(), 1);
    assert_eq!(text.runs()[0].text(), "click");
    assert_eq!(text.runs()[0].styles(), &[StyleTag::Link]);
    assert!(!text.runs().iter().any(|run| run.has_style(StyleTag::Autolink)));
}

#[test]
fn test_bare_and_angle_urls() {
    let doc = Document::parse("see https://x.com. or <https://y.org/a>");
    let text = first_text(&doc);
    assert_eq!(text.plain_text(), "see https://x.com. or https://y.org/a");
    assert_eq!(run(text, "https://x.com").styles(), &[StyleTag::Autolink]);
    assert_eq!(
        run(text, "https://y.org/a").styles(),
        &[StyleTag::AngleHyperlink]
    );
    assert_eq!(run(text, "https://y.org/a").link(), Some("https://y.org/a"));
}

#[test]
fn test_fenced_code_is_not_reinterpreted() {
    let doc = Document::parse("```\n# not a header\n- not a list\n---\n```");
    assert_eq!(doc.block_count(), 1);
    assert!(doc.headings().is_empty());
    let text = first_text(&doc);
    assert_eq!(text.plain_text(), "# not a header\n- not a list\n---");
    assert!(
        text.runs()
            .iter()
            .filter(|run| run.text() != "\n")
            .all(|run| run.styles() == [StyleTag::InlineCode])
    );
}

#[test]
fn test_fixture_block_sequence() {
    let doc = Document::parse(include_str!("fixtures/post.md"));
    let kinds: Vec<&str> = doc
        .blocks()
        .iter()
        .map(|block| match block {
            RenderBlock::Paragraph(_) => "paragraph",
            RenderBlock::ListItem(_) => "list",
            RenderBlock::Image { .. } => "image",
            RenderBlock::Divider => "divider",
        })
        .collect();
    assert_eq!(
        kinds,
        vec![
            "paragraph",
            "image",
            "paragraph",
            "list",
            "list",
            "divider",
            "paragraph",
        ]
    );
    assert_eq!(doc.headings().len(), 2);
    assert_eq!(doc.headings()[0].text, "Weekend notes");
    assert_eq!(doc.headings()[1].level, 2);
    assert_eq!(doc.images().len(), 1);
    assert_eq!(doc.images()[0].src, "https://example.com/trail.jpg");
}

#[test]
fn test_blocks_serialize_with_kind_tag() {
    let doc = Document::parse("hello\n\n---");
    let value = serde_json::to_value(doc.blocks()).unwrap();
    assert_eq!(value[0]["kind"], "paragraph");
    assert_eq!(value[1]["kind"], "divider");
}

proptest! {
    #[test]
    fn prop_segments_reconstruct_line(line in "[ -~]{0,60}") {
        let segmented = split(&line, RuleTable::standard());
        prop_assert_eq!(segmented.reconstruct(), line);
    }

    #[test]
    fn prop_parse_is_deterministic(source in "[ -~\n]{0,200}") {
        let first = Document::parse(&source);
        let second = Document::parse(&source);
        prop_assert_eq!(first.blocks(), second.blocks());
    }

    #[test]
    fn prop_parse_never_panics(source in "\\PC{0,200}") {
        let doc = Document::parse(&source);
        for index in 0..doc.block_count() {
            let _ = doc.highlight_block(index, &[range(0, 1), range(-3, 2)]);
        }
    }
}
