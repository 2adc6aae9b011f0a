//! Resolve a segmented line into display-ready styled runs.

use super::{RuleId, RuleTable, SegmentRole, SegmentedLine, StyleTag};
use crate::document::{StyledRun, StyledText};

/// Render segments with their markers removed.
///
/// Delimiters are dropped, closed segments go through their rule's clean
/// template, open text is copied verbatim. Every run carries the styles of
/// its whole rule stack.
pub fn render(line: &SegmentedLine<'_>, table: &RuleTable) -> StyledText {
    let mut text = StyledText::new();
    for segment in line.segments() {
        let raw = line.raw(segment);
        let display = match segment.role() {
            SegmentRole::Delimiter => continue,
            SegmentRole::Text => raw.to_string(),
            SegmentRole::Closed => segment
                .rules()
                .last()
                .and_then(|id| table.get(*id))
                .map_or_else(|| raw.to_string(), |rule| rule.clean(raw)),
        };
        if display.is_empty() {
            continue;
        }
        let run = StyledRun::new(display, styles_for(segment.rules(), table))
            .with_link(segment.target().map(ToString::to_string));
        text.push(run);
    }
    text
}

fn styles_for(rules: &[RuleId], table: &RuleTable) -> Vec<StyleTag> {
    if rules.is_empty() {
        return vec![StyleTag::PlainText];
    }
    rules.iter().map(|id| table.style_of(*id)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::split;

    fn render_line(line: &str) -> StyledText {
        let table = RuleTable::standard();
        render(&split(line, table), table)
    }

    #[test]
    fn test_plain_text_renders_verbatim() {
        let text = render_line("hello world");
        assert_eq!(text.plain_text(), "hello world");
        assert_eq!(text.runs()[0].styles(), &[StyleTag::PlainText]);
    }

    #[test]
    fn test_markers_are_stripped() {
        let text = render_line("a **b** _c_ `d` [e](https://f.g)");
        assert_eq!(text.plain_text(), "a b c d e");
    }

    #[test]
    fn test_nested_bold_italic_runs() {
        let text = render_line("**bold *and italic* text**");
        assert_eq!(text.plain_text(), "bold and italic text");
        let runs = text.runs();
        assert_eq!(runs.len(), 3);
        assert_eq!(runs[0].styles(), &[StyleTag::Bold]);
        assert_eq!(runs[1].styles(), &[StyleTag::Bold, StyleTag::Italic]);
        assert_eq!(runs[2].styles(), &[StyleTag::Bold]);
    }

    #[test]
    fn test_unterminated_marker_keeps_literal_star() {
        let text = render_line("this is *broken");
        assert_eq!(text.plain_text(), "this is *broken");
    }

    #[test]
    fn test_link_run_carries_target() {
        let text = render_line("[click](https://x.com)");
        let run = &text.runs()[0];
        assert_eq!(run.text(), "click");
        assert_eq!(run.link(), Some("https://x.com"));
        assert_eq!(run.styles(), &[StyleTag::Link]);
    }

    #[test]
    fn test_angle_hyperlink_renders_url_only() {
        let text = render_line("see <https://x.com/a>");
        assert_eq!(text.plain_text(), "see https://x.com/a");
        assert_eq!(text.runs()[1].styles(), &[StyleTag::AngleHyperlink]);
    }

    #[test]
    fn test_header_run_drops_hashes() {
        let text = render_line("### Third");
        assert_eq!(text.plain_text(), "Third");
        assert_eq!(text.runs()[0].styles(), &[StyleTag::Header3]);
    }
}
