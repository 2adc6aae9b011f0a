//! Inline grammar rules.
//!
//! The rule table is an ordered, fixed catalog. Order is a tie-break: a span
//! claimed by an earlier rule is never reinterpreted by a later one, so
//! link targets are never read as italic and `**` wins over `*`.

mod render;
mod splitter;

use std::ops::Range;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::document::clean_url;
use crate::error::RuleError;

pub use render::render;
pub use splitter::{Segment, SegmentRole, SegmentedLine, TextSegment, split};

/// Identity of a rule in the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleId {
    Image,
    Header1,
    Header2,
    Header3,
    Header4,
    Divider,
    ListItem,
    Quote,
    Bold,
    Link,
    AngleHyperlink,
    Autolink,
    Italic,
    InlineCode,
}

/// Semantic style attached to rendered text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StyleTag {
    Header1,
    Header2,
    Header3,
    Header4,
    Bold,
    Italic,
    InlineCode,
    Link,
    Autolink,
    AngleHyperlink,
    ListItem,
    Quote,
    Divider,
    Image,
    PlainText,
}

impl StyleTag {
    /// Header level for header tags.
    pub const fn header_level(self) -> Option<u8> {
        match self {
            Self::Header1 => Some(1),
            Self::Header2 => Some(2),
            Self::Header3 => Some(3),
            Self::Header4 => Some(4),
            _ => None,
        }
    }

    /// Whether text carrying this tag points somewhere.
    pub const fn is_link(self) -> bool {
        matches!(self, Self::Link | Self::Autolink | Self::AngleHyperlink)
    }
}

/// How a rule's matches take part in splitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    /// Line-level rule consulted by the block classifier only.
    Block,
    /// Match is split into delimiters and content; content stays open to
    /// later rules.
    Container,
    /// Match becomes one closed segment rendered through its clean template.
    Leaf,
}

/// Static description of a rule, compiled into a [`Rule`].
#[derive(Debug, Clone, Copy)]
pub struct RuleDef {
    pub id: RuleId,
    pub pattern: &'static str,
    pub clean_template: &'static str,
    pub style: StyleTag,
    pub kind: RuleKind,
}

/// A compiled inline grammar rule.
#[derive(Debug, Clone)]
pub struct Rule {
    id: RuleId,
    pattern: Regex,
    clean_template: &'static str,
    style: StyleTag,
    kind: RuleKind,
}

/// One accepted match of a rule, in byte offsets of the searched text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleMatch {
    /// Whole match including delimiters.
    pub span: Range<usize>,
    /// Display content inside the delimiters.
    pub content: Range<usize>,
    /// Link target for link-like rules.
    pub target: Option<String>,
}

impl Rule {
    fn compile(def: &RuleDef) -> Result<Self, RuleError> {
        let pattern = Regex::new(def.pattern).map_err(|source| RuleError::InvalidPattern {
            rule: def.id,
            source,
        })?;
        Ok(Self {
            id: def.id,
            pattern,
            clean_template: def.clean_template,
            style: def.style,
            kind: def.kind,
        })
    }

    pub const fn id(&self) -> RuleId {
        self.id
    }

    pub const fn pattern(&self) -> &Regex {
        &self.pattern
    }

    pub const fn clean_template(&self) -> &'static str {
        self.clean_template
    }

    pub const fn style(&self) -> StyleTag {
        self.style
    }

    pub const fn kind(&self) -> RuleKind {
        self.kind
    }

    /// Strip this rule's delimiters from `raw` using the clean template.
    ///
    /// Text the pattern does not match is returned unchanged.
    pub fn clean(&self, raw: &str) -> String {
        self.pattern.replace(raw, self.clean_template).into_owned()
    }

    /// All accepted matches in `text`.
    pub fn find_matches(&self, text: &str) -> Vec<RuleMatch> {
        self.find_in(text, 0..text.len())
    }

    /// Accepted matches that lie inside `window` of `line`.
    ///
    /// The pattern sees `line` up to the window end, so `^` keeps meaning
    /// "start of line" and word boundaries see the preceding character.
    pub(crate) fn find_in(&self, line: &str, window: Range<usize>) -> Vec<RuleMatch> {
        let haystack = &line[..window.end];
        let mut found = Vec::new();
        let mut at = window.start;
        while at <= haystack.len() {
            let Some(caps) = self.pattern.captures_at(haystack, at) else {
                break;
            };
            let Some(whole) = caps.get(0) else {
                break;
            };
            if whole.is_empty() {
                at = whole.end() + haystack[whole.end()..].chars().next().map_or(1, char::len_utf8);
                continue;
            }
            if let Some(accepted) = self.accept(&caps) {
                found.push(accepted);
            }
            at = whole.end();
        }
        found
    }

    fn accept(&self, caps: &Captures<'_>) -> Option<RuleMatch> {
        let whole = caps.get(0)?;
        let span = whole.range();
        let content = caps
            .name("text")
            .or_else(|| caps.name("alt"))
            .map_or_else(|| span.clone(), |m| m.range());
        let target = match self.id {
            RuleId::Link | RuleId::Image => Some(clean_url(caps.name("url")?.as_str())?),
            RuleId::Autolink | RuleId::AngleHyperlink => Some(caps.name("url")?.as_str().to_string()),
            RuleId::Header1
            | RuleId::Header2
            | RuleId::Header3
            | RuleId::Header4
            | RuleId::Divider
            | RuleId::ListItem
            | RuleId::Quote
            | RuleId::Bold
            | RuleId::Italic
            | RuleId::InlineCode => None,
        };
        Some(RuleMatch {
            span,
            content,
            target,
        })
    }
}

/// Built-in rules in tie-break order.
pub const STANDARD_RULES: &[RuleDef] = &[
    RuleDef {
        id: RuleId::Header1,
        pattern: r"^#[ \t]+(?P<text>.*)$",
        clean_template: "${text}",
        style: StyleTag::Header1,
        kind: RuleKind::Container,
    },
    RuleDef {
        id: RuleId::Header2,
        pattern: r"^##[ \t]+(?P<text>.*)$",
        clean_template: "${text}",
        style: StyleTag::Header2,
        kind: RuleKind::Container,
    },
    RuleDef {
        id: RuleId::Header3,
        pattern: r"^###[ \t]+(?P<text>.*)$",
        clean_template: "${text}",
        style: StyleTag::Header3,
        kind: RuleKind::Container,
    },
    RuleDef {
        id: RuleId::Header4,
        pattern: r"^#{4,6}[ \t]+(?P<text>.*)$",
        clean_template: "${text}",
        style: StyleTag::Header4,
        kind: RuleKind::Container,
    },
    RuleDef {
        id: RuleId::Divider,
        pattern: r"^(?:-{3,}|\*{3,})[ \t]*$",
        clean_template: "",
        style: StyleTag::Divider,
        kind: RuleKind::Block,
    },
    RuleDef {
        id: RuleId::ListItem,
        pattern: r"^- (?P<text>.*)$",
        clean_template: "${text}",
        style: StyleTag::ListItem,
        kind: RuleKind::Container,
    },
    RuleDef {
        id: RuleId::Quote,
        pattern: r"^>[ \t]?(?P<text>.*)$",
        clean_template: "${text}",
        style: StyleTag::Quote,
        kind: RuleKind::Container,
    },
    RuleDef {
        id: RuleId::Image,
        pattern: r"!\[(?P<alt>[^\]]*)\]\((?P<url>[^)]*)\)",
        clean_template: "${alt}",
        style: StyleTag::Image,
        kind: RuleKind::Leaf,
    },
    RuleDef {
        id: RuleId::Bold,
        pattern: r"\*\*(?P<text>[^*\s](?:.*?[^*\s])?)\*\*|\b__(?P<alt>[^_\s](?:.*?[^_\s])?)__\b",
        clean_template: "${text}${alt}",
        style: StyleTag::Bold,
        kind: RuleKind::Container,
    },
    RuleDef {
        id: RuleId::Link,
        pattern: r"\[(?P<text>[^\]]*)\]\((?P<url>[^)]*)\)",
        clean_template: "${text}",
        style: StyleTag::Link,
        kind: RuleKind::Leaf,
    },
    RuleDef {
        id: RuleId::AngleHyperlink,
        pattern: r"<(?P<url>https?://[^\s<>]+)>",
        clean_template: "${url}",
        style: StyleTag::AngleHyperlink,
        kind: RuleKind::Leaf,
    },
    RuleDef {
        id: RuleId::Autolink,
        pattern: r#"(?P<url>https?://[^\s<>()\[\]]*[^\s<>()\[\].,;:!?'"*_])"#,
        clean_template: "${url}",
        style: StyleTag::Autolink,
        kind: RuleKind::Leaf,
    },
    RuleDef {
        id: RuleId::Italic,
        pattern: r"\*(?P<text>[^*\s](?:[^*]*?[^*\s])?)\*|\b_(?P<alt>[^_\s](?:[^_]*?[^_\s])?)_\b",
        clean_template: "${text}${alt}",
        style: StyleTag::Italic,
        kind: RuleKind::Container,
    },
    RuleDef {
        id: RuleId::InlineCode,
        pattern: r"`(?P<text>[^`]+)`",
        clean_template: "${text}",
        style: StyleTag::InlineCode,
        kind: RuleKind::Leaf,
    },
];

static STANDARD: LazyLock<RuleTable> = LazyLock::new(|| {
    RuleTable::new(STANDARD_RULES).expect("built-in rule patterns must compile")
});

/// Ordered set of compiled rules.
#[derive(Debug, Clone)]
pub struct RuleTable {
    rules: Vec<Rule>,
}

impl RuleTable {
    /// Compile `defs` in order.
    pub fn new(defs: &[RuleDef]) -> Result<Self, RuleError> {
        let mut rules: Vec<Rule> = Vec::with_capacity(defs.len());
        for def in defs {
            if rules.iter().any(|rule| rule.id == def.id) {
                return Err(RuleError::DuplicateRule { rule: def.id });
            }
            rules.push(Rule::compile(def)?);
        }
        Ok(Self { rules })
    }

    /// The process-wide built-in table.
    pub fn standard() -> &'static Self {
        &STANDARD
    }

    pub fn get(&self, id: RuleId) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    /// Rules the inline splitter applies, in order.
    pub fn inline_rules(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter().filter(|rule| rule.kind != RuleKind::Block)
    }

    pub fn style_of(&self, id: RuleId) -> StyleTag {
        self.get(id).map_or(StyleTag::PlainText, Rule::style)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(id: RuleId) -> &'static Rule {
        RuleTable::standard().get(id).unwrap()
    }

    #[test]
    fn test_standard_table_compiles_every_rule() {
        assert_eq!(RuleTable::standard().len(), STANDARD_RULES.len());
    }

    #[test]
    fn test_invalid_pattern_is_reported_at_construction() {
        let defs = [RuleDef {
            id: RuleId::Bold,
            pattern: r"(\*\*",
            clean_template: "",
            style: StyleTag::Bold,
            kind: RuleKind::Container,
        }];
        let err = RuleTable::new(&defs).unwrap_err();
        assert!(matches!(
            err,
            RuleError::InvalidPattern {
                rule: RuleId::Bold,
                ..
            }
        ));
    }

    #[test]
    fn test_duplicate_rule_is_rejected() {
        let defs = [STANDARD_RULES[8], STANDARD_RULES[8]];
        assert!(matches!(
            RuleTable::new(&defs),
            Err(RuleError::DuplicateRule { rule: RuleId::Bold })
        ));
    }

    #[test]
    fn test_angle_hyperlinks_precede_autolinks() {
        let order: Vec<RuleId> = RuleTable::standard().iter().map(Rule::id).collect();
        let angle = order.iter().position(|id| *id == RuleId::AngleHyperlink);
        let auto = order.iter().position(|id| *id == RuleId::Autolink);
        let link = order.iter().position(|id| *id == RuleId::Link);
        assert!(link < angle && angle < auto);
    }

    #[test]
    fn test_image_is_claimed_after_line_rules_and_before_links() {
        let order: Vec<RuleId> = RuleTable::standard().iter().map(Rule::id).collect();
        let quote = order.iter().position(|id| *id == RuleId::Quote);
        let image = order.iter().position(|id| *id == RuleId::Image);
        let bold = order.iter().position(|id| *id == RuleId::Bold);
        let link = order.iter().position(|id| *id == RuleId::Link);
        assert!(quote < image && image < bold && bold < link);
    }

    #[test]
    fn test_bold_precedes_italic() {
        let order: Vec<RuleId> = RuleTable::standard().iter().map(Rule::id).collect();
        let bold = order.iter().position(|id| *id == RuleId::Bold);
        let italic = order.iter().position(|id| *id == RuleId::Italic);
        assert!(bold < italic);
    }

    #[test]
    fn test_inline_rules_skip_block_rules() {
        assert!(
            RuleTable::standard()
                .inline_rules()
                .all(|rule| rule.kind() != RuleKind::Block)
        );
    }

    #[test]
    fn test_clean_strips_bold_delimiters() {
        assert_eq!(rule(RuleId::Bold).clean("**strong**"), "strong");
        assert_eq!(rule(RuleId::Bold).clean("__strong__"), "strong");
    }

    #[test]
    fn test_clean_keeps_link_text() {
        assert_eq!(rule(RuleId::Link).clean("[click](https://x.com)"), "click");
    }

    #[test]
    fn test_header_levels_are_exclusive() {
        assert_eq!(rule(RuleId::Header1).find_matches("## Two").len(), 0);
        assert_eq!(rule(RuleId::Header2).find_matches("## Two").len(), 1);
        assert_eq!(rule(RuleId::Header4).find_matches("###### Six").len(), 1);
        assert_eq!(rule(RuleId::Header1).find_matches("#tag").len(), 0);
    }

    #[test]
    fn test_link_match_strips_title() {
        let found = rule(RuleId::Link).find_matches(r#"[text](https://x.com "My Title")"#);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].target.as_deref(), Some("https://x.com"));
    }

    #[test]
    fn test_link_with_empty_url_is_rejected() {
        assert!(rule(RuleId::Link).find_matches("[text]( )").is_empty());
    }

    #[test]
    fn test_unterminated_bold_has_no_match() {
        assert!(rule(RuleId::Bold).find_matches("**text").is_empty());
        assert!(rule(RuleId::Italic).find_matches("this is *broken").is_empty());
    }

    #[test]
    fn test_italic_ignores_snake_case() {
        assert!(rule(RuleId::Italic).find_matches("snake_case_name").is_empty());
        assert_eq!(rule(RuleId::Italic).find_matches("an _em_ word").len(), 1);
    }

    #[test]
    fn test_autolink_drops_trailing_punctuation() {
        let found = rule(RuleId::Autolink).find_matches("see https://x.com/a.");
        assert_eq!(found[0].target.as_deref(), Some("https://x.com/a"));
    }

    #[test]
    fn test_find_in_respects_line_anchor() {
        let line = "# - not a list";
        let found = rule(RuleId::ListItem).find_in(line, 2..line.len());
        assert!(found.is_empty());
    }

    #[test]
    fn test_container_content_range() {
        let found = rule(RuleId::Bold).find_matches("a **b** c");
        assert_eq!(found[0].span, 2..7);
        assert_eq!(found[0].content, 4..5);
    }

    #[test]
    fn test_style_header_levels() {
        assert_eq!(StyleTag::Header3.header_level(), Some(3));
        assert_eq!(StyleTag::Bold.header_level(), None);
    }
}
