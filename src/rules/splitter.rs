//! Inline splitter.
//!
//! A line is partitioned into segments held in a flat arena of byte ranges.
//! Each rule pass walks the current arena and replaces every open segment
//! the rule matches with `[prefix, match.., between, match.., suffix]`,
//! appending the rule to the matched pieces' rule stack.

use std::ops::Range;

use super::{Rule, RuleId, RuleKind, RuleTable};

/// What a segment contributes to rendered output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentRole {
    /// Open text, rendered verbatim and still splittable.
    Text,
    /// Markup of a container rule; not rendered.
    Delimiter,
    /// A leaf match; rendered through its rule's clean template.
    Closed,
}

/// One span of the line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    span: Range<usize>,
    rules: Vec<RuleId>,
    role: SegmentRole,
    target: Option<String>,
}

impl Segment {
    fn new(span: Range<usize>, rules: Vec<RuleId>, role: SegmentRole) -> Self {
        Self {
            span,
            rules,
            role,
            target: None,
        }
    }

    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }

    /// Rules that matched this span, outermost first.
    pub fn rules(&self) -> &[RuleId] {
        &self.rules
    }

    pub const fn role(&self) -> SegmentRole {
        self.role
    }

    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }
}

/// Borrowed view of a segment's source text and rule stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextSegment<'a> {
    pub raw: &'a str,
    pub applied_rules: &'a [RuleId],
    pub role: SegmentRole,
}

/// A line and the segments that partition it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentedLine<'a> {
    line: &'a str,
    segments: Vec<Segment>,
}

impl<'a> SegmentedLine<'a> {
    pub const fn line(&self) -> &'a str {
        self.line
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn raw(&self, segment: &Segment) -> &'a str {
        &self.line[segment.span.clone()]
    }

    pub fn text_segments(&self) -> impl Iterator<Item = TextSegment<'_>> {
        self.segments.iter().map(|segment| TextSegment {
            raw: self.raw(segment),
            applied_rules: &segment.rules,
            role: segment.role,
        })
    }

    /// Concatenation of every segment's source text.
    pub fn reconstruct(&self) -> String {
        self.text_segments().map(|segment| segment.raw).collect()
    }
}

/// Partition `line` by applying every inline rule of `table` in order.
pub fn split<'a>(line: &'a str, table: &RuleTable) -> SegmentedLine<'a> {
    let mut segments = Vec::new();
    push_span(&mut segments, 0..line.len(), Vec::new(), SegmentRole::Text);

    for rule in table.inline_rules() {
        let mut next = Vec::with_capacity(segments.len());
        for segment in segments {
            if segment.role == SegmentRole::Text {
                split_segment(line, segment, rule, &mut next);
            } else {
                next.push(segment);
            }
        }
        segments = next;
    }

    SegmentedLine { line, segments }
}

fn split_segment(line: &str, segment: Segment, rule: &Rule, out: &mut Vec<Segment>) {
    let found = rule.find_in(line, segment.span.clone());
    if found.is_empty() {
        out.push(segment);
        return;
    }

    let mut cursor = segment.span.start;
    for m in found {
        push_span(out, cursor..m.span.start, segment.rules.clone(), SegmentRole::Text);

        let mut rules = segment.rules.clone();
        rules.push(rule.id());
        match rule.kind() {
            RuleKind::Container => {
                push_span(out, m.span.start..m.content.start, rules.clone(), SegmentRole::Delimiter);
                push_span(out, m.content.clone(), rules.clone(), SegmentRole::Text);
                push_span(out, m.content.end..m.span.end, rules, SegmentRole::Delimiter);
            }
            RuleKind::Leaf | RuleKind::Block => {
                if !m.span.is_empty() {
                    let mut closed = Segment::new(m.span.clone(), rules, SegmentRole::Closed);
                    closed.target = m.target;
                    out.push(closed);
                }
            }
        }
        cursor = m.span.end;
    }
    push_span(out, cursor..segment.span.end, segment.rules, SegmentRole::Text);
}

fn push_span(out: &mut Vec<Segment>, span: Range<usize>, rules: Vec<RuleId>, role: SegmentRole) {
    if !span.is_empty() {
        out.push(Segment::new(span, rules, role));
    }
}
