//! Line classification and block assembly.

use tracing::{debug, trace};

use super::extract::{extract_images, repair_split_images};
use super::types::{Document, HeadingRef, RenderBlock, StyledRun, StyledText};
use crate::rules::{RuleId, RuleTable, StyleTag, render, split};

impl Document {
    /// Parse a markdown post with the built-in rule table.
    ///
    /// # Example
    ///
    /// ```
    /// use postmark::document::{Document, RenderBlock};
    ///
    /// let doc = Document::parse("Hello **world**\n\n---");
    /// assert_eq!(doc.block_count(), 2);
    /// assert_eq!(doc.blocks()[1], RenderBlock::Divider);
    /// ```
    pub fn parse(source: &str) -> Self {
        parse(source)
    }

    pub fn parse_with_rules(source: &str, table: &RuleTable) -> Self {
        parse_with_rules(source, table)
    }
}

/// Parse markdown source into a Document.
pub fn parse(source: &str) -> Document {
    parse_with_rules(source, RuleTable::standard())
}

/// Parse markdown source into a Document using `table`.
///
/// Never fails: malformed markup degrades to plain text.
pub fn parse_with_rules(source: &str, table: &RuleTable) -> Document {
    let repaired = repair_split_images(source);
    let mut classifier = Classifier::new(table);
    let classified: Vec<Classified> = repaired
        .lines()
        .flat_map(|line| classifier.classify(line))
        .collect();
    if classifier.in_fence {
        debug!("document ended inside an open code fence");
    }
    let (blocks, headings) = assemble(classified);
    Document::from_blocks(source.to_string(), blocks, headings)
}

/// A classified line, before adjacent paragraphs are merged.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Classified {
    Paragraph { text: StyledText, heading: Option<u8> },
    ListItem(StyledText),
    Image { url: String, alt: Option<String> },
    Divider,
}

impl Classified {
    const fn paragraph(text: StyledText) -> Self {
        Self::Paragraph { text, heading: None }
    }
}

/// Per-parse line classifier. The fence flag is the only state carried
/// between lines.
struct Classifier<'t> {
    table: &'t RuleTable,
    in_fence: bool,
}

impl<'t> Classifier<'t> {
    const fn new(table: &'t RuleTable) -> Self {
        Self {
            table,
            in_fence: false,
        }
    }

    fn classify(&mut self, line: &str) -> Vec<Classified> {
        let trimmed = line.trim();

        if self.in_fence {
            if trimmed.starts_with("```") {
                trace!("closing code fence");
                self.in_fence = false;
                return Vec::new();
            }
            let code = StyledRun::new(line.to_string(), vec![StyleTag::InlineCode]);
            let mut text = StyledText::new();
            text.push(code);
            return vec![Classified::paragraph(text)];
        }

        if trimmed.starts_with("```") {
            trace!("opening code fence");
            self.in_fence = true;
            return Vec::new();
        }

        if trimmed.is_empty() {
            return vec![Classified::paragraph(StyledText::new())];
        }

        if trimmed.starts_with("<!--") {
            return Vec::new();
        }

        let line = line.trim_start();

        if line.starts_with('#') {
            return vec![self.header(line)];
        }

        if line.starts_with("![") {
            if let Some(blocks) = self.images(line) {
                return blocks;
            }
            debug!(line, "image line has no usable destination, rendering as text");
            return vec![Classified::paragraph(self.inline(line))];
        }

        if self.is_divider(trimmed) {
            return vec![Classified::Divider];
        }

        if line.starts_with("- ") {
            return vec![Classified::ListItem(self.inline(line))];
        }

        if line.contains("![")
            && let Some(blocks) = self.images(line)
        {
            return blocks;
        }

        vec![Classified::paragraph(self.inline(line))]
    }

    fn inline(&self, line: &str) -> StyledText {
        render(&split(line, self.table), self.table)
    }

    fn header(&self, line: &str) -> Classified {
        let segmented = split(line, self.table);
        let heading = segmented.segments().first().and_then(|segment| {
            segment
                .rules()
                .first()
                .and_then(|id| self.table.style_of(*id).header_level())
        });
        Classified::Paragraph {
            text: render(&segmented, self.table),
            heading,
        }
    }

    fn is_divider(&self, trimmed: &str) -> bool {
        self.table
            .get(RuleId::Divider)
            .is_some_and(|rule| rule.pattern().is_match(trimmed))
    }

    /// Images on a paragraph line, with any text around them.
    fn images(&self, line: &str) -> Option<Vec<Classified>> {
        let images = extract_images(line, self.table);
        if images.is_empty() {
            return None;
        }
        let mut blocks = Vec::new();
        let mut cursor = 0;
        for image in images {
            self.push_gap(&line[cursor..image.span.start], &mut blocks);
            blocks.push(Classified::Image {
                url: image.url,
                alt: image.alt,
            });
            cursor = image.span.end;
        }
        self.push_gap(&line[cursor..], &mut blocks);
        Some(blocks)
    }

    fn push_gap(&self, gap: &str, blocks: &mut Vec<Classified>) {
        let gap = gap.trim();
        if !gap.is_empty() {
            blocks.push(Classified::paragraph(self.inline(gap)));
        }
    }
}

/// Merge adjacent paragraphs into one block joined by newlines.
fn assemble(classified: Vec<Classified>) -> (Vec<RenderBlock>, Vec<HeadingRef>) {
    let mut blocks = Vec::new();
    let mut headings = Vec::new();
    let mut paragraph: Option<StyledText> = None;

    for item in classified {
        match item {
            Classified::Paragraph { text, heading } => {
                if let Some(current) = paragraph.as_mut() {
                    current.push(StyledRun::new("\n".to_string(), vec![StyleTag::PlainText]));
                }
                let current = paragraph.get_or_insert_with(StyledText::new);
                if let Some(level) = heading {
                    headings.push(HeadingRef {
                        level,
                        text: text.plain_text(),
                        block: blocks.len(),
                        offset: current.char_len(),
                    });
                }
                current.extend(text);
            }
            Classified::ListItem(text) => {
                flush(&mut paragraph, &mut blocks);
                blocks.push(RenderBlock::ListItem(text));
            }
            Classified::Image { url, alt } => {
                flush(&mut paragraph, &mut blocks);
                blocks.push(RenderBlock::Image { url, alt });
            }
            Classified::Divider => {
                flush(&mut paragraph, &mut blocks);
                blocks.push(RenderBlock::Divider);
            }
        }
    }
    flush(&mut paragraph, &mut blocks);
    (blocks, headings)
}

fn flush(paragraph: &mut Option<StyledText>, blocks: &mut Vec<RenderBlock>) {
    if let Some(text) = paragraph.take() {
        blocks.push(RenderBlock::Paragraph(text));
    }
}
