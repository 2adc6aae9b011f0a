//! Core document types.

use serde::Serialize;

use crate::highlight::{self, HighlightMark, HighlightRange};
use crate::rules::StyleTag;

/// A parsed and rendered markdown post.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Document {
    /// Original source text
    #[serde(skip)]
    source: String,
    /// Rendered blocks in display order
    blocks: Vec<RenderBlock>,
    /// Heading references for an outline
    headings: Vec<HeadingRef>,
    /// Image references
    images: Vec<ImageRef>,
    /// Link references
    links: Vec<LinkRef>,
}

impl Document {
    /// Create an empty document.
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn from_blocks(
        source: String,
        blocks: Vec<RenderBlock>,
        headings: Vec<HeadingRef>,
    ) -> Self {
        let images = collect_images(&blocks);
        let links = collect_links(&blocks);
        Self {
            source,
            blocks,
            headings,
            images,
            links,
        }
    }

    pub fn blocks(&self) -> &[RenderBlock] {
        &self.blocks
    }

    pub fn block(&self, index: usize) -> Option<&RenderBlock> {
        self.blocks.get(index)
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn headings(&self) -> &[HeadingRef] {
        &self.headings
    }

    pub fn images(&self) -> &[ImageRef] {
        &self.images
    }

    pub fn links(&self) -> &[LinkRef] {
        &self.links
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Index of the first block that carries text.
    pub fn first_text_block(&self) -> Option<usize> {
        self.blocks.iter().position(|block| block.styled_text().is_some())
    }

    /// Paint `ranges` over the text of block `index`.
    ///
    /// Returns `None` for blocks without text (images, dividers) or an
    /// index past the end. Offsets are character offsets into the block's
    /// rendered text.
    pub fn highlight_block(&self, index: usize, ranges: &[HighlightRange]) -> Option<StyledText> {
        let text = self.blocks.get(index)?.styled_text()?;
        Some(highlight::apply_to(text, ranges))
    }

    /// All blocks, with block `index` replaced by its highlighted text.
    pub fn blocks_with_highlights(&self, index: usize, ranges: &[HighlightRange]) -> Vec<RenderBlock> {
        let mut blocks = self.blocks.clone();
        if let Some(text) = self.highlight_block(index, ranges)
            && let Some(block) = blocks.get_mut(index)
        {
            block.replace_text(text);
        }
        blocks
    }
}

/// One rendered block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RenderBlock {
    Paragraph(StyledText),
    Image { url: String, alt: Option<String> },
    Divider,
    ListItem(StyledText),
}

impl RenderBlock {
    /// Text of paragraph and list-item blocks.
    pub const fn styled_text(&self) -> Option<&StyledText> {
        match self {
            Self::Paragraph(text) | Self::ListItem(text) => Some(text),
            Self::Image { .. } | Self::Divider => None,
        }
    }

    /// Rendered plain text, if the block has any.
    pub fn plain_text(&self) -> Option<String> {
        self.styled_text().map(StyledText::plain_text)
    }

    fn replace_text(&mut self, replacement: StyledText) {
        match self {
            Self::Paragraph(text) | Self::ListItem(text) => *text = replacement,
            Self::Image { .. } | Self::Divider => {}
        }
    }
}

/// Ordered runs of display text with their styles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StyledText {
    runs: Vec<StyledRun>,
}

impl StyledText {
    pub const fn new() -> Self {
        Self { runs: Vec::new() }
    }

    /// Unstyled text as a single run.
    pub fn plain(text: &str) -> Self {
        let mut styled = Self::new();
        styled.push(StyledRun::new(text.to_string(), vec![StyleTag::PlainText]));
        styled
    }

    /// Append a run, merging it into the last one when attributes match.
    pub fn push(&mut self, run: StyledRun) {
        if run.text.is_empty() {
            return;
        }
        if let Some(last) = self.runs.last_mut()
            && last.same_attributes(&run)
        {
            last.text.push_str(&run.text);
            return;
        }
        self.runs.push(run);
    }

    pub fn extend(&mut self, other: Self) {
        for run in other.runs {
            self.push(run);
        }
    }

    pub fn runs(&self) -> &[StyledRun] {
        &self.runs
    }

    pub fn plain_text(&self) -> String {
        self.runs.iter().map(|run| run.text.as_str()).collect()
    }

    /// Length in characters, the unit highlight offsets use.
    pub fn char_len(&self) -> usize {
        self.runs.iter().map(|run| run.text.chars().count()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}

/// A styled piece of text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StyledRun {
    text: String,
    styles: Vec<StyleTag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    highlight: Option<HighlightMark>,
}

impl StyledRun {
    pub const fn new(text: String, styles: Vec<StyleTag>) -> Self {
        Self {
            text,
            styles,
            link: None,
            highlight: None,
        }
    }

    #[must_use]
    pub fn with_link(mut self, link: Option<String>) -> Self {
        self.link = link;
        self
    }

    #[must_use]
    pub fn with_highlight(mut self, highlight: Option<HighlightMark>) -> Self {
        self.highlight = highlight;
        self
    }

    /// Same attributes, different text.
    #[must_use]
    pub fn with_text(&self, text: String) -> Self {
        Self {
            text,
            styles: self.styles.clone(),
            link: self.link.clone(),
            highlight: self.highlight.clone(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn styles(&self) -> &[StyleTag] {
        &self.styles
    }

    pub fn has_style(&self, tag: StyleTag) -> bool {
        self.styles.contains(&tag)
    }

    pub fn link(&self) -> Option<&str> {
        self.link.as_deref()
    }

    pub const fn highlight(&self) -> Option<&HighlightMark> {
        self.highlight.as_ref()
    }

    fn same_attributes(&self, other: &Self) -> bool {
        self.styles == other.styles && self.link == other.link && self.highlight == other.highlight
    }
}

/// Reference to a heading in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeadingRef {
    /// Heading level (1-4)
    pub level: u8,
    /// Heading text (plain, no formatting)
    pub text: String,
    /// Block holding the heading
    pub block: usize,
    /// Character offset of the heading within the block text
    pub offset: usize,
}

/// Reference to an image in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageRef {
    pub alt: Option<String>,
    pub src: String,
    pub block: usize,
}

/// Reference to a link in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkRef {
    /// Link text
    pub text: String,
    /// Link URL
    pub url: String,
    /// Block holding the link
    pub block: usize,
}

fn collect_images(blocks: &[RenderBlock]) -> Vec<ImageRef> {
    blocks
        .iter()
        .enumerate()
        .filter_map(|(block, rendered)| match rendered {
            RenderBlock::Image { url, alt } => Some(ImageRef {
                alt: alt.clone(),
                src: url.clone(),
                block,
            }),
            _ => None,
        })
        .collect()
}

fn collect_links(blocks: &[RenderBlock]) -> Vec<LinkRef> {
    let mut links = Vec::new();
    for (block, rendered) in blocks.iter().enumerate() {
        let Some(text) = rendered.styled_text() else {
            continue;
        };
        for run in text.runs() {
            if !run.styles().iter().any(|tag| tag.is_link()) {
                continue;
            }
            if let Some(url) = run.link() {
                links.push(LinkRef {
                    text: run.text().to_string(),
                    url: url.to_string(),
                    block,
                });
            }
        }
    }
    links
}
