//! Terminal output for rendered posts.
//!
//! - [`style`]: Theming and colors
//! - [`write_blocks`]: Print render blocks as ANSI-styled or plain text

pub mod style;

use std::io::{self, Write};

use crossterm::style::ContentStyle;

use crate::document::{RenderBlock, StyledText};
use crate::rules::StyleTag;
use style::{Theme, style_for_run, style_for_tag};

pub const DIVIDER_WIDTH: usize = 40;
pub const LIST_MARKER: &str = "• ";

/// How blocks are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Emit ANSI styling
    pub color: bool,
    /// Use 24-bit colors for highlight backgrounds
    pub truecolor: bool,
    pub theme: Theme,
}

impl RenderOptions {
    pub fn plain() -> Self {
        Self {
            color: false,
            truecolor: false,
            theme: Theme::default(),
        }
    }
}

/// Print `blocks` one after another.
pub fn write_blocks<W: Write>(
    out: &mut W,
    blocks: &[RenderBlock],
    options: &RenderOptions,
) -> io::Result<()> {
    for block in blocks {
        match block {
            RenderBlock::Paragraph(text) => write_text(out, text, options)?,
            RenderBlock::ListItem(text) => {
                write_piece(out, LIST_MARKER, options.theme.list_marker, options.color)?;
                write_text(out, text, options)?;
            }
            RenderBlock::Image { url, alt } => {
                let label = format!("[Image: {}] {url}", alt.as_deref().unwrap_or(url));
                let style = style_for_tag(StyleTag::Image, &options.theme);
                write_piece(out, &label, style, options.color)?;
            }
            RenderBlock::Divider => {
                let rule = "─".repeat(DIVIDER_WIDTH);
                let style = style_for_tag(StyleTag::Divider, &options.theme);
                write_piece(out, &rule, style, options.color)?;
            }
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Print styled text. Line breaks inside runs are written unstyled so
/// backgrounds do not bleed to the edge of the terminal.
pub fn write_text<W: Write>(out: &mut W, text: &StyledText, options: &RenderOptions) -> io::Result<()> {
    for run in text.runs() {
        let style = style_for_run(run, &options.theme, options.truecolor);
        for (i, part) in run.text().split('\n').enumerate() {
            if i > 0 {
                writeln!(out)?;
            }
            write_piece(out, part, style, options.color)?;
        }
    }
    Ok(())
}

fn write_piece<W: Write>(
    out: &mut W,
    text: &str,
    style: ContentStyle,
    color: bool,
) -> io::Result<()> {
    if text.is_empty() {
        return Ok(());
    }
    if color && style != ContentStyle::default() {
        write!(out, "{}", style.apply(text))
    } else {
        write!(out, "{text}")
    }
}
