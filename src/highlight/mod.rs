//! User highlights painted over rendered text.
//!
//! A highlight is a persisted `(start, length, color, note)` span over the
//! rendered, marker-stripped text of one block. Offsets count Unicode
//! scalar values. The overlay only ever adds a background: inline styles
//! and link targets under a highlight are left as they are.
//!
//! A range that no longer fits the text (the post was edited after the
//! highlight was saved) is skipped. It is never clamped or re-anchored.

use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::document::{StyledRun, StyledText};
use crate::error::ColorParseError;

/// RGBA color of a highlight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Blend over an opaque background, for surfaces without alpha.
    #[allow(clippy::cast_possible_truncation)]
    pub fn composite_over(self, background: (u8, u8, u8)) -> (u8, u8, u8) {
        let alpha = u16::from(self.a);
        // (c * a + bg * (255 - a)) / 255 stays within 0..=255
        let mix = |fg: u8, bg: u8| -> u8 {
            ((u16::from(fg) * alpha + u16::from(bg) * (255 - alpha) + 127) / 255) as u8
        };
        (
            mix(self.r, background.0),
            mix(self.g, background.1),
            mix(self.b, background.2),
        )
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
    }
}

impl FromStr for Rgba {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .trim()
            .strip_prefix('#')
            .ok_or_else(|| ColorParseError::MissingHash(s.to_string()))?;
        if !hex.is_ascii() {
            return Err(ColorParseError::BadDigits(s.to_string()));
        }
        if hex.len() != 6 && hex.len() != 8 {
            return Err(ColorParseError::BadLength(hex.len()));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|_| ColorParseError::BadDigits(s.to_string()))
        };
        let alpha = if hex.len() == 8 { channel(6)? } else { 255 };
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?, alpha))
    }
}

/// A persisted highlight record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightRange {
    pub post_id: String,
    pub start: i64,
    pub length: i64,
    pub color: Rgba,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl HighlightRange {
    /// Character range this highlight covers in a text of `text_len`
    /// characters, or `None` when it does not fit.
    pub fn char_range(&self, text_len: usize) -> Option<Range<usize>> {
        if self.start < 0 || self.length <= 0 {
            return None;
        }
        let start = usize::try_from(self.start).ok()?;
        let length = usize::try_from(self.length).ok()?;
        let end = start.checked_add(length)?;
        (end <= text_len).then_some(start..end)
    }

    fn mark(&self) -> HighlightMark {
        HighlightMark {
            color: self.color,
            note: self.note.clone(),
        }
    }
}

/// Background attribute a highlight leaves on a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HighlightMark {
    pub color: Rgba,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Highlights belonging to one post.
pub fn highlights_for_post(post_id: &str, ranges: &[HighlightRange]) -> Vec<HighlightRange> {
    ranges
        .iter()
        .filter(|range| range.post_id == post_id)
        .cloned()
        .collect()
}

/// Decode highlight records exchanged as a JSON array.
pub fn parse_highlights(json: &str) -> serde_json::Result<Vec<HighlightRange>> {
    serde_json::from_str(json)
}

/// Paint `ranges` over unstyled rendered text.
pub fn apply(rendered_text: &str, ranges: &[HighlightRange]) -> StyledText {
    apply_to(&StyledText::plain(rendered_text), ranges)
}

/// Paint `ranges` over styled text, keeping every existing attribute.
///
/// Where ranges overlap, the later one in `ranges` wins.
pub fn apply_to(text: &StyledText, ranges: &[HighlightRange]) -> StyledText {
    let len = text.char_len();
    let marks: Vec<(Range<usize>, HighlightMark)> = ranges
        .iter()
        .filter_map(|range| {
            let Some(span) = range.char_range(len) else {
                debug!(
                    post_id = %range.post_id,
                    start = range.start,
                    length = range.length,
                    text_len = len,
                    "skipping highlight outside rendered text"
                );
                return None;
            };
            Some((span, range.mark()))
        })
        .collect();
    if marks.is_empty() {
        return text.clone();
    }

    let mut owner: Vec<Option<usize>> = vec![None; len];
    for (index, (span, _)) in marks.iter().enumerate() {
        for slot in &mut owner[span.clone()] {
            *slot = Some(index);
        }
    }

    let mut out = StyledText::new();
    let mut pos = 0;
    for run in text.runs() {
        let mut piece = String::new();
        let mut current = owner.get(pos).copied().flatten();
        for ch in run.text().chars() {
            let at = owner.get(pos).copied().flatten();
            if at != current && !piece.is_empty() {
                out.push(painted(run, std::mem::take(&mut piece), current, &marks));
            }
            current = at;
            piece.push(ch);
            pos += 1;
        }
        out.push(painted(run, piece, current, &marks));
    }
    out
}

fn painted(
    run: &StyledRun,
    text: String,
    owner: Option<usize>,
    marks: &[(Range<usize>, HighlightMark)],
) -> StyledRun {
    let mark = owner
        .and_then(|index| marks.get(index))
        .map(|(_, mark)| mark.clone())
        .or_else(|| run.highlight().cloned());
    run.with_text(text).with_highlight(mark)
}
