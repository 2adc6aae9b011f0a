//! Theming and color definitions.
//!
//! Maps style tags and highlight marks onto terminal styles. Each
//! [`StyleTag`] has exactly one transform in [`style_for_tag`]; a run's
//! style is the fold of its tags, with the highlight background layered on
//! a separate channel.

use crossterm::style::{Attribute, Attributes, Color, ContentStyle};

use crate::document::StyledRun;
use crate::rules::StyleTag;

/// Terminal background brightness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackgroundMode {
    Dark,
    Light,
}

/// Guess the background from `COLORFGBG` (`"fg;bg"`), defaulting to dark.
pub fn background_mode_from_colorfgbg(colorfgbg: Option<&str>) -> BackgroundMode {
    let Some(value) = colorfgbg else {
        return BackgroundMode::Dark;
    };
    let bg_str = value.rsplit(';').next().unwrap_or(value);
    let Ok(bg) = bg_str.parse::<u8>() else {
        return BackgroundMode::Dark;
    };

    if bg >= 7 {
        BackgroundMode::Light
    } else {
        BackgroundMode::Dark
    }
}

/// Theme configuration for rendered posts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    /// Heading level 1 style
    pub h1: ContentStyle,
    /// Heading level 2 style
    pub h2: ContentStyle,
    /// Heading level 3 style
    pub h3: ContentStyle,
    /// Heading level 4 style
    pub h4: ContentStyle,
    /// Inline code and fenced code style
    pub code: ContentStyle,
    /// Block quote style
    pub quote: ContentStyle,
    /// Explicit link style
    pub link: ContentStyle,
    /// Bare and angle-bracket URL style
    pub url: ContentStyle,
    /// Emphasis (italic) style
    pub emphasis: ContentStyle,
    /// Strong (bold) style
    pub strong: ContentStyle,
    /// List bullet style
    pub list_marker: ContentStyle,
    /// Image placeholder style
    pub image: ContentStyle,
    /// Divider style
    pub divider: ContentStyle,
    /// Color highlights are blended over
    pub background: (u8, u8, u8),
}

fn styled(fg: Option<Color>, attributes: &[Attribute]) -> ContentStyle {
    let mut style = ContentStyle {
        foreground_color: fg,
        ..ContentStyle::default()
    };
    for attribute in attributes {
        style.attributes.set(*attribute);
    }
    style
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            h1: styled(Some(Color::Cyan), &[Attribute::Bold, Attribute::Underlined]),
            h2: styled(Some(Color::Green), &[Attribute::Bold]),
            h3: styled(Some(Color::Yellow), &[Attribute::Bold]),
            h4: styled(Some(Color::Blue), &[Attribute::Bold]),
            code: styled(Some(Color::Red), &[Attribute::Bold]),
            quote: styled(Some(Color::Blue), &[Attribute::Italic]),
            link: styled(Some(Color::Blue), &[Attribute::Underlined]),
            url: styled(Some(Color::Cyan), &[Attribute::Underlined]),
            emphasis: styled(None, &[Attribute::Italic]),
            strong: styled(None, &[Attribute::Bold]),
            list_marker: styled(Some(Color::Yellow), &[]),
            image: styled(Some(Color::Magenta), &[Attribute::Italic]),
            divider: styled(Some(Color::AnsiValue(240)), &[Attribute::Dim]),
            background: (24, 24, 24),
        }
    }
}

impl Theme {
    /// Create a theme optimized for dark terminals.
    pub fn dark() -> Self {
        Self::default()
    }

    /// Create a theme optimized for light terminals.
    pub fn light() -> Self {
        Self {
            h1: styled(Some(Color::AnsiValue(31)), &[Attribute::Bold, Attribute::Underlined]),
            h2: styled(Some(Color::AnsiValue(28)), &[Attribute::Bold]),
            h3: styled(Some(Color::AnsiValue(136)), &[Attribute::Bold]),
            h4: styled(Some(Color::AnsiValue(25)), &[Attribute::Bold]),
            code: styled(Some(Color::AnsiValue(124)), &[Attribute::Bold]),
            quote: styled(Some(Color::AnsiValue(25)), &[Attribute::Italic]),
            link: styled(Some(Color::AnsiValue(25)), &[Attribute::Underlined]),
            url: styled(Some(Color::AnsiValue(31)), &[Attribute::Underlined]),
            emphasis: styled(None, &[Attribute::Italic]),
            strong: styled(None, &[Attribute::Bold]),
            list_marker: styled(Some(Color::AnsiValue(136)), &[]),
            image: styled(Some(Color::AnsiValue(133)), &[Attribute::Italic]),
            divider: styled(Some(Color::AnsiValue(245)), &[]),
            background: (255, 255, 255),
        }
    }

    pub fn for_background(mode: BackgroundMode) -> Self {
        match mode {
            BackgroundMode::Dark => Self::dark(),
            BackgroundMode::Light => Self::light(),
        }
    }
}

/// The style contributed by one tag.
pub fn style_for_tag(tag: StyleTag, theme: &Theme) -> ContentStyle {
    match tag {
        StyleTag::Header1 => theme.h1,
        StyleTag::Header2 => theme.h2,
        StyleTag::Header3 => theme.h3,
        StyleTag::Header4 => theme.h4,
        StyleTag::Bold => theme.strong,
        StyleTag::Italic => theme.emphasis,
        StyleTag::InlineCode => theme.code,
        StyleTag::Link => theme.link,
        StyleTag::Autolink | StyleTag::AngleHyperlink => theme.url,
        StyleTag::Quote => theme.quote,
        StyleTag::Image => theme.image,
        StyleTag::Divider => theme.divider,
        StyleTag::ListItem | StyleTag::PlainText => ContentStyle::default(),
    }
}

/// Layer `overlay` onto `base`: colors are replaced when set, attributes
/// accumulate.
pub fn merge(base: ContentStyle, overlay: ContentStyle) -> ContentStyle {
    let mut attributes: Attributes = base.attributes;
    attributes.extend(overlay.attributes);
    ContentStyle {
        foreground_color: overlay.foreground_color.or(base.foreground_color),
        background_color: overlay.background_color.or(base.background_color),
        underline_color: overlay.underline_color.or(base.underline_color),
        attributes,
    }
}

/// Terminal style for a rendered run, highlight included.
pub fn style_for_run(run: &StyledRun, theme: &Theme, truecolor: bool) -> ContentStyle {
    let mut style = run
        .styles()
        .iter()
        .fold(ContentStyle::default(), |acc, tag| {
            merge(acc, style_for_tag(*tag, theme))
        });

    if let Some(mark) = run.highlight() {
        let (r, g, b) = mark.color.composite_over(theme.background);
        style.background_color = Some(color_for_terminal(r, g, b, truecolor));
        if style.foreground_color.is_none() {
            style.foreground_color = Some(if is_light(r, g, b) {
                Color::Black
            } else {
                Color::White
            });
        }
    }

    style
}

fn is_light(r: u8, g: u8, b: u8) -> bool {
    let luma = 0.0722f32.mul_add(
        f32::from(b),
        0.2126f32.mul_add(f32::from(r), 0.7152 * f32::from(g)),
    );
    luma >= 140.0
}

fn color_for_terminal(r: u8, g: u8, b: u8, truecolor: bool) -> Color {
    if truecolor {
        Color::Rgb { r, g, b }
    } else {
        Color::AnsiValue(rgb_to_xterm_256(r, g, b))
    }
}

/// Whether the terminal accepts 24-bit color.
pub fn supports_truecolor() -> bool {
    if let Ok(force) = std::env::var("POSTMARK_TRUECOLOR") {
        let value = force.to_ascii_lowercase();
        return matches!(value.as_str(), "1" | "true" | "yes" | "on");
    }
    supports_truecolor_from_env(
        std::env::var("COLORTERM").ok().as_deref(),
        std::env::var("TERM").ok().as_deref(),
    )
}

fn supports_truecolor_from_env(colorterm: Option<&str>, term: Option<&str>) -> bool {
    if let Some(ct) = colorterm {
        let lower = ct.to_ascii_lowercase();
        if lower.contains("truecolor") || lower.contains("24bit") {
            return true;
        }
    }
    if let Some(t) = term {
        let lower = t.to_ascii_lowercase();
        if lower.contains("direct") || lower.contains("truecolor") {
            return true;
        }
    }
    false
}

fn rgb_to_xterm_256(r: u8, g: u8, b: u8) -> u8 {
    // Result is always 0-5, fits in u8
    #[allow(clippy::cast_possible_truncation)]
    let to_cube = |v: u8| ((u16::from(v) * 5) / 255) as u8;
    let ri = to_cube(r);
    let gi = to_cube(g);
    let bi = to_cube(b);
    16 + (36 * ri) + (6 * gi) + bi
}
