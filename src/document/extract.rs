//! Image and link payload extraction.
//!
//! Authors sometimes wrap an image URL onto the next line (`![alt](\n url)`).
//! [`repair_split_images`] joins those back together once over the whole
//! document before it is split into lines.

use std::borrow::Cow;
use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use crate::rules::{RuleId, RuleTable};

static SPLIT_IMAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?P<head>!\[[^\]\n]*\]\()[ \t]*\r?\n[ \t]*(?P<url>[^)\s][^)\n]*\))")
        .expect("split image pattern must compile")
});

/// Collapse `![alt](` followed by a line break and `url)` on the next line
/// into a single-line image. Anything else after the break is left alone.
pub fn repair_split_images(source: &str) -> Cow<'_, str> {
    SPLIT_IMAGE.replace_all(source, "${head}${url}")
}

/// Normalize a captured link or image destination.
///
/// A destination in angle brackets is taken verbatim. Otherwise the value
/// is trimmed and cut at the first whitespace run, which drops a trailing
/// `"title"`. An empty result is no destination at all.
pub fn clean_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if let Some(inner) = trimmed.strip_prefix('<')
        && let Some(end) = inner.find('>')
    {
        let url = inner[..end].trim();
        return (!url.is_empty()).then(|| url.to_string());
    }
    trimmed.split_whitespace().next().map(ToString::to_string)
}

/// An image found on a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageMatch {
    /// Byte range of the whole `![alt](url)` on the line
    pub span: Range<usize>,
    pub alt: Option<String>,
    pub url: String,
}

/// Every image on `line` whose destination is usable, in order.
pub fn extract_images(line: &str, table: &RuleTable) -> Vec<ImageMatch> {
    let Some(rule) = table.get(RuleId::Image) else {
        return Vec::new();
    };
    rule.find_matches(line)
        .into_iter()
        .filter_map(|m| {
            let url = m.target?;
            let alt = line[m.content.clone()].trim();
            Some(ImageMatch {
                span: m.span,
                alt: (!alt.is_empty()).then(|| alt.to_string()),
                url,
            })
        })
        .collect()
}

/// The first usable image on `line`.
pub fn extract_image(line: &str, table: &RuleTable) -> Option<ImageMatch> {
    extract_images(line, table).into_iter().next()
}
