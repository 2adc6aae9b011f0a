// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. rules::RuleTable)
    clippy::module_name_repetitions
)]

//! # Postmark
//!
//! Rule-based markdown rendering for user-authored posts, with persisted
//! highlights painted over the rendered text.
//!
//! Postmark turns a loosely formatted markdown string into an ordered list
//! of typed blocks (paragraphs, list items, images, dividers) whose text is
//! split into styled runs with the markup removed. Highlights are colored
//! character spans over that rendered text and are layered on as a
//! background without touching the inline styling.
//!
//! ## Pipeline
//!
//! 1. Repair image markup wrapped across lines
//! 2. Classify each line (fence, spacer, header, image, divider, list, text)
//! 3. Split inline text against the ordered rule table
//! 4. Assemble blocks, merging adjacent paragraphs
//! 5. On request, overlay highlights onto one block's text
//!
//! ## Modules
//!
//! - [`rules`]: Rule table, inline splitter, segment rendering
//! - [`document`]: Line classification, image extraction, block assembly
//! - [`highlight`]: Highlight records and the background overlay
//! - [`ui`]: Terminal styling and output
//! - [`config`]: Saved defaults for the command line tool

pub mod config;
pub mod document;
pub mod error;
pub mod highlight;
pub mod rules;
pub mod ui;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::document::{Document, RenderBlock, StyledRun, StyledText};
    pub use crate::highlight::{HighlightRange, Rgba};
    pub use crate::rules::{RuleTable, StyleTag};
}
