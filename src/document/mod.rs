//! Markdown document parsing and rendering.
//!
//! This module handles:
//! - Repairing image markup split across lines
//! - Classifying each line into a block kind
//! - Assembling classified lines into render blocks

mod extract;
mod parser;
mod types;

pub use extract::{ImageMatch, clean_url, extract_image, extract_images, repair_split_images};
pub use parser::{parse, parse_with_rules};
pub use types::{Document, HeadingRef, ImageRef, LinkRef, RenderBlock, StyledRun, StyledText};
