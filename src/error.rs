//! Error types.
//!
//! Markdown input never produces an error. The only failures in the library
//! are a bad rule pattern (a programming error surfaced at table
//! construction) and a malformed color literal.

use thiserror::Error;

use crate::rules::RuleId;

/// Failure while building a [`RuleTable`](crate::rules::RuleTable).
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("invalid pattern for rule {rule:?}: {source}")]
    InvalidPattern {
        rule: RuleId,
        #[source]
        source: regex::Error,
    },
    #[error("rule {rule:?} is declared more than once")]
    DuplicateRule { rule: RuleId },
}

/// Failure while parsing an `#RRGGBB` / `#RRGGBBAA` color literal.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ColorParseError {
    #[error("color must start with '#': {0:?}")]
    MissingHash(String),
    #[error("color must have 6 or 8 hex digits, got {0}")]
    BadLength(usize),
    #[error("invalid hex digits in color: {0:?}")]
    BadDigits(String),
}
