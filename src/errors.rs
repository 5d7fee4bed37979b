/*!
 * Error types for subtitle parsing.
 *
 * The parser reports failures as plain values: a [`ParseErrorKind`] naming
 * what went wrong, wrapped in a [`ParseError`] that pins the failure to its
 * source block. All fields are immutable once constructed.
 */

use thiserror::Error;

/// What went wrong while parsing a single subtitle block
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// A timestamp token does not match `H+:MM:SS,mmm`
    #[error("invalid timestamp token: {0:?}")]
    TimestampFormat(String),

    /// The first line of a block is not a sequence number
    #[error("invalid sequence number: {0:?}")]
    InvalidIndex(String),

    /// The block ended before a timing line was seen
    #[error("block is missing its timing line")]
    MissingTiming,

    /// The second line of a block is not `start --> end`
    #[error("malformed timing line: {0:?}")]
    BadTiming(String),
}

/// A parse failure located in its source input.
///
/// `line_index` is the 0-based index of the blank line that terminated the
/// offending block; `block` is the block's raw text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} (line {line_index}):\n{block}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub line_index: usize,
    pub block: String,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, line_index: usize, block: String) -> Self {
        ParseError {
            kind,
            line_index,
            block,
        }
    }
}
