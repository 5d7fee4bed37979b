/*!
 * # subalign - SRT parsing and two-track subtitle alignment
 *
 * A Rust library for parsing, manipulating and serializing SRT subtitle
 * files, and for aligning two independently-timed language tracks of the
 * same media into a single merged track keyed by overlapping time windows.
 *
 * ## Features
 *
 * - Streaming, single-pass SRT block parser with selectable handling of
 *   malformed blocks (drop, log, or abort)
 * - Millisecond-exact timestamp model with offset and ratio shifting
 * - Collection operations: time-window slicing, visible-at queries, global
 *   shifting, sort-and-renumber normalization
 * - Tolerance-based temporal alignment of two language tracks with
 *   many-to-one and one-to-many grouping
 * - Per-language corpus fan-out over aligned collections
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `timestamp`: the millisecond timestamp value type and shift arithmetic
 * - `subtitle_processor`: subtitle entries, the streaming parser, the
 *   serializer and the collection operations
 * - `aligner`: the two-pointer temporal merge of two language tracks
 * - `language_utils`: ISO language code utilities
 * - `file_utils`: file open/save and corpus-writing boundary helpers
 * - `errors`: parse error types
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]

// Public modules
pub mod aligner;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod subtitle_processor;
pub mod timestamp;

// Re-export main types for easier usage
pub use aligner::{ALIGN_TOLERANCE_MS, align, merge_lang_maps};
pub use errors::{ParseError, ParseErrorKind};
pub use subtitle_processor::{
    ErrorHandling, SliceBounds, SubtitleCollection, SubtitleEntry, SubtitleStream,
};
pub use timestamp::{TimeOffset, Timestamp};
