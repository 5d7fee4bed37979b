use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::io;
use std::io::Write;
use std::rc::Rc;

use log::warn;

use crate::errors::{ParseError, ParseErrorKind};
use crate::timestamp::{TimeOffset, Timestamp};

// @module: Subtitle parsing, serialization and collection operations

// @const: Separator between start and end time on a timing line
const TIMING_ARROW: &str = "-->";

/// Platform-neutral fallback when the input's line endings cannot be detected
#[cfg(windows)]
pub const DEFAULT_EOL: &str = "\r\n";
#[cfg(not(windows))]
pub const DEFAULT_EOL: &str = "\n";

// @struct: Single subtitle entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleEntry {
    // @field: 1-based display index; only reassigned by normalize
    pub index: usize,

    // @field: Start time
    pub start: Timestamp,

    // @field: End time (not validated against start; malformed input passes through)
    pub end: Timestamp,

    // @field: Display text, newline-joined
    pub text: String,

    // @field: Language tag -> text, populated by set_language and the aligner
    pub lang_map: BTreeMap<String, String>,
}

impl SubtitleEntry {
    /// Creates a new subtitle entry with an empty language map
    pub fn new(index: usize, start: Timestamp, end: Timestamp, text: String) -> Self {
        SubtitleEntry {
            index,
            start,
            end,
            text,
            lang_map: BTreeMap::new(),
        }
    }

    /// Parse one blank-line-delimited block: sequence number, timing line,
    /// then zero or more text lines joined with `\n`.
    pub fn from_block(block: &[String]) -> Result<Self, ParseErrorKind> {
        let index_line = block.first().ok_or(ParseErrorKind::MissingTiming)?;
        let index: usize = index_line
            .trim()
            .parse()
            .map_err(|_| ParseErrorKind::InvalidIndex(index_line.trim().to_string()))?;

        let timing_line = block.get(1).ok_or(ParseErrorKind::MissingTiming)?;
        let (start_token, end_token) = timing_line
            .split_once(TIMING_ARROW)
            .ok_or_else(|| ParseErrorKind::BadTiming(timing_line.trim().to_string()))?;

        let start = Timestamp::parse(start_token.trim())?;
        let end = Timestamp::parse(end_token.trim())?;

        Ok(SubtitleEntry::new(index, start, end, block[2..].join("\n")))
    }
}

impl fmt::Display for SubtitleEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.index)?;
        writeln!(f, "{} --> {}", self.start, self.end)?;
        writeln!(f, "{}", self.text)
    }
}

/// What to do with a block that fails to parse
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorHandling {
    /// Drop the block silently and keep parsing
    #[default]
    Pass,
    /// Drop the block, emit one `log::warn!` diagnostic, keep parsing
    Log,
    /// Yield the error and terminate the stream
    Raise,
}

/// Lazy single-pass parser over a stream of text lines.
///
/// Entries are yielded as soon as their terminating blank line is seen; a
/// synthetic trailing blank flushes the final block. The stream cannot be
/// restarted: once exhausted (or aborted under [`ErrorHandling::Raise`]) it
/// only returns `None`.
pub struct SubtitleStream<I> {
    lines: I,
    handling: ErrorHandling,
    buffer: Vec<String>,
    line_index: usize,
    tail_flushed: bool,
    done: bool,
}

impl<I: Iterator<Item = String>> SubtitleStream<I> {
    pub fn new(lines: I, handling: ErrorHandling) -> Self {
        SubtitleStream {
            lines,
            handling,
            buffer: Vec::new(),
            line_index: 0,
            tail_flushed: false,
            done: false,
        }
    }

    /// Treat the accumulated lines as one block. Returns `None` when the
    /// buffer was empty or the failed block was dropped by the policy.
    fn flush(&mut self) -> Option<Result<SubtitleEntry, ParseError>> {
        let block = std::mem::take(&mut self.buffer);
        if block.is_empty() {
            return None;
        }

        match SubtitleEntry::from_block(&block) {
            Ok(entry) => Some(Ok(entry)),
            Err(kind) => {
                let error = ParseError::new(kind, self.line_index, block.join("\n"));
                match self.handling {
                    ErrorHandling::Pass => None,
                    ErrorHandling::Log => {
                        warn!("skipping malformed subtitle block: {}", error);
                        None
                    }
                    ErrorHandling::Raise => {
                        self.done = true;
                        Some(Err(error))
                    }
                }
            }
        }
    }
}

impl<I: Iterator<Item = String>> Iterator for SubtitleStream<I> {
    type Item = Result<SubtitleEntry, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            match self.lines.next() {
                Some(line) => {
                    if line.trim().is_empty() {
                        // Flush before counting the blank line so errors carry
                        // the 0-based index of the block's terminating blank
                        let flushed = self.flush();
                        self.line_index += 1;
                        if flushed.is_some() {
                            return flushed;
                        }
                    } else {
                        self.buffer.push(line);
                        self.line_index += 1;
                    }
                }
                None => {
                    if self.tail_flushed {
                        return None;
                    }
                    self.tail_flushed = true;
                    return self.flush();
                }
            }
        }
    }
}

/// Detect the end-of-line convention from the first line terminator in the
/// input, checking `\r\n`, `\r`, `\n` in that priority order.
pub fn guess_eol(content: &str) -> &'static str {
    match content.find(['\r', '\n']) {
        Some(i) if content[i..].starts_with("\r\n") => "\r\n",
        Some(i) if content[i..].starts_with('\r') => "\r",
        Some(_) => "\n",
        None => DEFAULT_EOL,
    }
}

/// Shared handle to a subtitle entry.
///
/// Collections hand out clones of these handles from `slice`/`at`, so
/// mutating an entry obtained through a slice mutates the original.
pub type SharedEntry = Rc<RefCell<SubtitleEntry>>;

/// Optional time bounds for [`SubtitleCollection::slice`]; all comparisons
/// are strict and the supplied bounds are conjoined.
#[derive(Debug, Clone, Copy, Default)]
pub struct SliceBounds {
    pub starts_before: Option<Timestamp>,
    pub starts_after: Option<Timestamp>,
    pub ends_before: Option<Timestamp>,
    pub ends_after: Option<Timestamp>,
}

/// Ordered collection of subtitle entries with an end-of-line convention and
/// per-language statistics.
///
/// Order is the display order and is only sorted by time once [`normalize`]
/// runs. Entry handles are shared with collections returned by `slice`/`at`.
///
/// [`normalize`]: SubtitleCollection::normalize
#[derive(Debug, Clone)]
pub struct SubtitleCollection {
    /// Entries in display order
    pub entries: Vec<SharedEntry>,

    /// End-of-line convention used at serialization
    pub eol: String,

    /// Language tag -> number of entries carrying it
    pub lang_stat: HashMap<String, usize>,

    /// Dominant languages: tags carried by more than a tenth of the entries
    pub langs: Vec<String>,
}

impl Default for SubtitleCollection {
    fn default() -> Self {
        Self::new()
    }
}

impl SubtitleCollection {
    /// Create an empty collection with the platform default eol
    pub fn new() -> Self {
        SubtitleCollection {
            entries: Vec::new(),
            eol: DEFAULT_EOL.to_string(),
            lang_stat: HashMap::new(),
            langs: Vec::new(),
        }
    }

    /// Parse SRT content into a collection, detecting its eol convention.
    ///
    /// Only [`ErrorHandling::Raise`] produces an error; the other policies
    /// drop malformed blocks and return the surviving entries.
    pub fn from_string(content: &str, handling: ErrorHandling) -> Result<Self, ParseError> {
        let mut collection = SubtitleCollection::new();
        let eol = guess_eol(content);
        collection.eol = eol.to_string();

        // str::lines copes with \n and \r\n; classic Mac endings need an
        // explicit split
        let lines: Box<dyn Iterator<Item = String> + '_> = if eol == "\r" {
            Box::new(content.split('\r').map(str::to_string))
        } else {
            Box::new(content.lines().map(str::to_string))
        };

        for parsed in SubtitleStream::new(lines, handling) {
            collection.push(parsed?);
        }
        Ok(collection)
    }

    /// Append an entry, wrapping it in a fresh shared handle
    pub fn push(&mut self, entry: SubtitleEntry) {
        self.entries.push(Rc::new(RefCell::new(entry)));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Reduce the collection to entries satisfying all supplied bounds.
    ///
    /// The returned collection still references the original entries, so
    /// shifting it alters the entries of this collection too.
    pub fn slice(&self, bounds: SliceBounds) -> SubtitleCollection {
        let entries = self
            .entries
            .iter()
            .filter(|entry| {
                let entry = entry.borrow();
                bounds.starts_before.is_none_or(|t| entry.start < t)
                    && bounds.starts_after.is_none_or(|t| entry.start > t)
                    && bounds.ends_before.is_none_or(|t| entry.end < t)
                    && bounds.ends_after.is_none_or(|t| entry.end > t)
            })
            .cloned()
            .collect();

        SubtitleCollection {
            entries,
            eol: self.eol.clone(),
            lang_stat: HashMap::new(),
            langs: Vec::new(),
        }
    }

    /// All entries visible at the given instant
    pub fn at(&self, timestamp: Timestamp) -> SubtitleCollection {
        self.slice(SliceBounds {
            starts_before: Some(timestamp),
            ends_after: Some(timestamp),
            ..Default::default()
        })
    }

    /// Shift every entry's start and end in place.
    ///
    /// Entries are shared with any slices taken earlier; those slices
    /// observe the shift.
    pub fn shift(&self, offset: TimeOffset) {
        for entry in &self.entries {
            let mut entry = entry.borrow_mut();
            entry.start.shift(offset);
            entry.end.shift(offset);
        }
    }

    /// Sort entries by (start, end) and renumber them 1..N. Call after
    /// destructive operations; applying it twice is a no-op.
    pub fn normalize(&mut self) {
        self.entries.sort_by_key(|entry| {
            let entry = entry.borrow();
            (entry.start, entry.end)
        });
        for (position, entry) in self.entries.iter().enumerate() {
            entry.borrow_mut().index = position + 1;
        }
    }

    /// All entries' text joined by `\n`, in current order
    pub fn text(&self) -> String {
        self.entries
            .iter()
            .map(|entry| entry.borrow().text.clone())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Mark every entry as belonging to one language track: its lang_map
    /// becomes `{tag: text}`.
    pub fn set_language(&self, tag: &str) {
        for entry in &self.entries {
            let mut entry = entry.borrow_mut();
            let text = entry.text.clone();
            entry.lang_map.clear();
            entry.lang_map.insert(tag.to_string(), text);
        }
    }

    /// Rebuild `lang_stat` and the dominant-language list. A language is
    /// dominant when more than a tenth of the entries carry it.
    pub fn recount_languages(&mut self) {
        let mut stat: HashMap<String, usize> = HashMap::new();
        for entry in &self.entries {
            for lang in entry.borrow().lang_map.keys() {
                *stat.entry(lang.clone()).or_insert(0) += 1;
            }
        }

        let threshold = self.entries.len() / 10;
        let mut langs: Vec<String> = stat
            .iter()
            .filter(|&(_, &count)| count > threshold)
            .map(|(lang, _)| lang.clone())
            .collect();
        langs.sort_by(|a, b| stat[b].cmp(&stat[a]).then_with(|| a.cmp(b)));

        self.lang_stat = stat;
        self.langs = langs;
    }

    /// Render the collection back to SRT text using the given eol, or the
    /// collection's own convention when `None`.
    ///
    /// Each entry is followed by exactly one separator line, except entries
    /// whose text already ends with its own blank line.
    pub fn render(&self, eol: Option<&str>) -> String {
        let eol = eol.unwrap_or(&self.eol);
        let double_eol = eol.repeat(2);

        let mut output = String::new();
        for entry in &self.entries {
            let mut block = entry.borrow().to_string();
            if eol != "\n" {
                block = block.replace('\n', eol);
            }
            output.push_str(&block);
            if !block.ends_with(&double_eol) {
                output.push_str(eol);
            }
        }
        output
    }

    /// Serialize into any writer; see [`render`](SubtitleCollection::render)
    pub fn write_into<W: Write>(&self, writer: &mut W, eol: Option<&str>) -> io::Result<()> {
        writer.write_all(self.render(eol).as_bytes())
    }
}
