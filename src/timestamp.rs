use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::ParseErrorKind;

// @module: Millisecond-resolution subtitle timestamps

// @const: SRT timestamp regex (H+:MM:SS,mmm)
static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+):(\d{2}):(\d{2}),(\d{3})$").unwrap()
});

/// A point in media time, stored as a signed count of milliseconds.
///
/// The ordinal may go negative after shifting; component accessors wrap
/// minutes/seconds/milliseconds into their natural ranges and leave hours
/// unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp {
    // @field: Milliseconds since stream start
    pub ordinal: i64,
}

/// Offset and ratio arguments for [`Timestamp::shift`] and
/// [`SubtitleCollection::shift`](crate::subtitle_processor::SubtitleCollection::shift).
///
/// Construct with struct-update syntax:
/// `TimeOffset { seconds: 2, ..Default::default() }`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeOffset {
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
    pub milliseconds: i64,
    /// Scale factor applied to the ordinal before the offset is added.
    pub ratio: f64,
}

impl Default for TimeOffset {
    fn default() -> Self {
        TimeOffset {
            hours: 0,
            minutes: 0,
            seconds: 0,
            milliseconds: 0,
            ratio: 1.0,
        }
    }
}

impl TimeOffset {
    /// Total additive offset in milliseconds.
    pub fn offset_ms(&self) -> i64 {
        ((self.hours * 60 + self.minutes) * 60 + self.seconds) * 1_000 + self.milliseconds
    }
}

impl Timestamp {
    /// Creates a timestamp from a raw millisecond ordinal.
    pub fn from_ms(ordinal: i64) -> Self {
        Timestamp { ordinal }
    }

    /// Creates a timestamp from hour/minute/second/millisecond components.
    ///
    /// Out-of-range components normalize instead of failing: 90 seconds
    /// becomes one minute and 30 seconds. Combinations beyond the i64
    /// millisecond range saturate.
    pub fn from_components(hours: i64, minutes: i64, seconds: i64, milliseconds: i64) -> Self {
        let ordinal = hours
            .saturating_mul(60)
            .saturating_add(minutes)
            .saturating_mul(60)
            .saturating_add(seconds)
            .saturating_mul(1_000)
            .saturating_add(milliseconds);
        Self::from_ms(ordinal)
    }

    /// Parse an SRT timestamp in the fixed `H+:MM:SS,mmm` form.
    ///
    /// The hour field takes any number of digits, so it can lexically match
    /// while exceeding what an i64 millisecond ordinal can carry; such inputs
    /// are rejected as format errors rather than truncated.
    pub fn parse(text: &str) -> Result<Self, ParseErrorKind> {
        let caps = TIMESTAMP_REGEX
            .captures(text)
            .ok_or_else(|| ParseErrorKind::TimestampFormat(text.to_string()))?;

        let field = |idx: usize| -> Result<i64, ParseErrorKind> {
            caps[idx]
                .parse()
                .map_err(|_| ParseErrorKind::TimestampFormat(text.to_string()))
        };

        let hours = field(1)?;
        let minutes = field(2)?;
        let seconds = field(3)?;
        let milliseconds = field(4)?;

        // The sub-hour fields are regex-bounded; only the hour term can
        // overflow the ordinal
        let ordinal = hours
            .checked_mul(3_600_000)
            .and_then(|ms| ms.checked_add(minutes * 60_000 + seconds * 1_000 + milliseconds))
            .ok_or_else(|| ParseErrorKind::TimestampFormat(text.to_string()))?;

        Ok(Self::from_ms(ordinal))
    }

    pub fn hours(&self) -> i64 {
        self.ordinal.div_euclid(3_600_000)
    }

    pub fn minutes(&self) -> i64 {
        self.ordinal.div_euclid(60_000).rem_euclid(60)
    }

    pub fn seconds(&self) -> i64 {
        self.ordinal.div_euclid(1_000).rem_euclid(60)
    }

    pub fn milliseconds(&self) -> i64 {
        self.ordinal.rem_euclid(1_000)
    }

    /// Shift this timestamp in place: scale by the ratio, then add the
    /// offset, in one step. With the default ratio of 1.0 this is a pure
    /// additive offset.
    pub fn shift(&mut self, offset: TimeOffset) {
        self.ordinal = (self.ordinal as f64 * offset.ratio).round() as i64 + offset.offset_ms();
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02},{:03}",
            self.hours(),
            self.minutes(),
            self.seconds(),
            self.milliseconds()
        )
    }
}
