use std::collections::BTreeMap;

use log::debug;

use crate::subtitle_processor::{SubtitleCollection, SubtitleEntry};
use crate::timestamp::Timestamp;

// @module: Temporal alignment of two language tracks

/// Maximum discrepancy, in milliseconds, for two timestamps to count as the
/// same moment
pub const ALIGN_TOLERANCE_MS: i64 = 1_000;

/// Merge `second`'s language map into `first`.
///
/// The key set becomes the union of both maps. Values for a key present on
/// both sides are concatenated, `first`'s value before `second`'s, with no
/// separator.
pub fn merge_lang_maps(first: &mut BTreeMap<String, String>, second: &BTreeMap<String, String>) {
    for (lang, text) in second {
        first
            .entry(lang.clone())
            .and_modify(|existing| existing.push_str(text))
            .or_insert_with(|| text.clone());
    }
}

/// Merge two language tracks into one collection of entries carrying
/// combined per-language text, matched by overlapping time windows.
///
/// Both inputs must be sorted ascending by start time; the merge is a
/// two-pointer scan whose pointers only advance. Pairs whose start times
/// differ by more than [`ALIGN_TOLERANCE_MS`] do not correspond, and
/// trailing unmatched entries on either side are dropped. When one entry
/// spans several consecutive entries of the other track, the group is
/// drained one entry per outer iteration, re-entering the same branch until
/// the end times line up.
pub fn align(first: &SubtitleCollection, second: &SubtitleCollection) -> SubtitleCollection {
    const T: i64 = ALIGN_TOLERANCE_MS;

    let a = &first.entries;
    let b = &second.entries;
    let mut i = 0;
    let mut j = 0;

    let mut merged = SubtitleCollection::new();
    merged.eol = first.eol.clone();

    while i < a.len() && j < b.len() {
        let (a_start, a_end) = span(&a[i].borrow());
        let (b_start, b_end) = span(&b[j].borrow());

        let start_delta = a_start.ordinal - b_start.ordinal;
        let end_delta = a_end.ordinal - b_end.ordinal;

        if start_delta.abs() <= T {
            if end_delta.abs() <= T {
                // One-to-one match
                let mut map = a[i].borrow().lang_map.clone();
                merge_lang_maps(&mut map, &b[j].borrow().lang_map);
                emit(&mut merged, a_start, a_end, map);
                i += 1;
                j += 1;
            } else if end_delta > T {
                // Several entries of `second` may span this entry of `first`
                if j + 1 < b.len() && b[j + 1].borrow().end.ordinal - a_end.ordinal > T {
                    i += 1;
                    j += 1;
                    continue;
                }

                let mut map = a[i].borrow().lang_map.clone();
                merge_lang_maps(&mut map, &b[j].borrow().lang_map);
                while j + 1 < b.len() && b[j + 1].borrow().end.ordinal - a_end.ordinal < T {
                    j += 1;
                    merge_lang_maps(&mut map, &b[j].borrow().lang_map);
                }

                if (b[j].borrow().end.ordinal - a_end.ordinal).abs() < T {
                    emit(&mut merged, a_start, a_end, map);
                } else {
                    debug!(
                        "dropping unmatched group ending at {} / {}",
                        a_end,
                        b[j].borrow().end
                    );
                }
                i += 1;
                j += 1;
            } else {
                // Symmetric case: several entries of `first` span one of `second`
                if i + 1 < a.len() && a[i + 1].borrow().end.ordinal - b_end.ordinal > T {
                    i += 1;
                    j += 1;
                    continue;
                }

                let mut map = a[i].borrow().lang_map.clone();
                while i + 1 < a.len() && a[i + 1].borrow().end.ordinal - b_end.ordinal < T {
                    i += 1;
                    merge_lang_maps(&mut map, &a[i].borrow().lang_map);
                }
                merge_lang_maps(&mut map, &b[j].borrow().lang_map);

                let (last_start, last_end) = span(&a[i].borrow());
                if (last_end.ordinal - b_end.ordinal).abs() < T {
                    emit(&mut merged, last_start, last_end, map);
                } else {
                    debug!(
                        "dropping unmatched group ending at {} / {}",
                        last_end, b_end
                    );
                }
                i += 1;
                j += 1;
            }
        } else if start_delta < -T {
            i += 1;
        } else {
            j += 1;
        }
    }

    merged.recount_languages();
    merged
}

fn span(entry: &SubtitleEntry) -> (Timestamp, Timestamp) {
    (entry.start, entry.end)
}

fn emit(
    merged: &mut SubtitleCollection,
    start: Timestamp,
    end: Timestamp,
    lang_map: BTreeMap<String, String>,
) {
    let mut entry = SubtitleEntry::new(merged.len() + 1, start, end, String::new());
    entry.lang_map = lang_map;
    merged.push(entry);
}
