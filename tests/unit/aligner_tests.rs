/*!
 * Tests for two-track temporal alignment
 */

use std::collections::BTreeMap;

use subalign::aligner::{align, merge_lang_maps};
use subalign::subtitle_processor::{SubtitleCollection, SubtitleEntry};
use subalign::timestamp::Timestamp;

fn tagged(start_ms: i64, end_ms: i64, lang: &str, text: &str) -> SubtitleEntry {
    let mut entry = SubtitleEntry::new(
        0,
        Timestamp::from_ms(start_ms),
        Timestamp::from_ms(end_ms),
        text.to_string(),
    );
    entry.lang_map.insert(lang.to_string(), text.to_string());
    entry
}

fn track(entries: Vec<SubtitleEntry>) -> SubtitleCollection {
    let mut collection = SubtitleCollection::new();
    for entry in entries {
        collection.push(entry);
    }
    collection
}

fn map_of(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Test the merge rule: union of keys, shared keys concatenated first-then-
/// second with no separator
#[test]
fn test_merge_lang_maps_withSharedAndDistinctKeys_shouldConcatenate() {
    let mut first = map_of(&[("en", "hello"), ("de", "hallo")]);
    let second = map_of(&[("en", "world"), ("fr", "salut")]);

    merge_lang_maps(&mut first, &second);

    assert_eq!(
        first,
        map_of(&[("en", "helloworld"), ("de", "hallo"), ("fr", "salut")])
    );
}

/// Test a one-to-one match within tolerance merges both maps over the first
/// track's span
#[test]
fn test_align_withOneToOneMatch_shouldMergeMaps() {
    let a = track(vec![tagged(0, 2_000, "en", "hello")]);
    let b = track(vec![tagged(100, 2_100, "fr", "salut")]);

    let merged = align(&a, &b);

    assert_eq!(merged.len(), 1);
    let only = merged.entries[0].borrow();
    assert_eq!(only.start.ordinal, 0);
    assert_eq!(only.end.ordinal, 2_000);
    assert_eq!(only.lang_map, map_of(&[("en", "hello"), ("fr", "salut")]));
}

/// Test the one-to-many grouping scenario: one entry of the first track
/// spans two consecutive entries of the second, and the group terminates
#[test]
fn test_align_withSpecScenario_shouldGroupAndTerminate() {
    let a = track(vec![tagged(1_000, 3_000, "en", "hi")]);
    let b = track(vec![
        tagged(1_050, 1_900, "fr", "bonjour"),
        tagged(1_950, 2_950, "fr", "monde"),
    ]);

    let merged = align(&a, &b);

    assert_eq!(merged.len(), 1);
    let only = merged.entries[0].borrow();
    assert_eq!(only.start.ordinal, 1_000);
    assert_eq!(only.end.ordinal, 3_000);
    assert_eq!(only.lang_map, map_of(&[("en", "hi"), ("fr", "bonjourmonde")]));
}

/// Test the symmetric grouping: several entries of the first track matching
/// one of the second, emitted over the final accumulated entry's span
#[test]
fn test_align_withManyToOneMatch_shouldGroupOverFinalSpan() {
    let a = track(vec![
        tagged(1_050, 1_900, "en", "good "),
        tagged(1_950, 2_950, "en", "morning"),
    ]);
    let b = track(vec![tagged(1_000, 3_000, "fr", "bonjour")]);

    let merged = align(&a, &b);

    assert_eq!(merged.len(), 1);
    let only = merged.entries[0].borrow();
    assert_eq!(only.start.ordinal, 1_950);
    assert_eq!(only.end.ordinal, 2_950);
    assert_eq!(
        only.lang_map,
        map_of(&[("en", "good morning"), ("fr", "bonjour")])
    );
}

/// Test entries whose starts differ beyond tolerance advance the trailing
/// pointer without emitting
#[test]
fn test_align_withDisjointStarts_shouldSkipNonMatching() {
    let a = track(vec![tagged(5_000, 6_000, "en", "late")]);
    let b = track(vec![
        tagged(0, 1_000, "fr", "early"),
        tagged(5_100, 6_100, "fr", "tard"),
    ]);

    let merged = align(&a, &b);

    assert_eq!(merged.len(), 1);
    let only = merged.entries[0].borrow();
    assert_eq!(only.start.ordinal, 5_000);
    assert_eq!(only.lang_map, map_of(&[("en", "late"), ("fr", "tard")]));
}

/// Test the grouping guard: when the next entry of the other track ends far
/// past the spanning entry, both pointers advance with no output
#[test]
fn test_align_withOverrunningNextEntry_shouldEmitNothing() {
    let a = track(vec![tagged(1_000, 3_000, "en", "hi")]);
    let b = track(vec![
        tagged(1_050, 1_400, "fr", "un"),
        tagged(1_450, 5_000, "fr", "deux"),
    ]);

    let merged = align(&a, &b);
    assert!(merged.is_empty());
}

/// Test a group whose accumulated end never reaches tolerance emits nothing
#[test]
fn test_align_withUnclosedGroup_shouldDropGroup() {
    let a = track(vec![tagged(1_000, 3_000, "en", "hi")]);
    let b = track(vec![tagged(1_050, 1_500, "fr", "court")]);

    let merged = align(&a, &b);
    assert!(merged.is_empty());
}

/// Test trailing unmatched entries are dropped once either track runs out
#[test]
fn test_align_withTrailingEntries_shouldDropThem() {
    let a = track(vec![
        tagged(0, 2_000, "en", "one"),
        tagged(10_000, 12_000, "en", "two"),
        tagged(20_000, 22_000, "en", "three"),
    ]);
    let b = track(vec![tagged(50, 2_050, "fr", "un")]);

    let merged = align(&a, &b);
    assert_eq!(merged.len(), 1);
    assert_eq!(merged.entries[0].borrow().start.ordinal, 0);
}

/// Test swapping the inputs yields the same time windows and the same
/// key->value pairs for tracks with identical timing
#[test]
fn test_align_withSwappedInputs_shouldMatchWindowsAndPairs() {
    let a = track(vec![
        tagged(0, 2_000, "en", "one"),
        tagged(3_000, 5_000, "en", "two"),
    ]);
    let b = track(vec![
        tagged(0, 2_000, "fr", "un"),
        tagged(3_000, 5_000, "fr", "deux"),
    ]);

    let forward = align(&a, &b);
    let backward = align(&b, &a);

    assert_eq!(forward.len(), backward.len());
    for (x, y) in forward.entries.iter().zip(&backward.entries) {
        let (x, y) = (x.borrow(), y.borrow());
        assert_eq!((x.start, x.end), (y.start, y.end));
        assert_eq!(x.lang_map, y.lang_map);
    }
}

/// Test the merged collection's dominant-language statistics are recomputed
#[test]
fn test_align_withMergedOutput_shouldRecountLanguages() {
    let a = track(vec![
        tagged(0, 2_000, "en", "one"),
        tagged(3_000, 5_000, "en", "two"),
    ]);
    let b = track(vec![
        tagged(0, 2_000, "fr", "un"),
        tagged(3_000, 5_000, "fr", "deux"),
    ]);

    let merged = align(&a, &b);

    assert_eq!(merged.lang_stat.get("en"), Some(&2));
    assert_eq!(merged.lang_stat.get("fr"), Some(&2));
    assert_eq!(merged.langs, vec!["en".to_string(), "fr".to_string()]);
}

/// Test merged entries are numbered in emission order
#[test]
fn test_align_withMultipleMatches_shouldNumberInEmissionOrder() {
    let a = track(vec![
        tagged(0, 2_000, "en", "one"),
        tagged(3_000, 5_000, "en", "two"),
    ]);
    let b = track(vec![
        tagged(100, 2_100, "fr", "un"),
        tagged(3_100, 5_100, "fr", "deux"),
    ]);

    let merged = align(&a, &b);
    assert_eq!(merged.len(), 2);
    assert_eq!(merged.entries[0].borrow().index, 1);
    assert_eq!(merged.entries[1].borrow().index, 2);
    assert!(merged.entries[0].borrow().start < merged.entries[1].borrow().start);
}
