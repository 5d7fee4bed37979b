use std::fs;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use log::debug;

use crate::subtitle_processor::{ErrorHandling, SubtitleCollection};

// @module: File boundary for the subtitle core

/// Open and parse an SRT file.
///
/// The file is read as UTF-8 and a leading byte-order mark is stripped
/// before any line reaches the parser; the core itself never sees encoding
/// concerns.
pub fn open_subtitle_file<P: AsRef<Path>>(
    path: P,
    handling: ErrorHandling,
) -> Result<SubtitleCollection> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read subtitle file: {}", path.display()))?;
    let content = content.strip_prefix('\u{feff}').unwrap_or(&content);

    let collection = SubtitleCollection::from_string(content, handling)
        .with_context(|| format!("Failed to parse subtitle file: {}", path.display()))?;
    debug!(
        "parsed {} entries from {}",
        collection.len(),
        path.display()
    );
    Ok(collection)
}

/// Serialize a collection to an SRT file, creating parent directories as
/// needed. `eol` overrides the collection's own convention.
pub fn save_subtitle_file<P: AsRef<Path>>(
    collection: &SubtitleCollection,
    path: P,
    eol: Option<&str>,
) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let mut file = File::create(path)
        .with_context(|| format!("Failed to create subtitle file: {}", path.display()))?;
    collection
        .write_into(&mut file, eol)
        .with_context(|| format!("Failed to write subtitle file: {}", path.display()))?;
    Ok(())
}

/// Fan an aligned collection out into per-language corpus files.
///
/// Every entry whose language set equals the collection's dominant-language
/// set contributes one line to `<root>/<lang>.corpus` for each language.
pub fn build_corpus<P: AsRef<Path>>(collection: &SubtitleCollection, root: P) -> Result<()> {
    let root = root.as_ref();
    fs::create_dir_all(root)
        .with_context(|| format!("Failed to create corpus directory: {}", root.display()))?;

    let mut outputs = Vec::new();
    for lang in &collection.langs {
        let path = root.join(format!("{}.corpus", lang));
        let file = File::options()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open corpus file: {}", path.display()))?;
        outputs.push((lang.clone(), file));
    }

    for entry in &collection.entries {
        let entry = entry.borrow();
        if entry.lang_map.len() != collection.langs.len()
            || !collection.langs.iter().all(|l| entry.lang_map.contains_key(l))
        {
            continue;
        }
        for (lang, file) in &mut outputs {
            let text = entry.lang_map.get(lang).map(String::as_str).unwrap_or("");
            writeln!(file, "{}", text)
                .with_context(|| format!("Failed to write corpus line for {}", lang))?;
        }
    }

    Ok(())
}
