use anyhow::{Result, anyhow};
use isolang::Language;

// @module: Language tag validation and normalization
//
// Merged entries key their per-language text by tag; both tracks must agree
// on one canonical 3-letter form for those keys.

/// Normalize a language code to its ISO 639-3 (3-letter) form
///
/// Accepts ISO 639-1 (2-letter) and ISO 639-3 (3-letter) codes, case and
/// surrounding whitespace insensitive.
pub fn normalize_tag(code: &str) -> Result<String> {
    let normalized = code.trim().to_lowercase();

    if normalized.len() == 2 {
        if let Some(lang) = Language::from_639_1(&normalized) {
            return Ok(lang.to_639_3().to_string());
        }
    } else if normalized.len() == 3 && Language::from_639_3(&normalized).is_some() {
        return Ok(normalized);
    }

    Err(anyhow!("Invalid language code: {}", code))
}

/// Check if two language codes refer to the same language, regardless of
/// 2-letter or 3-letter form
pub fn codes_match(first: &str, second: &str) -> bool {
    match (normalize_tag(first), normalize_tag(second)) {
        (Ok(a), Ok(b)) => a == b,
        // Unknown codes only match on literal equality
        _ => first.trim().to_lowercase() == second.trim().to_lowercase(),
    }
}

/// English name for a language code, for CLI messages
pub fn language_name(code: &str) -> Result<String> {
    let normalized = normalize_tag(code)?;
    Language::from_639_3(&normalized)
        .map(|lang| lang.to_name().to_string())
        .ok_or_else(|| anyhow!("Invalid language code: {}", code))
}
