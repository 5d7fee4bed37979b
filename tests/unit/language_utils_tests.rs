/*!
 * Tests for language tag utilities
 */

use subalign::language_utils::{codes_match, language_name, normalize_tag};

/// Test 2-letter codes normalize to their 3-letter form
#[test]
fn test_normalize_tag_withTwoLetterCode_shouldReturnThreeLetterForm() {
    assert_eq!(normalize_tag("en").unwrap(), "eng");
    assert_eq!(normalize_tag("fr").unwrap(), "fra");
    assert_eq!(normalize_tag(" DE ").unwrap(), "deu");
}

/// Test 3-letter codes pass through when valid
#[test]
fn test_normalize_tag_withThreeLetterCode_shouldPassThrough() {
    assert_eq!(normalize_tag("eng").unwrap(), "eng");
    assert_eq!(normalize_tag("FRA").unwrap(), "fra");
}

/// Test invalid codes are rejected
#[test]
fn test_normalize_tag_withInvalidCode_shouldFail() {
    assert!(normalize_tag("").is_err());
    assert!(normalize_tag("x").is_err());
    assert!(normalize_tag("zz").is_err());
    assert!(normalize_tag("english").is_err());
}

/// Test matching across 2-letter and 3-letter forms
#[test]
fn test_codes_match_withMixedForms_shouldMatchSameLanguage() {
    assert!(codes_match("en", "eng"));
    assert!(codes_match("ENG", "en"));
    assert!(!codes_match("en", "fr"));
}

/// Test unknown codes only match literally
#[test]
fn test_codes_match_withUnknownCodes_shouldMatchLiterally() {
    assert!(codes_match("x-klingon", "X-KLINGON"));
    assert!(!codes_match("x-klingon", "eng"));
}

/// Test English names resolve for CLI messages
#[test]
fn test_language_name_withValidCode_shouldReturnEnglishName() {
    assert_eq!(language_name("fr").unwrap(), "French");
    assert_eq!(language_name("eng").unwrap(), "English");
    assert!(language_name("zz").is_err());
}
