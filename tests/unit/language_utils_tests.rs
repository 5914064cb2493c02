/*!
 * Tests for language tag utilities
 */

use polyglot::language_utils::{has_region, is_known_language, language_name, normalize, primary_subtag};

#[test]
fn test_normalize_shouldLowercaseWholeTag() {
    assert_eq!(normalize("pt_BR"), "pt_br");
    assert_eq!(normalize("ZH-Hant-TW"), "zh-hant-tw");
    assert_eq!(normalize(""), "");
}

#[test]
fn test_primarySubtag_withEitherSeparator_shouldSplitAtFirst() {
    assert_eq!(primary_subtag("de-AT"), "de");
    assert_eq!(primary_subtag("pt_BR"), "pt");
    assert_eq!(primary_subtag("zh-hant-tw"), "zh");
    assert_eq!(primary_subtag("en"), "en");
}

#[test]
fn test_hasRegion_shouldDetectSubtags() {
    assert!(has_region("de-at"));
    assert!(has_region("pt_br"));
    assert!(!has_region("de"));
}

#[test]
fn test_isKnownLanguage_shouldCheckPrimarySubtag() {
    assert!(is_known_language("en"));
    assert!(is_known_language("DE-at"));
    assert!(is_known_language("deu"));
    assert!(!is_known_language("xx"));
    assert!(!is_known_language("x-private"));
}

#[test]
fn test_languageName_withKnownCode_shouldReturnEnglishName() {
    assert_eq!(language_name("fr-CA"), Some("French"));
    assert_eq!(language_name("qq"), None);
}
