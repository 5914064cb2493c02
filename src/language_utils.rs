/*!
 * Language tag utilities.
 *
 * Tags are compared case-insensitively everywhere in the crate, so every
 * lookup goes through [`normalize`] first. A tag may carry a region after a
 * separator (`de-AT`, `pt_BR`); [`primary_subtag`] strips it.
 */

use isolang::Language;

/// Characters accepted as subtag separators
pub const SUBTAG_SEPARATORS: [char; 2] = ['-', '_'];

/// Normalize a language tag to its lowercase form
pub fn normalize(tag: &str) -> String {
    tag.to_lowercase()
}

/// Return the part of a tag before its first separator, or the tag itself
pub fn primary_subtag(tag: &str) -> &str {
    match tag.find(SUBTAG_SEPARATORS) {
        Some(index) => &tag[..index],
        None => tag,
    }
}

/// Whether a tag carries a region or other subtag after its primary subtag
pub fn has_region(tag: &str) -> bool {
    primary_subtag(tag) != tag
}

/// Check the primary subtag against ISO 639-1 and ISO 639-3
///
/// Private or unregistered tags are legal as storage keys, so callers treat
/// `false` as a warning rather than a hard error.
pub fn is_known_language(tag: &str) -> bool {
    let primary = normalize(primary_subtag(tag.trim()));
    match primary.len() {
        2 => Language::from_639_1(&primary).is_some(),
        3 => Language::from_639_3(&primary).is_some(),
        _ => false,
    }
}

/// English name of the tag's primary language, when it is a known ISO code
pub fn language_name(tag: &str) -> Option<&'static str> {
    let primary = normalize(primary_subtag(tag.trim()));
    let language = match primary.len() {
        2 => Language::from_639_1(&primary),
        3 => Language::from_639_3(&primary),
        _ => None,
    }?;
    Some(language.to_name())
}
