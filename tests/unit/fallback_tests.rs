/*!
 * Tests for fallback configuration parsing and resolution
 */

use polyglot::fallback::{FallbackConfig, FallbackMap};

#[test]
fn test_deserialize_withEachShape_shouldPickVariant() {
    let disabled: FallbackConfig = serde_json::from_str("false").unwrap();
    assert_eq!(disabled, FallbackConfig::Disabled);

    let single: FallbackConfig = serde_json::from_str(r#""EN""#).unwrap();
    assert_eq!(single, FallbackConfig::single("en"));

    let unset: FallbackConfig = serde_json::from_str("null").unwrap();
    assert_eq!(unset, FallbackConfig::Unset);

    let map: FallbackConfig = serde_json::from_str(r#"{"ru": "en", "de-AT": "de"}"#).unwrap();
    assert_eq!(map, FallbackConfig::map([("ru", "en"), ("de-at", "de")]));
}

#[test]
fn test_deserialize_withTrue_shouldFail() {
    assert!(serde_json::from_str::<FallbackConfig>("true").is_err());
}

#[test]
fn test_map_shouldKeepDocumentOrder() {
    let map: FallbackMap = serde_json::from_str(r#"{"uk": "ru", "be": "ru", "ru": "en"}"#).unwrap();

    let keys: Vec<&str> = map.iter().map(|(language, _)| language).collect();
    assert_eq!(keys, vec!["uk", "be", "ru"]);
    assert_eq!(map.default_fallback(), Some("ru"));
}

#[test]
fn test_resolve_withMap_shouldUseEntryThenRegionThenFirstEntry() {
    let config = FallbackConfig::map([("uk", "ru"), ("ru", "en"), ("de-ch", "fr")]);

    assert_eq!(config.resolve("UK", "en"), "ru");
    assert_eq!(config.resolve("de-CH", "en"), "fr");
    assert_eq!(config.resolve("de-AT", "en"), "de");
    assert_eq!(config.resolve("es", "en"), "ru");
}

#[test]
fn test_resolve_withEmptyMap_shouldTerminateAtLanguage() {
    let config = FallbackConfig::Map(FallbackMap::new());
    assert_eq!(config.resolve("es", "en"), "es");
}

#[test]
fn test_chain_withCycle_shouldStopBeforeRepeat() {
    let config = FallbackConfig::map([("fr", "ru"), ("ru", "fr")]);

    assert_eq!(config.chain("fr", "en"), vec!["fr", "ru"]);
    assert_eq!(config.chain("ru", "en"), vec!["ru", "fr"]);
}

#[test]
fn test_chain_withSingle_shouldPassThroughPrimarySubtag() {
    let config = FallbackConfig::single("en");
    assert_eq!(config.chain("de-AT", "en"), vec!["de-at", "de", "en"]);
}

#[test]
fn test_serialize_shouldRoundTripShapes() {
    assert_eq!(serde_json::to_string(&FallbackConfig::Disabled).unwrap(), "false");
    assert_eq!(serde_json::to_string(&FallbackConfig::Unset).unwrap(), "null");
    assert_eq!(
        serde_json::to_string(&FallbackConfig::map([("uk", "ru"), ("ru", "en")])).unwrap(),
        r#"{"uk":"ru","ru":"en"}"#
    );
}
