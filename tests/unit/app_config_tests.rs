/*!
 * Tests for application configuration loading and validation
 */

use log::LevelFilter;
use polyglot::app_config::{Config, DeleteHook, LogLevel, TranslateableConfig};
use polyglot::fallback::FallbackConfig;

use crate::common;

#[test]
fn test_config_saveThenLoad_shouldKeepSettings() {
    let dir = common::create_temp_dir().unwrap();
    let path = dir.path().join("polyglot.json");

    let mut config = Config::default();
    config.database.base_table = "article".to_string();
    config.translateable = TranslateableConfig::with_attributes(&["headline", "body"]);
    config.translateable.fallback_language = FallbackConfig::map([("uk", "ru"), ("ru", "en")]);
    config.translateable.delete_hook = DeleteHook::BeforeDelete;
    config.log_level = LogLevel::Debug;
    config.save(&path).unwrap();

    let loaded = Config::from_file(&path).unwrap();

    assert_eq!(loaded.database.base_table, "article");
    assert_eq!(loaded.translateable, config.translateable);
    assert_eq!(loaded.log_level, LogLevel::Debug);
    assert!(loaded.validate().is_ok());
}

#[test]
fn test_config_fromFile_withPartialJson_shouldFillDefaults() {
    let dir = common::create_temp_dir().unwrap();
    let path = dir.path().join("partial.json");
    std::fs::write(
        &path,
        r#"{"translateable": {"translation_attributes": ["title"], "fallback_language": "de"}}"#,
    )
    .unwrap();

    let config = Config::from_file(&path).unwrap();

    assert_eq!(config.database.base_table, "post");
    assert!(config.database.path.is_none());
    assert_eq!(config.translateable.fallback_language, FallbackConfig::single("de"));
    assert_eq!(config.log_level, LogLevel::Info);
}

#[test]
fn test_config_fromFile_withMissingFile_shouldFail() {
    let dir = common::create_temp_dir().unwrap();
    assert!(Config::from_file(dir.path().join("missing.json")).is_err());
}

#[test]
fn test_config_validate_withBadBaseTable_shouldFail() {
    let mut config = Config::default();
    config.database.base_table = "1post".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_withPrivateLanguageTag_shouldOnlyWarn() {
    let mut config = TranslateableConfig::with_attributes(&["title"]);
    config.language = Some("x-klingon".to_string());
    assert!(config.validate().is_ok());
}

#[test]
fn test_logLevel_toLevelFilter_shouldMapEachLevel() {
    assert_eq!(LogLevel::Error.to_level_filter(), LevelFilter::Error);
    assert_eq!(LogLevel::Trace.to_level_filter(), LevelFilter::Trace);
    assert_eq!(LogLevel::default().to_level_filter(), LevelFilter::Info);
}
