use anyhow::{Context, Result};
use log::{LevelFilter, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::default::Default;
use std::path::{Path, PathBuf};

use crate::errors::ConfigError;
use crate::fallback::FallbackConfig;
use crate::language_utils;
use crate::store::Relation;

/// Application configuration module
/// This module handles the translation settings attached to a base record
/// type and the settings of the command line tool built around them.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Storage settings
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Translation settings for the base record type
    #[serde(default)]
    pub translateable: TranslateableConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// SQLite storage settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// Database file; the user's local data directory when unset
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Table holding the base records
    #[serde(default = "default_base_table")]
    pub base_table: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: None,
            base_table: default_base_table(),
        }
    }
}

/// Point in the base record's deletion at which translations are removed
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeleteHook {
    /// Before the base record row goes; required to veto a deletion
    BeforeDelete,
    /// After the base record row is gone
    #[default]
    AfterDelete,
    /// Never; rely on the storage layer's own cascade
    Disabled,
}

/// Whether a base record with translations may be deleted
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeletionMode {
    /// Always; all translations go with it
    #[default]
    All,
    /// Only once a single translation is left
    Last,
}

/// Languages normally taken from the surrounding application
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct AmbientLanguages {
    /// Language used when no active language was chosen
    #[serde(default = "default_language")]
    pub app_language: String,

    /// Fallback used when no fallback configuration was given
    #[serde(default = "default_language")]
    pub source_language: String,
}

impl Default for AmbientLanguages {
    fn default() -> Self {
        Self {
            app_language: default_language(),
            source_language: default_language(),
        }
    }
}

/// Translation settings of one base record type
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TranslateableConfig {
    /// How translation rows link to the base record
    #[serde(default)]
    pub relation: Relation,

    /// Language column of the translation table
    #[serde(default = "default_language_field")]
    pub language_field: String,

    /// Attributes stored per language
    #[serde(default)]
    pub translation_attributes: Vec<String>,

    /// Skip new translations whose values equal what the fallback chain yields
    #[serde(default)]
    pub skip_saving_duplicate_translation: bool,

    /// When translations are deleted along with the base record
    #[serde(default)]
    pub delete_hook: DeleteHook,

    /// Deletion restriction, only enforced with `DeleteHook::BeforeDelete`
    #[serde(default)]
    pub restrict_deletion: DeletionMode,

    /// Fallback languages
    #[serde(default)]
    pub fallback_language: FallbackConfig,

    /// Active language; the ambient application language when unset
    #[serde(default)]
    pub language: Option<String>,

    /// Ambient language defaults
    #[serde(default)]
    pub ambient: AmbientLanguages,
}

impl Default for TranslateableConfig {
    fn default() -> Self {
        Self {
            relation: Relation::default(),
            language_field: default_language_field(),
            translation_attributes: vec!["title".to_string(), "description".to_string()],
            skip_saving_duplicate_translation: false,
            delete_hook: DeleteHook::default(),
            restrict_deletion: DeletionMode::default(),
            fallback_language: FallbackConfig::default(),
            language: None,
            ambient: AmbientLanguages::default(),
        }
    }
}

impl TranslateableConfig {
    /// Settings for the given attributes, everything else at defaults
    pub fn with_attributes(attributes: &[&str]) -> Self {
        Self {
            translation_attributes: attributes.iter().map(|a| a.to_string()).collect(),
            ..Self::default()
        }
    }

    /// Whether the attribute is stored per language
    pub fn is_translation_attribute(&self, name: &str) -> bool {
        self.translation_attributes.iter().any(|a| a == name)
    }

    /// Validate the settings for consistency
    ///
    /// Language tags outside ISO 639 are accepted with a warning.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.translation_attributes.is_empty() {
            return Err(ConfigError::NoAttributes);
        }
        if self.relation.link.is_empty() {
            return Err(ConfigError::EmptyRelation(self.relation.name.clone()));
        }

        let reserved: HashSet<&str> = self
            .relation
            .link
            .iter()
            .map(|l| l.field.as_str())
            .chain([self.language_field.as_str(), "id"])
            .collect();
        let mut seen = HashSet::new();
        for attribute in &self.translation_attributes {
            check_identifier(attribute)?;
            if reserved.contains(attribute.as_str()) {
                return Err(ConfigError::ReservedAttribute(attribute.clone()));
            }
            if !seen.insert(attribute.as_str()) {
                return Err(ConfigError::DuplicateAttribute(attribute.clone()));
            }
        }
        check_identifier(&self.relation.table)?;
        check_identifier(&self.language_field)?;
        for link in &self.relation.link {
            check_identifier(&link.field)?;
            check_identifier(&link.references)?;
        }

        let mut languages: Vec<(&'static str, &str)> = vec![
            ("app_language", self.ambient.app_language.as_str()),
            ("source_language", self.ambient.source_language.as_str()),
        ];
        if let Some(language) = &self.language {
            languages.push(("language", language.as_str()));
        }
        languages.extend(
            self.fallback_language
                .languages()
                .into_iter()
                .map(|l| ("fallback_language", l)),
        );

        for (setting, language) in languages {
            if language.trim().is_empty() {
                return Err(ConfigError::EmptyLanguage(setting));
            }
            if !language_utils::is_known_language(language) {
                warn!("{} '{}' is not an ISO 639 language code", setting, language);
            }
        }

        Ok(())
    }
}

/// Check that a name can be used as a table or column name
pub fn check_identifier(name: &str) -> Result<(), ConfigError> {
    let mut chars = name.chars();
    let valid = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidIdentifier(name.to_string()))
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> LevelFilter {
        match self {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

fn default_base_table() -> String {
    "post".to_string()
}

fn default_language_field() -> String {
    "language".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

impl Config {
    /// Load a configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;
        Ok(config)
    }

    /// Write the configuration as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;
        Ok(())
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        check_identifier(&self.database.base_table)?;
        self.translateable.validate()?;
        Ok(())
    }
}
