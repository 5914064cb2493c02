/*!
 * Fallback language configuration and resolution.
 *
 * A fallback configuration maps a language to the next language to try
 * when the first has no value. Repeatedly applying [`FallbackConfig::resolve`]
 * yields the fallback chain; the chain ends where it would revisit a
 * language, which includes the self-loop produced by a disabled fallback.
 */

use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::language_utils::{has_region, normalize, primary_subtag};

/// Ordered language -> fallback mapping
///
/// Insertion order is part of the semantics: the value of the first entry
/// is the default fallback for languages that have no entry of their own.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FallbackMap {
    entries: Vec<(String, String)>,
}

impl FallbackMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the fallback for a language, keeping the original position on replace
    pub fn insert(&mut self, language: &str, fallback: &str) {
        let language = normalize(language);
        let fallback = normalize(fallback);
        match self.entries.iter_mut().find(|(key, _)| *key == language) {
            Some(entry) => entry.1 = fallback,
            None => self.entries.push((language, fallback)),
        }
    }

    /// Fallback configured for exactly this language
    pub fn get(&self, language: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == language)
            .map(|(_, value)| value.as_str())
    }

    /// The implicit default: the value of the first inserted entry
    pub fn default_fallback(&self) -> Option<&str> {
        self.entries.first().map(|(_, value)| value.as_str())
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: AsRef<str>, V: AsRef<str>> FromIterator<(K, V)> for FallbackMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (language, fallback) in iter {
            map.insert(language.as_ref(), fallback.as_ref());
        }
        map
    }
}

impl Serialize for FallbackMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (language, fallback) in &self.entries {
            map.serialize_entry(language, fallback)?;
        }
        map.end()
    }
}

// Object keys are read in document order, independent of how the
// deserializer stores maps internally.
struct FallbackMapVisitor;

impl<'de> Visitor<'de> for FallbackMapVisitor {
    type Value = FallbackMap;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of language tags to fallback language tags")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<FallbackMap, A::Error> {
        let mut map = FallbackMap::new();
        while let Some((language, fallback)) = access.next_entry::<String, String>()? {
            map.insert(&language, &fallback);
        }
        Ok(map)
    }
}

impl<'de> Deserialize<'de> for FallbackMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(FallbackMapVisitor)
    }
}

/// How a language falls back when it has no value of its own
///
/// In JSON: `false` disables fallback, a string is a single fallback, an
/// object is an ordered map and `null` (or an absent field) defers to the
/// ambient source language.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FallbackConfig {
    /// A language only resolves to itself
    Disabled,
    /// One fallback language for every language
    Single(String),
    /// Per-language fallbacks, first entry doubling as the default
    Map(FallbackMap),
    /// Defer to the ambient source language
    #[default]
    Unset,
}

impl FallbackConfig {
    /// Single fallback language
    pub fn single(language: &str) -> Self {
        Self::Single(normalize(language))
    }

    /// Ordered map from `(language, fallback)` pairs
    pub fn map<K: AsRef<str>, V: AsRef<str>>(entries: impl IntoIterator<Item = (K, V)>) -> Self {
        Self::Map(entries.into_iter().collect())
    }

    /// Whether fallback resolution is switched off
    pub fn is_disabled(&self) -> bool {
        matches!(self, Self::Disabled)
    }

    /// Next language in the fallback chain of `language`
    ///
    /// Region-qualified tags fall back to their primary subtag before any
    /// configured fallback is consulted, unless the map names the tag itself.
    /// The result is always normalized.
    pub fn resolve(&self, language: &str, source_language: &str) -> String {
        let language = normalize(language);
        match self {
            Self::Disabled => language,
            Self::Unset => normalize(source_language),
            Self::Single(fallback) => {
                if has_region(&language) {
                    primary_subtag(&language).to_string()
                } else {
                    normalize(fallback)
                }
            }
            Self::Map(map) => {
                if let Some(fallback) = map.get(&language) {
                    return fallback.to_string();
                }
                if has_region(&language) {
                    return primary_subtag(&language).to_string();
                }
                // An empty map has no default; the language terminates its own chain
                match map.default_fallback() {
                    Some(fallback) => fallback.to_string(),
                    None => language,
                }
            }
        }
    }

    /// Languages visited from `language` until the chain would repeat one
    pub fn chain(&self, language: &str, source_language: &str) -> Vec<String> {
        let mut visited: Vec<String> = Vec::new();
        let mut current = normalize(language);
        while !visited.contains(&current) {
            let next = self.resolve(&current, source_language);
            visited.push(current);
            current = next;
        }
        visited
    }

    /// Every language tag named by the configuration
    pub fn languages(&self) -> Vec<&str> {
        match self {
            Self::Disabled | Self::Unset => Vec::new(),
            Self::Single(language) => vec![language.as_str()],
            Self::Map(map) => map.iter().flat_map(|(k, v)| [k, v]).collect(),
        }
    }
}

impl Serialize for FallbackConfig {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Disabled => serializer.serialize_bool(false),
            Self::Single(language) => serializer.serialize_str(language),
            Self::Map(map) => map.serialize(serializer),
            Self::Unset => serializer.serialize_none(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawFallback {
    Flag(bool),
    Single(String),
    Map(FallbackMap),
}

impl<'de> Deserialize<'de> for FallbackConfig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Option::<RawFallback>::deserialize(deserializer)? {
            None => Ok(Self::Unset),
            Some(RawFallback::Flag(false)) => Ok(Self::Disabled),
            Some(RawFallback::Flag(true)) => Err(de::Error::custom(
                "fallback_language accepts false, a language tag or a map, not true",
            )),
            Some(RawFallback::Single(language)) => Ok(Self::single(&language)),
            Some(RawFallback::Map(map)) => Ok(Self::Map(map)),
        }
    }
}
