//! Translation bundles: per-locale translated field sets.
//!
//! Provider output is free text and cannot be trusted to respect the locale
//! whitelist. Parsing therefore walks the canonical [`LocaleRegistry`] and
//! picks matching entries out of the response; keys that are not a canonical
//! locale code are never looked at, let alone stored.

use crate::locale::{Locale, LocaleRegistry};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::OnceLock;
use tracing::{debug, warn};

static CODE_FENCE_REGEX: OnceLock<Regex> = OnceLock::new();

/// Strip a surrounding markdown code fence (```` ```json ... ``` ````), which
/// some models add even when asked for bare JSON.
pub(crate) fn strip_code_fence(raw: &str) -> &str {
    let regex = CODE_FENCE_REGEX
        .get_or_init(|| Regex::new(r"(?s)^\s*```[a-zA-Z]*\s*\n?(.*?)\s*```\s*$").unwrap());

    match regex.captures(raw).and_then(|cap| cap.get(1)) {
        Some(inner) => inner.as_str(),
        None => raw.trim(),
    }
}

/// Parse raw provider text as a JSON object.
fn parse_object(raw: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(strip_code_fence(raw)) {
        Ok(Value::Object(map)) => Some(map),
        Ok(other) => {
            debug!("Provider output is JSON but not an object: {}", type_name(&other));
            None
        }
        Err(e) => {
            debug!("Provider output is not valid JSON: {}", e);
            None
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Translated fields for one locale.
///
/// Kept as the provider returned them: consumers tolerate extra or missing
/// fields, and quality problems are reported by the validator, not enforced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocaleTranslation(Map<String, Value>);

impl LocaleTranslation {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Parse a single-locale provider response.
    ///
    /// Accepts either the bare field object or the object wrapped under the
    /// locale's code (`{"fr": {...}}`), since models sometimes keep the batch
    /// shape. Returns `None` for anything that is not a JSON object.
    pub fn parse_provider_output(raw: &str, locale: Locale) -> Option<Self> {
        let mut map = parse_object(raw)?;

        let wrapped = map.len() == 1 && matches!(map.get(locale.code()), Some(Value::Object(_)));
        if wrapped {
            if let Some(Value::Object(inner)) = map.remove(locale.code()) {
                return Some(Self(inner));
            }
        }

        Some(Self(map))
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Translated scalar field, if present and a string.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Locale → translated fields. A locale absent from the bundle has no usable
/// translation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TranslationBundle(BTreeMap<Locale, LocaleTranslation>);

impl TranslationBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a bundle from a multi-locale provider response.
    ///
    /// Never fails: unparsable output yields an empty bundle, non-canonical
    /// keys are dropped, and locales whose value is not an object are
    /// skipped.
    pub fn parse_provider_output(raw: &str, registry: &LocaleRegistry) -> Self {
        match parse_object(raw) {
            Some(map) => Self::from_object(map, registry),
            None => Self::default(),
        }
    }

    /// Whitelist a JSON object against `registry`.
    pub fn from_object(map: Map<String, Value>, registry: &LocaleRegistry) -> Self {
        let mut bundle = BTreeMap::new();
        let mut dropped = Vec::new();

        for (code, value) in map {
            let Some(locale) = registry.resolve(&code) else {
                dropped.push(code);
                continue;
            };
            match value {
                Value::Object(fields) => {
                    bundle.insert(locale, LocaleTranslation(fields));
                }
                other => {
                    debug!("Dropping {} translation: value is {}", locale, type_name(&other));
                }
            }
        }

        if !dropped.is_empty() {
            warn!("Dropped non-canonical locale keys: {:?}", dropped);
        }

        Self(bundle)
    }

    /// Drop every locale that is not part of `registry`.
    pub fn retain_canonical(&mut self, registry: &LocaleRegistry) {
        self.0.retain(|locale, _| registry.contains(*locale));
    }

    /// Insert or replace one locale's entry, leaving every other locale as is.
    pub fn merge_locale(&mut self, locale: Locale, translation: LocaleTranslation) {
        self.0.insert(locale, translation);
    }

    /// Merge every locale of `other` into this bundle.
    pub fn merge(&mut self, other: TranslationBundle) {
        self.0.extend(other.0);
    }

    pub fn get(&self, locale: Locale) -> Option<&LocaleTranslation> {
        self.0.get(&locale)
    }

    pub fn contains(&self, locale: Locale) -> bool {
        self.0.contains_key(&locale)
    }

    /// Locales with a translation, in canonical enum order.
    pub fn locales(&self) -> Vec<Locale> {
        self.0.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Locale, &LocaleTranslation)> {
        self.0.iter().map(|(locale, translation)| (*locale, translation))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for TranslationBundle {
    /// Lenient: stored records and request bodies may carry keys for locales
    /// that are no longer supported. Those are dropped instead of failing the
    /// whole bundle.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = Map::<String, Value>::deserialize(deserializer)?;
        Ok(Self::from_object(map, &LocaleRegistry::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn four_locales() -> LocaleRegistry {
        LocaleRegistry::new([Locale::Ar, Locale::Es, Locale::Fr, Locale::De])
    }

    // ==================== Code Fence Tests ====================

    #[test]
    fn test_strip_code_fence_json() {
        let raw = "```json\n{\"a\": 1}\n```";
        assert_eq!(strip_code_fence(raw), "{\"a\": 1}");
    }

    #[test]
    fn test_strip_code_fence_plain() {
        let raw = "```\n{\"a\": 1}\n```\n";
        assert_eq!(strip_code_fence(raw), "{\"a\": 1}");
    }

    #[test]
    fn test_strip_code_fence_passthrough() {
        assert_eq!(strip_code_fence("  {\"a\": 1} "), "{\"a\": 1}");
    }

    // ==================== Bundle Parsing Tests ====================

    #[test]
    fn test_parse_all_locales() {
        let raw = json!({
            "ar": {"title": "جولة الأهرامات"},
            "es": {"title": "Tour de las Pirámides"},
            "fr": {"title": "Visite des Pyramides"},
            "de": {"title": "Pyramiden-Tour"}
        })
        .to_string();

        let bundle = TranslationBundle::parse_provider_output(&raw, &four_locales());

        assert_eq!(bundle.len(), 4);
        assert_eq!(
            bundle.get(Locale::Es).and_then(|t| t.text("title")),
            Some("Tour de las Pirámides")
        );
    }

    #[test]
    fn test_parse_drops_non_canonical_keys() {
        let raw = json!({
            "es": {"title": "Hola"},
            "en": {"title": "Hello"},
            "xx": {"title": "?"},
            "__proto__": {"polluted": true},
            "it": {"title": "Ciao"}
        })
        .to_string();

        let bundle = TranslationBundle::parse_provider_output(&raw, &four_locales());

        // "it" is a supported locale but not canonical for this registry
        assert_eq!(bundle.locales(), vec![Locale::Es]);
        let json = serde_json::to_value(&bundle).unwrap();
        assert!(json.get("en").is_none());
        assert!(json.get("__proto__").is_none());
        assert!(json.get("it").is_none());
    }

    #[test]
    fn test_parse_drops_non_object_locale_values() {
        let raw = json!({
            "es": "Tour de las Pirámides",
            "fr": ["Visite"],
            "de": null,
            "ar": {"title": "جولة"}
        })
        .to_string();

        let bundle = TranslationBundle::parse_provider_output(&raw, &four_locales());
        assert_eq!(bundle.locales(), vec![Locale::Ar]);
    }

    #[test]
    fn test_parse_invalid_json_is_empty() {
        let bundle = TranslationBundle::parse_provider_output("{not json", &four_locales());
        assert!(bundle.is_empty());
    }

    #[test]
    fn test_parse_non_object_json_is_empty() {
        let bundle = TranslationBundle::parse_provider_output("[1, 2, 3]", &four_locales());
        assert!(bundle.is_empty());
    }

    #[test]
    fn test_parse_fenced_output() {
        let raw = "```json\n{\"fr\": {\"title\": \"Bonjour\"}}\n```";
        let bundle = TranslationBundle::parse_provider_output(raw, &four_locales());
        assert_eq!(bundle.locales(), vec![Locale::Fr]);
    }

    #[test]
    fn test_parse_preserves_list_lengths() {
        let raw = json!({
            "es": {"highlights": ["Giza", "", "Esfinge"]}
        })
        .to_string();

        let bundle = TranslationBundle::parse_provider_output(&raw, &four_locales());
        let highlights = bundle
            .get(Locale::Es)
            .and_then(|t| t.get("highlights"))
            .and_then(Value::as_array)
            .unwrap();
        assert_eq!(highlights.len(), 3);
    }

    // ==================== Single Locale Parsing Tests ====================

    #[test]
    fn test_locale_output_bare_object() {
        let translation =
            LocaleTranslation::parse_provider_output(r#"{"title": "Bonjour"}"#, Locale::Fr)
                .unwrap();
        assert_eq!(translation.text("title"), Some("Bonjour"));
    }

    #[test]
    fn test_locale_output_wrapped_in_code() {
        let translation = LocaleTranslation::parse_provider_output(
            r#"{"fr": {"title": "Bonjour"}}"#,
            Locale::Fr,
        )
        .unwrap();
        assert_eq!(translation.text("title"), Some("Bonjour"));
        assert_eq!(translation.len(), 1);
    }

    #[test]
    fn test_locale_output_field_named_like_other_locale_is_kept() {
        // A single field whose key happens to be another locale code is content.
        let translation =
            LocaleTranslation::parse_provider_output(r#"{"es": {"x": 1}}"#, Locale::Fr).unwrap();
        assert!(translation.get("es").is_some());
    }

    #[test]
    fn test_locale_output_invalid() {
        assert!(LocaleTranslation::parse_provider_output("nope", Locale::Fr).is_none());
        assert!(LocaleTranslation::parse_provider_output("\"str\"", Locale::Fr).is_none());
    }

    // ==================== Merge Tests ====================

    #[test]
    fn test_merge_locale_is_additive() {
        let mut bundle = TranslationBundle::new();
        bundle.merge_locale(Locale::Es, LocaleTranslation::new(Map::new()));
        bundle.merge_locale(Locale::Fr, LocaleTranslation::new(Map::new()));

        let mut replacement = Map::new();
        replacement.insert("title".to_string(), json!("Hola"));
        bundle.merge_locale(Locale::Es, LocaleTranslation::new(replacement));

        assert_eq!(bundle.locales(), vec![Locale::Es, Locale::Fr]);
        assert_eq!(bundle.get(Locale::Es).and_then(|t| t.text("title")), Some("Hola"));
    }

    #[test]
    fn test_merge_bundles() {
        let mut existing =
            TranslationBundle::parse_provider_output(r#"{"ar": {"t": "a"}, "es": {"t": "old"}}"#, &four_locales());
        let incoming = TranslationBundle::parse_provider_output(r#"{"es": {"t": "new"}}"#, &four_locales());

        existing.merge(incoming);

        assert_eq!(existing.len(), 2);
        assert_eq!(existing.get(Locale::Es).and_then(|t| t.text("t")), Some("new"));
        assert_eq!(existing.get(Locale::Ar).and_then(|t| t.text("t")), Some("a"));
    }

    // ==================== Serde Tests ====================

    #[test]
    fn test_bundle_serializes_keyed_by_code() {
        let bundle = TranslationBundle::parse_provider_output(r#"{"de": {"t": "x"}}"#, &four_locales());
        assert_eq!(serde_json::to_value(&bundle).unwrap(), json!({"de": {"t": "x"}}));
    }

    #[test]
    fn test_bundle_deserialize_drops_unknown_keys() {
        let bundle: TranslationBundle =
            serde_json::from_value(json!({"pt": {"t": "x"}, "klingon": {"t": "y"}})).unwrap();
        assert_eq!(bundle.locales(), vec![Locale::Pt]);
    }
}
