//! Field extraction: pull the translatable, non-empty attributes out of an
//! entity record according to its schema.

use crate::schema::{FieldDef, FieldKind};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Value of a translatable field: a single string or an ordered list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
}

/// Translatable fields of one entity with non-empty source content.
///
/// Keys always come from the entity's field schema and value shapes match the
/// declared kind; [`extract_fields`] is the only constructor outside tests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldSet(BTreeMap<String, FieldValue>);

impl FieldSet {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    #[cfg(test)]
    pub(crate) fn insert(&mut self, key: &str, value: FieldValue) {
        self.0.insert(key.to_string(), value);
    }
}

/// Extract the non-empty translatable fields of `record`.
///
/// A text field is kept when it has non-whitespace content. A list field is
/// kept when at least one element is non-blank; blank or non-string elements
/// inside a kept list are preserved positionally as empty strings. Missing
/// attributes and values whose shape does not match the declared kind are
/// skipped.
pub fn extract_fields(record: &Map<String, Value>, defs: &[FieldDef]) -> FieldSet {
    let mut fields = BTreeMap::new();

    for def in defs {
        let Some(raw) = record.get(def.key) else {
            continue;
        };

        let value = match (def.kind, raw) {
            (FieldKind::Text | FieldKind::LongText, Value::String(text))
                if !text.trim().is_empty() =>
            {
                Some(FieldValue::Text(text.clone()))
            }
            (FieldKind::ListOfText, Value::Array(items)) => {
                let items: Vec<String> = items
                    .iter()
                    .map(|item| item.as_str().unwrap_or_default().to_string())
                    .collect();
                items
                    .iter()
                    .any(|item| !item.trim().is_empty())
                    .then_some(FieldValue::List(items))
            }
            _ => None,
        };

        if let Some(value) = value {
            fields.insert(def.key.to_string(), value);
        }
    }

    FieldSet(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::EntityType;
    use serde_json::json;

    fn record(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("test record must be an object"),
        }
    }

    // ==================== Text Field Tests ====================

    #[test]
    fn test_extracts_non_empty_text() {
        let rec = record(json!({"title": "Pyramids Tour", "description": "A great tour"}));
        let fields = extract_fields(&rec, EntityType::Tour.field_defs());

        assert_eq!(fields.len(), 2);
        assert_eq!(
            fields.get("title"),
            Some(&FieldValue::Text("Pyramids Tour".to_string()))
        );
        assert_eq!(
            fields.get("description"),
            Some(&FieldValue::Text("A great tour".to_string()))
        );
    }

    #[test]
    fn test_skips_whitespace_only_text() {
        let rec = record(json!({"title": "   \n\t", "description": ""}));
        let fields = extract_fields(&rec, EntityType::Tour.field_defs());
        assert!(fields.is_empty());
    }

    #[test]
    fn test_keeps_original_text_untrimmed() {
        let rec = record(json!({"title": "  Luxor by night "}));
        let fields = extract_fields(&rec, EntityType::Tour.field_defs());
        assert_eq!(
            fields.get("title"),
            Some(&FieldValue::Text("  Luxor by night ".to_string()))
        );
    }

    // ==================== List Field Tests ====================

    #[test]
    fn test_list_with_content_is_kept_positionally() {
        let rec = record(json!({"highlights": ["Giza plateau", "", null, "Sphinx"]}));
        let fields = extract_fields(&rec, EntityType::Tour.field_defs());

        assert_eq!(
            fields.get("highlights"),
            Some(&FieldValue::List(vec![
                "Giza plateau".to_string(),
                String::new(),
                String::new(),
                "Sphinx".to_string(),
            ]))
        );
    }

    #[test]
    fn test_list_of_blanks_is_skipped() {
        let rec = record(json!({"highlights": ["", "  "], "included": []}));
        let fields = extract_fields(&rec, EntityType::Tour.field_defs());
        assert!(fields.is_empty());
    }

    // ==================== Malformed Input Tests ====================

    #[test]
    fn test_shape_mismatch_is_skipped() {
        let rec = record(json!({
            "title": ["not", "a", "string"],
            "highlights": "not a list",
            "description": 42
        }));
        let fields = extract_fields(&rec, EntityType::Tour.field_defs());
        assert!(fields.is_empty());
    }

    #[test]
    fn test_attributes_outside_schema_are_ignored() {
        let rec = record(json!({"title": "Nile Cruise", "price": "120", "slug": "nile-cruise"}));
        let fields = extract_fields(&rec, EntityType::Tour.field_defs());

        assert_eq!(fields.keys().collect::<Vec<_>>(), vec!["title"]);
    }

    #[test]
    fn test_empty_record() {
        let fields = extract_fields(&Map::new(), EntityType::Category.field_defs());
        assert!(fields.is_empty());
    }

    // ==================== Serialization Tests ====================

    #[test]
    fn test_field_set_serializes_as_flat_object() {
        let rec = record(json!({"name": "Cairo", "description": "Capital"}));
        let fields = extract_fields(&rec, EntityType::Destination.field_defs());

        let json = serde_json::to_value(&fields).expect("Should serialize");
        assert_eq!(json, json!({"description": "Capital", "name": "Cairo"}));
    }
}
