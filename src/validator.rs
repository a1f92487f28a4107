//! Translation quality validation.
//!
//! Compares one locale's translation against the source field set. Findings
//! are logged by callers; a translation is never rejected because of them.

use crate::bundle::LocaleTranslation;
use crate::fields::{FieldSet, FieldValue};
use crate::schema::FieldDef;
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// Validation report containing errors and warnings about a translation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Structural problems (missing fields, broken list correspondence)
    pub errors: Vec<String>,

    /// Non-critical issues (extra fields, lost URLs, overlong values)
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Check if the report is clean (no errors or warnings)
    pub fn is_clean(&self) -> bool {
        !self.has_errors() && !self.has_warnings()
    }
}

static URL_REGEX: OnceLock<Regex> = OnceLock::new();

fn extract_urls(text: &str) -> Vec<&str> {
    let regex = URL_REGEX.get_or_init(|| Regex::new(r"https?://[^\s)\]]+").unwrap());
    regex.find_iter(text).map(|m| m.as_str()).collect()
}

/// Validate one locale's translation against its source fields.
pub fn validate(source: &FieldSet, translated: &LocaleTranslation, defs: &[FieldDef]) -> ValidationReport {
    let mut report = ValidationReport::default();

    for (key, original) in source.iter() {
        let Some(value) = translated.get(key) else {
            report.errors.push(format!("Missing field '{}'", key));
            continue;
        };

        match (original, value) {
            (FieldValue::Text(orig), Value::String(text)) => {
                let orig_urls = extract_urls(orig);
                let trans_urls = extract_urls(text);
                if orig_urls != trans_urls {
                    report.warnings.push(format!(
                        "URL mismatch in '{}': original has {} URLs, translation has {}",
                        key,
                        orig_urls.len(),
                        trans_urls.len()
                    ));
                }

                let max = defs
                    .iter()
                    .find(|def| def.key == key)
                    .and_then(|def| def.max_length);
                if let Some(max) = max {
                    let len = text.chars().count();
                    if len > max {
                        report.warnings.push(format!(
                            "Field '{}' is {} characters, limit is {}",
                            key, len, max
                        ));
                    }
                }
            }
            (FieldValue::List(orig), Value::Array(items)) => {
                if orig.len() != items.len() {
                    report.errors.push(format!(
                        "List length mismatch in '{}': original has {} items, translation has {}",
                        key,
                        orig.len(),
                        items.len()
                    ));
                }
            }
            _ => {
                report
                    .errors
                    .push(format!("Shape mismatch in '{}': expected {}", key, shape(original)));
            }
        }
    }

    for key in translated.fields().keys() {
        if !source.contains_key(key) {
            report.warnings.push(format!("Unexpected field '{}'", key));
        }
    }

    report
}

fn shape(value: &FieldValue) -> &'static str {
    match value {
        FieldValue::Text(_) => "text",
        FieldValue::List(_) => "list",
    }
}
