//! Stream events: the unit exchanged between dispatcher and consumer.
//!
//! Each event travels as a named frame (`translating`, `locale_done`,
//! `error`) with a JSON data payload. See [`crate::framer`] for the byte
//! framing.

use crate::bundle::LocaleTranslation;
use crate::locale::Locale;
use serde_json::{json, Map, Value};
use tracing::debug;

pub const TRANSLATING: &str = "translating";
pub const LOCALE_DONE: &str = "locale_done";
pub const ERROR: &str = "error";

#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// The dispatcher started working on `locale`.
    Translating { locale: Locale },

    /// `locale` finished with a usable translation.
    LocaleDone {
        locale: Locale,
        translation: LocaleTranslation,
    },

    /// `locale` failed, or, with no locale, the whole session failed.
    Error {
        locale: Option<Locale>,
        message: String,
    },
}

impl StreamEvent {
    pub fn locale_error(locale: Locale, message: impl Into<String>) -> Self {
        StreamEvent::Error {
            locale: Some(locale),
            message: message.into(),
        }
    }

    pub fn session_error(message: impl Into<String>) -> Self {
        StreamEvent::Error {
            locale: None,
            message: message.into(),
        }
    }

    /// Frame name on the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            StreamEvent::Translating { .. } => TRANSLATING,
            StreamEvent::LocaleDone { .. } => LOCALE_DONE,
            StreamEvent::Error { .. } => ERROR,
        }
    }

    /// JSON payload carried in the frame's data line.
    pub fn data(&self) -> Value {
        match self {
            StreamEvent::Translating { locale } => json!({ "locale": locale.code() }),
            StreamEvent::LocaleDone {
                locale,
                translation,
            } => json!({
                "locale": locale.code(),
                "translation": translation.fields(),
            }),
            StreamEvent::Error { locale, message } => {
                let mut data = Map::new();
                if let Some(locale) = locale {
                    data.insert("locale".to_string(), json!(locale.code()));
                }
                data.insert("message".to_string(), json!(message));
                Value::Object(data)
            }
        }
    }

    /// Interpret a complete frame.
    ///
    /// Returns `None` for unknown frame names and for payloads that do not
    /// fit the event: a missing or unsupported locale, a non-object
    /// translation. An `error` frame naming a locale that cannot be resolved
    /// is dropped rather than read as a session-level failure.
    pub fn from_frame(kind: &str, data: Value) -> Option<StreamEvent> {
        let Value::Object(mut data) = data else {
            debug!("Ignoring {} frame with non-object data", kind);
            return None;
        };

        let locale = match data.get("locale") {
            None | Some(Value::Null) => None,
            Some(value) => match value.as_str().and_then(Locale::from_code) {
                Some(locale) => Some(locale),
                None => {
                    debug!("Ignoring {} frame for unsupported locale {}", kind, value);
                    return None;
                }
            },
        };

        match kind {
            TRANSLATING => locale.map(|locale| StreamEvent::Translating { locale }),
            LOCALE_DONE => {
                let locale = locale?;
                match data.remove("translation") {
                    Some(Value::Object(fields)) => Some(StreamEvent::LocaleDone {
                        locale,
                        translation: LocaleTranslation::new(fields),
                    }),
                    _ => {
                        debug!("Ignoring locale_done for {} without a translation object", locale);
                        None
                    }
                }
            }
            ERROR => Some(StreamEvent::Error {
                locale,
                message: data
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            }),
            other => {
                debug!("Ignoring unknown frame '{}'", other);
                None
            }
        }
    }
}
