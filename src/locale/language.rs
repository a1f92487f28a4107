//! Locale type: the closed set of languages content can be translated into.
//!
//! Every locale the pipeline can ever store is a variant of [`Locale`]. Codes
//! coming from outside (provider output, stored records, request bodies) go
//! through [`Locale::from_code`], so an arbitrary string can never end up as a
//! bundle key.

use crate::error::UnknownLocale;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Static metadata for a supported locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleInfo {
    /// ISO 639-1 code (e.g., "ar", "es")
    pub code: &'static str,

    /// English name of the language (e.g., "Arabic")
    pub name: &'static str,

    /// Native name of the language (e.g., "العربية")
    pub native_name: &'static str,

    /// Whether text in this locale is written right-to-left
    pub rtl: bool,
}

/// A supported target locale.
///
/// Variant order is the default canonical iteration order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    Ar,
    Es,
    Fr,
    De,
    It,
    Ru,
    Zh,
    Pt,
}

impl Locale {
    /// All supported locales in canonical order.
    pub const ALL: [Locale; 8] = [
        Locale::Ar,
        Locale::Es,
        Locale::Fr,
        Locale::De,
        Locale::It,
        Locale::Ru,
        Locale::Zh,
        Locale::Pt,
    ];

    /// Look up a locale by its code.
    ///
    /// Matching is exact: provider output such as `"ES"` or `"es-ES"` is not
    /// a supported code and yields `None`.
    pub fn from_code(code: &str) -> Option<Locale> {
        Self::ALL.into_iter().find(|locale| locale.code() == code)
    }

    /// Get the full metadata for this locale.
    pub fn info(self) -> &'static LocaleInfo {
        match self {
            Locale::Ar => &LocaleInfo {
                code: "ar",
                name: "Arabic",
                native_name: "العربية",
                rtl: true,
            },
            Locale::Es => &LocaleInfo {
                code: "es",
                name: "Spanish",
                native_name: "Español",
                rtl: false,
            },
            Locale::Fr => &LocaleInfo {
                code: "fr",
                name: "French",
                native_name: "Français",
                rtl: false,
            },
            Locale::De => &LocaleInfo {
                code: "de",
                name: "German",
                native_name: "Deutsch",
                rtl: false,
            },
            Locale::It => &LocaleInfo {
                code: "it",
                name: "Italian",
                native_name: "Italiano",
                rtl: false,
            },
            Locale::Ru => &LocaleInfo {
                code: "ru",
                name: "Russian",
                native_name: "Русский",
                rtl: false,
            },
            Locale::Zh => &LocaleInfo {
                code: "zh",
                name: "Chinese (Simplified)",
                native_name: "简体中文",
                rtl: false,
            },
            Locale::Pt => &LocaleInfo {
                code: "pt",
                name: "Portuguese",
                native_name: "Português",
                rtl: false,
            },
        }
    }

    /// ISO 639-1 code.
    pub fn code(self) -> &'static str {
        self.info().code
    }

    /// English display name.
    pub fn name(self) -> &'static str {
        self.info().name
    }

    pub fn native_name(self) -> &'static str {
        self.info().native_name
    }

    /// Right-to-left directionality (only Arabic in this set).
    pub fn is_rtl(self) -> bool {
        self.info().rtl
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = UnknownLocale;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Locale::from_code(s.trim()).ok_or_else(|| UnknownLocale(s.to_string()))
    }
}
