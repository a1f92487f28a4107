//! Locale registry: the canonical set of translation targets.
//!
//! The registry is an ordered, de-duplicated list of [`Locale`]s. It is built
//! once at startup (from configuration or the full supported set) and shared
//! read-only by every translation session.

use crate::error::UnknownLocale;
use crate::locale::Locale;

/// Ordered canonical locale set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleRegistry {
    locales: Vec<Locale>,
}

impl LocaleRegistry {
    /// Build a registry from locales, keeping first-seen order and dropping
    /// duplicates.
    pub fn new(locales: impl IntoIterator<Item = Locale>) -> Self {
        let mut ordered: Vec<Locale> = Vec::new();
        for locale in locales {
            if !ordered.contains(&locale) {
                ordered.push(locale);
            }
        }
        Self { locales: ordered }
    }

    /// Parse a comma-separated list of codes (e.g., `"ar,es,fr"`).
    ///
    /// Empty segments are ignored. Any unknown code is an error rather than
    /// being silently dropped, since this is operator configuration.
    pub fn from_codes(codes: &str) -> Result<Self, UnknownLocale> {
        let locales = codes
            .split(',')
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .map(str::parse::<Locale>)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(locales))
    }

    /// Locales in canonical order.
    pub fn locales(&self) -> &[Locale] {
        &self.locales
    }

    pub fn len(&self) -> usize {
        self.locales.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locales.is_empty()
    }

    pub fn contains(&self, locale: Locale) -> bool {
        self.locales.contains(&locale)
    }

    /// Resolve an untrusted code to a locale in this registry.
    ///
    /// Returns `None` both for codes that are not supported at all and for
    /// supported locales that are not part of this canonical set.
    pub fn resolve(&self, code: &str) -> Option<Locale> {
        Locale::from_code(code).filter(|locale| self.contains(*locale))
    }
}

impl Default for LocaleRegistry {
    fn default() -> Self {
        Self::new(Locale::ALL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_contains_all_supported() {
        let registry = LocaleRegistry::default();
        assert_eq!(registry.len(), Locale::ALL.len());
        assert_eq!(registry.locales()[0], Locale::Ar);
    }

    #[test]
    fn test_new_preserves_order_and_dedupes() {
        let registry = LocaleRegistry::new([Locale::Fr, Locale::Ar, Locale::Fr, Locale::Es]);
        assert_eq!(registry.locales(), &[Locale::Fr, Locale::Ar, Locale::Es]);
    }

    #[test]
    fn test_from_codes() {
        let registry = LocaleRegistry::from_codes("ar, es,fr,,de").expect("Should parse");
        assert_eq!(
            registry.locales(),
            &[Locale::Ar, Locale::Es, Locale::Fr, Locale::De]
        );
    }

    #[test]
    fn test_from_codes_unknown_is_error() {
        let err = LocaleRegistry::from_codes("ar,xx").unwrap_err();
        assert_eq!(err, UnknownLocale("xx".to_string()));
    }

    #[test]
    fn test_from_codes_empty_string() {
        let registry = LocaleRegistry::from_codes("").expect("Should parse");
        assert!(registry.is_empty());
    }

    #[test]
    fn test_resolve_respects_membership() {
        let registry = LocaleRegistry::new([Locale::Ar, Locale::Es]);
        assert_eq!(registry.resolve("es"), Some(Locale::Es));
        assert_eq!(registry.resolve("fr"), None); // supported, not canonical here
        assert_eq!(registry.resolve("en"), None);
    }
}
