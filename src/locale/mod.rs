//! Locale support for translation targets.
//!
//! - `language`: the closed [`Locale`] enum and its static metadata
//! - `registry`: the ordered canonical set a deployment translates into

mod language;
mod registry;

pub use language::{Locale, LocaleInfo};
pub use registry::LocaleRegistry;
