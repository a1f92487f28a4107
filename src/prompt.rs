//! Prompt construction for the text-generation provider.
//!
//! One builder serves both call shapes: the batch translator asks for every
//! canonical locale at once (response keyed by locale code), while the
//! dispatcher asks for one locale at a time (response is the field object
//! itself).

use crate::fields::FieldSet;
use crate::locale::Locale;
use crate::schema::FieldDef;
use std::fmt::Write;

/// Builds translation instructions for one entity's field set.
#[derive(Debug, Clone, Copy)]
pub struct PromptBuilder<'a> {
    entity_type: &'a str,
    fields: &'a FieldSet,
    defs: &'a [FieldDef],
}

impl<'a> PromptBuilder<'a> {
    /// # Arguments
    /// * `entity_type` - Free-text context for the translator (e.g., "tour")
    /// * `fields` - Source content to translate
    /// * `defs` - Schema of the entity, used for length limits and SEO hints
    pub fn new(entity_type: &'a str, fields: &'a FieldSet, defs: &'a [FieldDef]) -> Self {
        Self {
            entity_type,
            fields,
            defs,
        }
    }

    /// Prompt for all `locales` in a single call.
    ///
    /// The response must be a JSON object keyed by exactly these locale codes.
    pub fn for_locales(&self, locales: &[Locale]) -> String {
        let keys = locales
            .iter()
            .map(|locale| format!("\"{}\"", locale.code()))
            .collect::<Vec<_>>()
            .join(", ");

        let mut prompt = self.preamble(locales);
        let _ = write!(
            prompt,
            "\n## Output format\n\
             Respond with ONLY a JSON object, no markdown and no commentary. \
             Its top-level keys must be exactly: {keys}. \
             Each value is an object with the same field keys as the source."
        );
        prompt
    }

    /// Prompt for a single locale.
    ///
    /// The response must be a JSON object with the source's field keys.
    pub fn for_locale(&self, locale: Locale) -> String {
        let mut prompt = self.preamble(&[locale]);
        prompt.push_str(
            "\n## Output format\n\
             Respond with ONLY a JSON object, no markdown and no commentary, \
             with exactly the same field keys as the source.",
        );
        prompt
    }

    fn preamble(&self, locales: &[Locale]) -> String {
        let mut prompt = format!(
            "You are a professional translator for a travel booking website. \
             Translate the following {} content from English into each target language below.\n",
            self.entity_type
        );

        prompt.push_str("\n## Target languages\n");
        for locale in locales {
            let _ = write!(prompt, "- {}: {}", locale.code(), locale.name());
            if locale.is_rtl() {
                prompt.push_str(" (right-to-left script)");
            }
            prompt.push('\n');
        }

        let source = serde_json::to_string_pretty(self.fields).unwrap_or_default();
        let _ = write!(prompt, "\n## Source fields (JSON)\n{source}\n");

        prompt.push_str(
            "\n## Rules\n\
             - Translate every field present in the source. Do not add or drop fields.\n\
             - For list fields, return a list with exactly the same number of items, \
             translating each item in place so item N corresponds to source item N. \
             Keep empty items empty.\n\
             - Write proper nouns (places, landmarks, brands) the way they are commonly \
             written in each target language.\n\
             - Preserve URLs, numbers, prices and any markdown formatting.\n",
        );

        let seo: Vec<&str> = self
            .present_defs()
            .filter(|def| def.is_seo())
            .map(|def| def.key)
            .collect();
        if !seo.is_empty() {
            let _ = writeln!(
                prompt,
                "- SEO fields ({}) should read naturally and use the search terms travellers \
                 in each target language would actually type.",
                seo.join(", ")
            );
        }

        for def in self.present_defs() {
            if let Some(max) = def.max_length {
                let _ = writeln!(prompt, "- `{}` must not exceed {} characters.", def.key, max);
            }
        }

        prompt
    }

    /// Schema entries for fields that are actually being translated.
    fn present_defs(&self) -> impl Iterator<Item = &'a FieldDef> {
        let fields = self.fields;
        self.defs
            .iter()
            .filter(move |def| fields.contains_key(def.key))
    }
}
