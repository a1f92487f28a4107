//! Batch translation: every canonical locale in one provider call.
//!
//! Used when the caller wants one atomic result, typically while saving an
//! entity. Translation failure is never an error here: the caller gets an
//! empty bundle and carries on without translations.

use crate::bundle::TranslationBundle;
use crate::error::StoreError;
use crate::fields::{extract_fields, FieldSet};
use crate::locale::LocaleRegistry;
use crate::metrics::TranslationMetrics;
use crate::prompt::PromptBuilder;
use crate::provider::TextGenerator;
use crate::schema::{EntityType, FieldDef};
use crate::store::{persist_bundle, DocumentStore, PersistOutcome};
use crate::validator;
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Clone)]
pub struct BatchTranslator {
    provider: Arc<dyn TextGenerator>,
    locales: Arc<LocaleRegistry>,
}

impl BatchTranslator {
    pub fn new(provider: Arc<dyn TextGenerator>, locales: Arc<LocaleRegistry>) -> Self {
        Self { provider, locales }
    }

    /// Translate `fields` into every canonical locale with a single provider call.
    ///
    /// Returns an empty bundle, without contacting the provider, when there is
    /// nothing to translate. Provider errors and unparsable output also yield
    /// an empty bundle.
    pub async fn translate(
        &self,
        fields: &FieldSet,
        defs: &[FieldDef],
        entity_type: &str,
    ) -> TranslationBundle {
        if fields.is_empty() || self.locales.is_empty() {
            return TranslationBundle::new();
        }

        let prompt = PromptBuilder::new(entity_type, fields, defs).for_locales(self.locales.locales());
        let metrics = TranslationMetrics::global();
        metrics.record_provider_call();

        let raw = match self.provider.generate_json(&prompt).await {
            Ok(raw) => raw,
            Err(e) => {
                error!("Batch translation of {} failed: {}", entity_type, e);
                metrics.record_provider_failure();
                return TranslationBundle::new();
            }
        };

        let bundle = TranslationBundle::parse_provider_output(&raw, &self.locales);
        if bundle.is_empty() {
            warn!("Batch translation of {} produced no usable locales", entity_type);
            metrics.record_provider_failure();
            return bundle;
        }

        for (locale, translation) in bundle.iter() {
            let report = validator::validate(fields, translation, defs);
            if report.has_errors() {
                warn!(
                    "Translation validation errors for {} ({}): {:?}",
                    locale.name(),
                    locale.code(),
                    report.errors
                );
            }
            if report.has_warnings() {
                warn!(
                    "Translation validation warnings for {} ({}): {:?}",
                    locale.name(),
                    locale.code(),
                    report.warnings
                );
            }
        }

        metrics.record_locales_translated(bundle.len());
        info!(
            "Batch translated {} into {}/{} locales",
            entity_type,
            bundle.len(),
            self.locales.len()
        );
        bundle
    }

    /// Translate a stored entity and persist the result.
    ///
    /// Only store failures are errors; a translation failure results in
    /// [`PersistOutcome::Skipped`] with an empty bundle.
    pub async fn translate_entity(
        &self,
        store: &dyn DocumentStore,
        entity_type: EntityType,
        id: &str,
    ) -> Result<(TranslationBundle, PersistOutcome), StoreError> {
        let record = store
            .find(entity_type, id)
            .await?
            .ok_or_else(|| StoreError::NotFound {
                entity_type: entity_type.to_string(),
                id: id.to_string(),
            })?;

        let defs = entity_type.field_defs();
        let fields = extract_fields(&record.attributes, defs);
        let bundle = self.translate(&fields, defs, entity_type.as_str()).await;

        let outcome = persist_bundle(store, &self.locales, entity_type, id, &bundle).await?;
        Ok((bundle, outcome))
    }
}
