//! Streaming translation: one provider call per locale, one event per result.
//!
//! A session walks the canonical locales strictly in order. Each event is
//! handed to the output channel as soon as it exists, so the first locale's
//! result reaches the caller while later locales are still being translated.
//! The channel holds a single event: the dispatcher never runs ahead of the
//! consumer.

use crate::bundle::LocaleTranslation;
use crate::events::StreamEvent;
use crate::fields::{extract_fields, FieldSet};
use crate::locale::{Locale, LocaleRegistry};
use crate::metrics::TranslationMetrics;
use crate::prompt::PromptBuilder;
use crate::provider::TextGenerator;
use crate::schema::{EntityType, FieldDef};
use crate::store::{DocumentStore, EntityRecord};
use crate::validator;
use futures::Stream;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{error, info, info_span, warn, Instrument};

#[derive(Clone)]
pub struct LocaleDispatcher {
    store: Arc<dyn DocumentStore>,
    provider: Arc<dyn TextGenerator>,
    locales: Arc<LocaleRegistry>,
}

impl LocaleDispatcher {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        provider: Arc<dyn TextGenerator>,
        locales: Arc<LocaleRegistry>,
    ) -> Self {
        Self {
            store,
            provider,
            locales,
        }
    }

    /// Start a session for `entity_type`/`id` on a background task.
    ///
    /// Dropping the returned receiver cancels the session: no further
    /// provider calls are started and an in-flight call is abandoned.
    pub fn spawn(&self, entity_type: &str, id: &str) -> mpsc::Receiver<StreamEvent> {
        let (tx, rx) = mpsc::channel(1);
        let span = info_span!("translation_session", entity_type = %entity_type, id = %id);

        let dispatcher = self.clone();
        let entity_type = entity_type.to_string();
        let id = id.to_string();
        tokio::spawn(async move { dispatcher.run(&entity_type, &id, tx).await }.instrument(span));

        rx
    }

    /// [`spawn`](Self::spawn) as a `Stream` of events.
    pub fn stream(&self, entity_type: &str, id: &str) -> impl Stream<Item = StreamEvent> {
        ReceiverStream::new(self.spawn(entity_type, id))
    }

    async fn run(&self, entity_type: &str, id: &str, tx: mpsc::Sender<StreamEvent>) {
        let metrics = TranslationMetrics::global();
        metrics.record_session_started();

        let (entity_type, record) = match self.resolve(entity_type, id).await {
            Ok(resolved) => resolved,
            Err(message) => {
                error!("Translation session failed: {}", message);
                let _ = tx.send(StreamEvent::session_error(message)).await;
                return;
            }
        };

        let defs = entity_type.field_defs();
        let fields = extract_fields(&record.attributes, defs);
        if fields.is_empty() {
            let message = format!("{} '{}' has no translatable content", entity_type, id);
            warn!("{}", message);
            let _ = tx.send(StreamEvent::session_error(message)).await;
            return;
        }

        info!(
            "Translating {} fields into {} locales",
            fields.len(),
            self.locales.len()
        );
        let prompts = PromptBuilder::new(entity_type.as_str(), &fields, defs);

        for &locale in self.locales.locales() {
            if tx.is_closed() || tx.send(StreamEvent::Translating { locale }).await.is_err() {
                info!("Client disconnected before {}, stopping", locale);
                metrics.record_session_cancelled();
                return;
            }

            let event = tokio::select! {
                biased;
                event = self.translate_locale(&prompts, &fields, defs, locale) => event,
                _ = tx.closed() => {
                    info!("Client disconnected during {}, stopping", locale);
                    metrics.record_session_cancelled();
                    return;
                }
            };

            if tx.send(event).await.is_err() {
                info!("Client disconnected after {}, stopping", locale);
                metrics.record_session_cancelled();
                return;
            }
        }

        info!("✓ Translation session complete");
    }

    /// Parse the entity type and load the record; the error is the message
    /// for the fatal session event.
    async fn resolve(&self, entity_type: &str, id: &str) -> Result<(EntityType, EntityRecord), String> {
        let entity_type: EntityType = entity_type.parse().map_err(|e| format!("{}", e))?;

        match self.store.find(entity_type, id).await {
            Ok(Some(record)) => Ok((entity_type, record)),
            Ok(None) => Err(format!("{} '{}' not found", entity_type, id)),
            Err(e) => {
                error!("Failed to load {} '{}': {}", entity_type, id, e);
                Err(format!("failed to load {} '{}'", entity_type, id))
            }
        }
    }

    /// One provider call for one locale. Never fails: problems become a
    /// locale-scoped `error` event.
    async fn translate_locale(
        &self,
        prompts: &PromptBuilder<'_>,
        fields: &FieldSet,
        defs: &[FieldDef],
        locale: Locale,
    ) -> StreamEvent {
        let metrics = TranslationMetrics::global();
        metrics.record_provider_call();

        let raw = match self.provider.generate_json(&prompts.for_locale(locale)).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Translation to {} ({}) failed: {}", locale.name(), locale.code(), e);
                metrics.record_provider_failure();
                metrics.record_locale_failed();
                return StreamEvent::locale_error(locale, e.to_string());
            }
        };

        let translation = match LocaleTranslation::parse_provider_output(&raw, locale) {
            Some(translation) if !translation.is_empty() => translation,
            _ => {
                warn!(
                    "Translation to {} ({}) returned unusable output",
                    locale.name(),
                    locale.code()
                );
                metrics.record_provider_failure();
                metrics.record_locale_failed();
                return StreamEvent::locale_error(locale, "provider returned malformed output");
            }
        };

        let report = validator::validate(fields, &translation, defs);
        if !report.is_clean() {
            warn!(
                "Translation validation for {} ({}): errors {:?}, warnings {:?}",
                locale.name(),
                locale.code(),
                report.errors,
                report.warnings
            );
        }

        metrics.record_locales_translated(1);
        StreamEvent::LocaleDone {
            locale,
            translation,
        }
    }
}
