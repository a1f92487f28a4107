//! Document store access.
//!
//! The pipeline reads an entity's attributes and writes its `translations`
//! attribute; nothing else about the storage schema is assumed.
//!
//! - `memory`: in-process store used by tests and local runs
//! - `postgres`: `sqlx` PostgreSQL store used in production

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use crate::bundle::TranslationBundle;
use crate::error::StoreError;
use crate::locale::LocaleRegistry;
use crate::schema::EntityType;
use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::info;

/// An entity as stored: opaque attributes plus its translation bundle.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityRecord {
    pub entity_type: EntityType,
    pub id: String,
    pub attributes: Map<String, Value>,
    pub translations: Option<TranslationBundle>,
}

impl EntityRecord {
    pub fn new(entity_type: EntityType, id: impl Into<String>, attributes: Map<String, Value>) -> Self {
        Self {
            entity_type,
            id: id.into(),
            attributes,
            translations: None,
        }
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Look up an entity; `Ok(None)` when it does not exist.
    async fn find(&self, entity_type: EntityType, id: &str) -> Result<Option<EntityRecord>, StoreError>;

    /// Merge `bundle` into the entity's `translations` attribute in one
    /// atomic step and return the stored result.
    ///
    /// Locales in `bundle` replace stored entries, other stored locales are
    /// kept, and any locale outside `registry` is removed.
    async fn merge_translations(
        &self,
        entity_type: EntityType,
        id: &str,
        bundle: &TranslationBundle,
        registry: &LocaleRegistry,
    ) -> Result<TranslationBundle, StoreError>;
}

/// Result of [`persist_bundle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistOutcome {
    /// Nothing was written because the bundle had no locales.
    Skipped,
    /// The merged bundle was written; `locales` is its size after merging.
    Written { locales: usize },
}

/// Persist a bundle onto an entity.
///
/// An empty bundle is never written, so an entity without translations does
/// not get an empty `translations` object. A non-empty bundle is merged over
/// the stored one locale by locale through
/// [`DocumentStore::merge_translations`], so concurrent writers never lose
/// each other's locales. Stored locales that are no longer in `registry` are
/// dropped on the way.
pub async fn persist_bundle(
    store: &dyn DocumentStore,
    registry: &LocaleRegistry,
    entity_type: EntityType,
    id: &str,
    bundle: &TranslationBundle,
) -> Result<PersistOutcome, StoreError> {
    if bundle.is_empty() {
        info!("No translations to persist for {} '{}', skipping write", entity_type, id);
        return Ok(PersistOutcome::Skipped);
    }

    let merged = store
        .merge_translations(entity_type, id, bundle, registry)
        .await?;
    info!(
        "Persisted translations for {} '{}' ({} locales)",
        entity_type,
        id,
        merged.len()
    );

    Ok(PersistOutcome::Written {
        locales: merged.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::LocaleTranslation;
    use crate::locale::Locale;
    use serde_json::json;
    use std::sync::Arc;

    fn translation(title: &str) -> LocaleTranslation {
        let mut map = Map::new();
        map.insert("title".to_string(), json!(title));
        LocaleTranslation::new(map)
    }

    fn single(locale: Locale, title: &str) -> TranslationBundle {
        let mut bundle = TranslationBundle::new();
        bundle.merge_locale(locale, translation(title));
        bundle
    }

    fn tour_record() -> EntityRecord {
        let mut attributes = Map::new();
        attributes.insert("title".to_string(), json!("Pyramids Tour"));
        EntityRecord::new(EntityType::Tour, "t1", attributes)
    }

    async fn store_with_tour() -> MemoryStore {
        let store = MemoryStore::new();
        store.insert(tour_record()).await;
        store
    }

    async fn stored(store: &MemoryStore) -> TranslationBundle {
        store
            .find(EntityType::Tour, "t1")
            .await
            .unwrap()
            .unwrap()
            .translations
            .unwrap_or_default()
    }

    // ==================== persist_bundle Tests ====================

    #[tokio::test]
    async fn test_empty_bundle_is_not_written() {
        let store = store_with_tour().await;
        let registry = LocaleRegistry::default();

        let outcome = persist_bundle(&store, &registry, EntityType::Tour, "t1", &TranslationBundle::new())
            .await
            .unwrap();

        assert_eq!(outcome, PersistOutcome::Skipped);
        assert_eq!(store.write_count(), 0);
        let record = store.find(EntityType::Tour, "t1").await.unwrap().unwrap();
        assert!(record.translations.is_none());
    }

    #[tokio::test]
    async fn test_bundle_is_written() {
        let store = store_with_tour().await;
        let bundle = single(Locale::Es, "Tour de las Pirámides");

        let outcome = persist_bundle(&store, &LocaleRegistry::default(), EntityType::Tour, "t1", &bundle)
            .await
            .unwrap();

        assert_eq!(outcome, PersistOutcome::Written { locales: 1 });
        assert_eq!(stored(&store).await, bundle);
    }

    #[tokio::test]
    async fn test_bundle_merges_over_existing() {
        let store = store_with_tour().await;
        let registry = LocaleRegistry::default();

        let mut first = single(Locale::Ar, "جولة");
        first.merge_locale(Locale::Es, translation("viejo"));
        persist_bundle(&store, &registry, EntityType::Tour, "t1", &first)
            .await
            .unwrap();

        let second = single(Locale::Es, "nuevo");
        let outcome = persist_bundle(&store, &registry, EntityType::Tour, "t1", &second)
            .await
            .unwrap();

        assert_eq!(outcome, PersistOutcome::Written { locales: 2 });
        let stored = stored(&store).await;
        assert_eq!(stored.get(Locale::Es).and_then(|t| t.text("title")), Some("nuevo"));
        assert_eq!(stored.get(Locale::Ar).and_then(|t| t.text("title")), Some("جولة"));
    }

    #[tokio::test]
    async fn test_missing_entity_is_not_found() {
        let store = MemoryStore::new();
        let bundle = single(Locale::Fr, "Bonjour");

        let err = persist_bundle(&store, &LocaleRegistry::default(), EntityType::Tour, "nope", &bundle)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_retired_locales_are_dropped_on_merge() {
        let store = MemoryStore::new();
        let mut existing = single(Locale::Zh, "金字塔之旅");
        existing.merge_locale(Locale::Fr, translation("Visite"));
        store
            .insert(EntityRecord {
                translations: Some(existing),
                ..tour_record()
            })
            .await;

        // Deployment narrowed to es + fr
        let registry = LocaleRegistry::new([Locale::Es, Locale::Fr]);
        let outcome = persist_bundle(&store, &registry, EntityType::Tour, "t1", &single(Locale::Es, "Tour"))
            .await
            .unwrap();

        assert_eq!(outcome, PersistOutcome::Written { locales: 2 });
        assert_eq!(stored(&store).await.locales(), vec![Locale::Es, Locale::Fr]);
    }

    // ==================== Concurrency Tests ====================

    #[tokio::test]
    async fn test_concurrent_merges_keep_every_locale() {
        let store = store_with_tour().await;
        let registry = LocaleRegistry::default();
        let es = single(Locale::Es, "Tour");
        let fr = single(Locale::Fr, "Visite");

        let (a, b) = tokio::join!(
            persist_bundle(&store, &registry, EntityType::Tour, "t1", &es),
            persist_bundle(&store, &registry, EntityType::Tour, "t1", &fr),
        );
        a.unwrap();
        b.unwrap();

        assert_eq!(stored(&store).await.locales(), vec![Locale::Es, Locale::Fr]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_parallel_writers_do_not_lose_locales() {
        let store = Arc::new(store_with_tour().await);
        let registry = Arc::new(LocaleRegistry::default());

        let handles: Vec<_> = Locale::ALL
            .into_iter()
            .map(|locale| {
                let store = store.clone();
                let registry = registry.clone();
                tokio::spawn(async move {
                    let bundle = single(locale, locale.native_name());
                    persist_bundle(store.as_ref(), &registry, EntityType::Tour, "t1", &bundle).await
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(stored(&store).await.len(), Locale::ALL.len());
        assert_eq!(store.write_count(), Locale::ALL.len());
    }
}
