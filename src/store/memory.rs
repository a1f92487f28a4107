use super::{DocumentStore, EntityRecord};
use crate::bundle::TranslationBundle;
use crate::error::StoreError;
use crate::locale::LocaleRegistry;
use crate::schema::EntityType;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

/// In-memory document store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<(EntityType, String), EntityRecord>>,
    writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a record.
    pub async fn insert(&self, record: EntityRecord) {
        let key = (record.entity_type, record.id.clone());
        self.records.write().await.insert(key, record);
    }

    /// Number of `merge_translations` calls that changed a record.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find(&self, entity_type: EntityType, id: &str) -> Result<Option<EntityRecord>, StoreError> {
        let records = self.records.read().await;
        Ok(records.get(&(entity_type, id.to_string())).cloned())
    }

    async fn merge_translations(
        &self,
        entity_type: EntityType,
        id: &str,
        bundle: &TranslationBundle,
        registry: &LocaleRegistry,
    ) -> Result<TranslationBundle, StoreError> {
        // Read and write under one guard so concurrent merges serialize
        let mut records = self.records.write().await;
        let record = records
            .get_mut(&(entity_type, id.to_string()))
            .ok_or_else(|| StoreError::NotFound {
                entity_type: entity_type.to_string(),
                id: id.to_string(),
            })?;

        let mut merged = record.translations.take().unwrap_or_default();
        merged.merge(bundle.clone());
        merged.retain_canonical(registry);

        record.translations = Some(merged.clone());
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(merged)
    }
}
