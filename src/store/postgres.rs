use super::{DocumentStore, EntityRecord};
use crate::bundle::TranslationBundle;
use crate::error::StoreError;
use crate::locale::LocaleRegistry;
use crate::schema::EntityType;
use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Row;
use tracing::info;

/// PostgreSQL-backed document store.
///
/// Entities live in a single `entities` table keyed by `(entity_type, id)`,
/// with attributes and translations as JSONB documents.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect and make sure the `entities` table exists.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        info!("✓ Document store ready");
        Ok(store)
    }

    async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS entities (
                entity_type TEXT NOT NULL,
                id TEXT NOT NULL,
                attributes JSONB NOT NULL DEFAULT '{}'::jsonb,
                translations JSONB,
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                PRIMARY KEY (entity_type, id)
            )",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for PgStore {
    async fn find(&self, entity_type: EntityType, id: &str) -> Result<Option<EntityRecord>, StoreError> {
        let row = sqlx::query(
            "SELECT attributes, translations FROM entities WHERE entity_type = $1 AND id = $2",
        )
        .bind(entity_type.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let attributes = match row.try_get::<Value, _>("attributes")? {
            Value::Object(map) => map,
            other => {
                return Err(StoreError::Corrupt(format!(
                    "attributes of {} '{}' is not an object: {}",
                    entity_type, id, other
                )))
            }
        };

        let translations = row
            .try_get::<Option<Value>, _>("translations")?
            .map(serde_json::from_value::<TranslationBundle>)
            .transpose()
            .map_err(|e| StoreError::Corrupt(format!("translations of {} '{}': {}", entity_type, id, e)))?;

        Ok(Some(EntityRecord {
            entity_type,
            id: id.to_string(),
            attributes,
            translations,
        }))
    }

    async fn merge_translations(
        &self,
        entity_type: EntityType,
        id: &str,
        bundle: &TranslationBundle,
        registry: &LocaleRegistry,
    ) -> Result<TranslationBundle, StoreError> {
        let document = serde_json::to_value(bundle)
            .map_err(|e| StoreError::Corrupt(format!("cannot encode translations: {}", e)))?;
        let canonical: Vec<String> = registry
            .locales()
            .iter()
            .map(|locale| locale.code().to_string())
            .collect();

        // One statement: the row lock serializes concurrent merges, and the
        // JSONB concatenation replaces only the locales present in $1.
        let row = sqlx::query(
            "UPDATE entities
             SET translations = (
                     SELECT COALESCE(jsonb_object_agg(key, value), '{}'::jsonb)
                     FROM jsonb_each(COALESCE(translations, '{}'::jsonb) || $1)
                     WHERE key = ANY($2)
                 ),
                 updated_at = $3
             WHERE entity_type = $4 AND id = $5
             RETURNING translations",
        )
        .bind(document)
        .bind(canonical)
        .bind(Utc::now())
        .bind(entity_type.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Err(StoreError::NotFound {
                entity_type: entity_type.to_string(),
                id: id.to_string(),
            });
        };

        serde_json::from_value(row.try_get::<Value, _>("translations")?)
            .map_err(|e| StoreError::Corrupt(format!("translations of {} '{}': {}", entity_type, id, e)))
    }
}
