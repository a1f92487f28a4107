//! HTTP surface.
//!
//! - `GET  /health`
//! - `GET  /api/translations/metrics`
//! - `POST /api/translations/:entity_type/:id` batch translate and persist
//! - `PUT  /api/translations/:entity_type/:id` save an edited bundle
//! - `GET  /api/translations/:entity_type/:id/stream` per-locale event stream

use crate::batch::BatchTranslator;
use crate::bundle::TranslationBundle;
use crate::dispatcher::LocaleDispatcher;
use crate::error::{StoreError, UnknownEntityType};
use crate::framer;
use crate::locale::{Locale, LocaleRegistry};
use crate::metrics::TranslationMetrics;
use crate::provider::TextGenerator;
use crate::schema::EntityType;
use crate::store::{persist_bundle, DocumentStore, PersistOutcome};
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::StreamExt;
use serde::Serialize;
use serde_json::{json, Value};
use std::convert::Infallible;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn DocumentStore>,
    batch: BatchTranslator,
    dispatcher: LocaleDispatcher,
    locales: Arc<LocaleRegistry>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        provider: Arc<dyn TextGenerator>,
        locales: LocaleRegistry,
    ) -> Self {
        let locales = Arc::new(locales);
        Self {
            batch: BatchTranslator::new(provider.clone(), locales.clone()),
            dispatcher: LocaleDispatcher::new(store.clone(), provider, locales.clone()),
            store,
            locales,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/translations/metrics", get(metrics))
        .route(
            "/api/translations/:entity_type/:id",
            post(translate_entity).put(save_translations),
        )
        .route("/api/translations/:entity_type/:id/stream", get(stream_translations))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Response body for batch translation and editor saves.
#[derive(Debug, Serialize)]
struct TranslationResponse {
    locales: Vec<Locale>,
    persisted: bool,
}

impl TranslationResponse {
    fn new(bundle: &TranslationBundle, outcome: PersistOutcome) -> Self {
        Self {
            locales: bundle.locales(),
            persisted: matches!(outcome, PersistOutcome::Written { .. }),
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum ApiError {
    #[error(transparent)]
    EntityType(#[from] UnknownEntityType),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("request body must be a JSON object keyed by locale code")]
    InvalidBody,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::EntityType(_) | ApiError::InvalidBody => StatusCode::BAD_REQUEST,
            ApiError::Store(StoreError::NotFound { .. }) => StatusCode::NOT_FOUND,
            ApiError::Store(e) => {
                error!("Store failure: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn metrics() -> Json<crate::metrics::MetricsReport> {
    Json(TranslationMetrics::global().report())
}

async fn translate_entity(
    State(state): State<AppState>,
    Path((entity_type, id)): Path<(String, String)>,
) -> Result<Json<TranslationResponse>, ApiError> {
    let entity_type: EntityType = entity_type.parse()?;
    info!("Batch translating {} '{}'", entity_type, id);

    let (bundle, outcome) = state
        .batch
        .translate_entity(state.store.as_ref(), entity_type, &id)
        .await?;

    Ok(Json(TranslationResponse::new(&bundle, outcome)))
}

async fn save_translations(
    State(state): State<AppState>,
    Path((entity_type, id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Result<Json<TranslationResponse>, ApiError> {
    let entity_type: EntityType = entity_type.parse()?;
    let Value::Object(map) = body else {
        return Err(ApiError::InvalidBody);
    };

    let bundle = TranslationBundle::from_object(map, &state.locales);
    let outcome =
        persist_bundle(state.store.as_ref(), &state.locales, entity_type, &id, &bundle).await?;
    info!("Saved {} locales for {} '{}'", bundle.len(), entity_type, id);

    Ok(Json(TranslationResponse::new(&bundle, outcome)))
}

async fn stream_translations(
    State(state): State<AppState>,
    Path((entity_type, id)): Path<(String, String)>,
) -> Response {
    // Unknown types and missing entities are reported in-stream as session
    // errors, so clients only need one error path.
    let frames = state
        .dispatcher
        .stream(&entity_type, &id)
        .map(|event| Ok::<_, Infallible>(framer::encode(&event)));

    (
        [
            (header::CONTENT_TYPE, "text/event-stream"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        Body::from_stream(frames),
    )
        .into_response()
}
