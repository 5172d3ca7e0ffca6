use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use tracing::error;

use crate::bulk;
use crate::error::StoreError;
use crate::models::{
    BulkTranslationUpdate, TranslationKey, TranslationKeyCreate, TranslationKeyUpdate,
};
use crate::stats;
use crate::store::SupabaseStore;

#[derive(Clone)]
pub struct AppState {
    pub store: SupabaseStore,
}

pub fn router(store: SupabaseStore) -> Router {
    Router::new()
        .route(
            "/translation-keys",
            get(list_translation_keys).post(create_translation_key),
        )
        .route("/translation-keys/stats/completion", get(completion_stats))
        .route("/translation-keys/bulk-update", post(bulk_update))
        .route(
            "/translation-keys/:id",
            get(get_translation_key)
                .patch(update_translation_key)
                .delete(delete_translation_key),
        )
        .route("/localizations/:project_id/:locale", get(get_localizations))
        .with_state(AppState { store })
}

/// Boundary error: the store's taxonomy plus request-validation failures,
/// rendered as FastAPI-style `{"detail": ...}` payloads.
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    Conflict(String),
    Validation(String),
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::NotFound(detail) => (StatusCode::NOT_FOUND, detail),
            ApiError::Conflict(detail) => (StatusCode::CONFLICT, detail),
            ApiError::Validation(detail) => (StatusCode::UNPROCESSABLE_ENTITY, detail),
            ApiError::BadRequest(detail) => (StatusCode::BAD_REQUEST, detail),
            ApiError::Internal(detail) => (StatusCode::INTERNAL_SERVER_ERROR, detail),
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => ApiError::NotFound("Translation key not found".to_string()),
            StoreError::Conflict(key) => {
                ApiError::Conflict(format!("Translation key '{key}' already exists"))
            }
            StoreError::Infrastructure(_) => {
                error!("Store failure: {err}");
                ApiError::Internal(err.to_string())
            }
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    category: Option<String>,
    search: Option<String>,
    limit: Option<i64>,
    offset: Option<i64>,
}

async fn get_translation_key(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TranslationKey>, ApiError> {
    state
        .store
        .get(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Translation key not found".to_string()))
}

async fn list_translation_keys(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<TranslationKey>>, ApiError> {
    // The store applies limit/offset verbatim; the caps live here.
    let limit = query.limit.unwrap_or(100);
    if !(0..=100).contains(&limit) {
        return Err(ApiError::Validation(
            "limit must be between 0 and 100".to_string(),
        ));
    }
    let offset = query.offset.unwrap_or(0);
    if offset < 0 {
        return Err(ApiError::Validation("offset must be non-negative".to_string()));
    }

    let records = state
        .store
        .list(
            query.category.as_deref(),
            query.search.as_deref(),
            limit as u32,
            offset as u64,
        )
        .await?;
    Ok(Json(records))
}

async fn create_translation_key(
    State(state): State<AppState>,
    Json(draft): Json<TranslationKeyCreate>,
) -> Result<(StatusCode, Json<TranslationKey>), ApiError> {
    let created = state.store.create(draft).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_translation_key(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<TranslationKeyUpdate>,
) -> Result<Json<TranslationKey>, ApiError> {
    state
        .store
        .update(&id, update)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Translation key not found".to_string()))
}

async fn delete_translation_key(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.store.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn bulk_update(
    State(state): State<AppState>,
    Json(body): Json<BulkTranslationUpdate>,
) -> Result<Json<Value>, ApiError> {
    let updated =
        bulk::bulk_update_translations(&state.store, &body.translations, &body.updated_by).await;
    if updated {
        Ok(Json(json!({ "message": "Translations updated successfully" })))
    } else {
        Err(ApiError::BadRequest("Failed to update translations".to_string()))
    }
}

async fn completion_stats(
    State(state): State<AppState>,
) -> Result<Json<HashMap<String, f64>>, ApiError> {
    let stats = stats::completion_stats(&state.store).await?;
    Ok(Json(stats))
}

async fn get_localizations(
    State(state): State<AppState>,
    Path((project_id, locale)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    let localizations = state.store.fetch_locale_values(&locale).await?;
    Ok(Json(json!({
        "project_id": project_id,
        "locale": locale,
        "localizations": localizations,
    })))
}
