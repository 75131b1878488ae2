use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use content_grid_api::content::{ContentRecord, ReadOutcome};

use super::AppState;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Deserialize)]
pub struct ContentWrite {
    /// Full document; replaces whatever is stored
    pub content: Value,
    /// Omitted keeps the stored flag (new records start unpublished)
    pub published: Option<bool>,
}

/// GET /api/content/:key - Normalized grid for a content key
pub async fn get(State(state): State<AppState>, Path(key): Path<String>) -> ApiResult<ReadOutcome> {
    let outcome = state.content.read(&key).await?;
    Ok(ApiResponse::success(outcome))
}

/// PUT /api/content/:key - Replace the stored document verbatim
pub async fn put(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(body): Json<ContentWrite>,
) -> ApiResult<ContentRecord> {
    if !body.content.is_object() {
        return Err(ApiError::bad_request("content must be a JSON object"));
    }

    let published = match body.published {
        Some(flag) => flag,
        None => state
            .content
            .store()
            .get(&key)
            .await?
            .map(|record| record.published)
            .unwrap_or(false),
    };

    let record = state.content.write(&key, body.content, published).await?;
    Ok(ApiResponse::success(record))
}
