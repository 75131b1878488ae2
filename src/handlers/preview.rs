use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use content_grid_api::content::{
    derive_and_compact, scalar_text, CanonicalGrid, DerivedValue, ExplicitValue,
};

use super::AppState;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Deserialize)]
pub struct NormalizeQuery {
    /// Content key whose seed default applies when nothing usable is found
    pub key: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NormalizePreview {
    pub grid: CanonicalGrid,
    pub seeded: bool,
}

/// POST /api/normalize - Normalize a raw document without storing it
pub async fn normalize(
    State(state): State<AppState>,
    Query(query): Query<NormalizeQuery>,
    Json(raw): Json<Value>,
) -> ApiResult<NormalizePreview> {
    let key = query.key.as_deref().unwrap_or(content_grid_api::content::seed::FALLBACK_KEY);
    let normalized = state.content.normalizer().normalize(key, &raw);

    Ok(ApiResponse::success(NormalizePreview {
        grid: normalized.grid,
        seeded: normalized.seeded,
    }))
}

/// POST /api/derive - Display value for `{title, subtitle, value?, prefix?, suffix?}`
pub async fn derive(Json(body): Json<Value>) -> ApiResult<DerivedValue> {
    let Some(fields) = body.as_object() else {
        return Err(ApiError::bad_request("body must be a JSON object"));
    };

    let title = fields.get("title").and_then(scalar_text);
    let subtitle = fields.get("subtitle").and_then(scalar_text);
    let explicit = ExplicitValue::from_object(fields);

    Ok(ApiResponse::success(derive_and_compact(
        title.as_deref(),
        subtitle.as_deref(),
        &explicit,
    )))
}
