use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::core::errors::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct MedicineQuery {
    pub search: Option<String>,
}

pub async fn list_medicines(
    State(state): State<Arc<AppState>>,
    Query(params): Query<MedicineQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let medicines = state
        .catalog
        .search_catalog(params.search.as_deref(), state.settings.catalog.browse_limit)
        .await?;
    Ok(Json(json!({ "medicines": medicines })))
}
