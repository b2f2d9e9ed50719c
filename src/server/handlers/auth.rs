use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::core::errors::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<Credentials>,
) -> Result<impl IntoResponse, ApiError> {
    let (Some(username), Some(password)) = (
        payload.username.filter(|v| !v.is_empty()),
        payload.password.filter(|v| !v.is_empty()),
    ) else {
        return Err(ApiError::BadRequest(
            "Username and password required".to_string(),
        ));
    };

    let user_id = state.catalog.register_user(&username, &password).await?;
    tracing::info!(user_id, "Registered user");

    Ok(Json(json!({
        "message": "User registered successfully",
        "userId": user_id
    })))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<Credentials>,
) -> Result<impl IntoResponse, ApiError> {
    let username = payload.username.unwrap_or_default();
    let password = payload.password.unwrap_or_default();

    let user = state
        .catalog
        .authenticate(&username, &password)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid credentials".to_string()))?;

    Ok(Json(json!({
        "message": "Login successful",
        "user": { "id": user.id, "username": user.username }
    })))
}
