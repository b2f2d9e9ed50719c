use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::chat::ChatOutcome;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
}

pub async fn chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> impl IntoResponse {
    // An absent or malformed body reads as an empty message.
    let message = match payload {
        Ok(Json(request)) => request.message.unwrap_or_default(),
        Err(rejection) => {
            tracing::debug!("Unreadable chat body: {}", rejection.body_text());
            String::new()
        }
    };
    let outcome = state.chat.respond(&message).await;

    let status = match &outcome {
        ChatOutcome::Rejected { .. } => StatusCode::BAD_REQUEST,
        ChatOutcome::Answered { .. } => StatusCode::OK,
        ChatOutcome::Failed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    };

    (status, Json(json!({ "reply": outcome.reply() })))
}
