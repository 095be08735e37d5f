use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::bot::NoteBot;
use crate::conversation::Stage;
use crate::models::*;

/// Body of `POST /events`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRequest {
    pub user_id: UserId,
    pub event: InboundEvent,
}

/// What to render in reply to an event; `null` when the event was a no-op.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventResponse {
    pub action: Option<OutboundAction>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationResponse {
    pub user_id: UserId,
    pub stage: Stage,
}

/// Log the full error server-side; clients only get a generic message.
fn internal_error(e: impl std::fmt::Display) -> (StatusCode, String) {
    tracing::error!("Internal error: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error".to_string(),
    )
}

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

pub async fn handle_event(
    State(bot): State<Arc<NoteBot>>,
    Json(request): Json<EventRequest>,
) -> Result<Json<EventResponse>, (StatusCode, String)> {
    bot.handle_event(request.user_id, &request.event)
        .map(|action| Json(EventResponse { action }))
        .map_err(internal_error)
}

pub async fn list_notes(
    State(bot): State<Arc<NoteBot>>,
    Path(user_id): Path<UserId>,
) -> Result<Json<Vec<Note>>, (StatusCode, String)> {
    bot.store().get_all(user_id).map(Json).map_err(internal_error)
}

pub async fn get_conversation(
    State(bot): State<Arc<NoteBot>>,
    Path(user_id): Path<UserId>,
) -> Json<ConversationResponse> {
    Json(ConversationResponse {
        user_id,
        stage: bot.stage(user_id),
    })
}
