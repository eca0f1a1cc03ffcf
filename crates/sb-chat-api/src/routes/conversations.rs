//! Conversation history inspection and reset.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// GET /api/v1/conversations/{id}: recorded turns, oldest first.
pub async fn get_conversation(
    State(state): State<AppState>,
    Path(conversation_id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    let conversation = state
        .existing(conversation_id)
        .await
        .ok_or(ApiError::ConversationNotFound(conversation_id))?;

    let session = conversation.session.lock().await;
    let turns: Vec<_> = session.history().turns().cloned().collect();
    Ok(Json(json!({
        "conversation_id": conversation_id,
        "started_at": conversation.started_at,
        "turns": turns,
    })))
}

/// GET /api/v1/conversations: ids of live conversations.
pub async fn list_conversations(State(state): State<AppState>) -> Json<Vec<Value>> {
    let conversations = state.conversations.read().await;
    let mut listed: Vec<Value> = conversations
        .iter()
        .map(|(id, c)| json!({"conversation_id": id, "started_at": c.started_at}))
        .collect();
    listed.sort_by(|a, b| a["conversation_id"].as_str().cmp(&b["conversation_id"].as_str()));
    Json(listed)
}

/// DELETE /api/v1/conversations/{id}: forget a conversation.
pub async fn delete_conversation(
    State(state): State<AppState>,
    Path(conversation_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    if !state.remove(conversation_id).await {
        return Err(ApiError::ConversationNotFound(conversation_id));
    }
    tracing::info!(conversation_id = %conversation_id, "conversation deleted");
    Ok(StatusCode::NO_CONTENT)
}
