//! Chat endpoint.

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Request body for one chat message.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// Existing conversation; a new one is started when absent.
    #[serde(default)]
    pub conversation_id: Option<Uuid>,
    pub message: String,
}

/// Reply for one chat message or image association.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub conversation_id: Uuid,
    pub response: String,
}

/// POST /api/v1/chat: answer one message within a conversation.
pub async fn chat(State(state): State<AppState>, Json(req): Json<ChatRequest>) -> ApiResult<Json<ChatResponse>> {
    if req.message.trim().is_empty() {
        return Err(ApiError::EmptyField("message"));
    }

    let conversation_id = req.conversation_id.unwrap_or_else(Uuid::now_v7);
    let conversation = state.conversation(conversation_id).await;

    // Held for the whole message so turns within a conversation stay ordered.
    let mut session = conversation.session.lock().await;
    let response = session.handle_user_message(&req.message).await;
    tracing::info!(
        conversation_id = %conversation_id,
        turns = session.history().len(),
        "chat message answered"
    );

    Ok(Json(ChatResponse {
        conversation_id,
        response,
    }))
}
