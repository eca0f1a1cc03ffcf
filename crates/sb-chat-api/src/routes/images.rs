//! Image association endpoint.

use std::path::PathBuf;

use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use uuid::Uuid;

use super::chat::ChatResponse;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Request body for attaching a local image file to a product.
#[derive(Debug, Deserialize)]
pub struct ImageRequest {
    #[serde(default)]
    pub conversation_id: Option<Uuid>,
    pub product_name: String,
    /// Path of an image already on the server's disk.
    pub file_path: PathBuf,
}

/// POST /api/v1/images: associate an image with a product.
pub async fn associate_image(
    State(state): State<AppState>,
    Json(req): Json<ImageRequest>,
) -> ApiResult<Json<ChatResponse>> {
    if req.file_path.as_os_str().is_empty() {
        return Err(ApiError::EmptyField("file_path"));
    }

    let conversation_id = req.conversation_id.unwrap_or_else(Uuid::now_v7);
    let conversation = state.conversation(conversation_id).await;
    let mut session = conversation.session.lock().await;
    let response = session
        .handle_image_association(&req.product_name, &req.file_path)
        .await;

    Ok(Json(ChatResponse {
        conversation_id,
        response,
    }))
}
