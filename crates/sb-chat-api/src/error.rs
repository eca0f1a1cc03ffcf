//! Request-level errors and their JSON responses.
//!
//! Assistant failures never surface here; they are already Hebrew replies
//! by the time a handler sees them. What is left is the request itself
//! naming a conversation that does not exist or omitting required text.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No live conversation with this id, either never started or
    /// dropped after being idle.
    #[error("conversation '{0}' not found")]
    ConversationNotFound(Uuid),

    /// A required text field is empty or whitespace.
    #[error("{0} is empty")]
    EmptyField(&'static str),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::ConversationNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::EmptyField(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Stable machine-readable code for clients.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::ConversationNotFound(_) => "conversation_not_found",
            ApiError::EmptyField(_) => "empty_field",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut body = json!({
            "error": self.to_string(),
            "code": self.code(),
            "status": status.as_u16(),
        });
        match &self {
            ApiError::ConversationNotFound(id) => body["conversation_id"] = json!(id),
            ApiError::EmptyField(field) => body["field"] = json!(field),
        }

        (status, axum::Json(body)).into_response()
    }
}

/// Convenience alias.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn unknown_conversation_names_the_id() {
        let id = Uuid::now_v7();
        let response = ApiError::ConversationNotFound(id).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let json = body(response).await;
        assert_eq!(json["status"], 404);
        assert_eq!(json["code"], "conversation_not_found");
        assert_eq!(json["conversation_id"], id.to_string());
        assert_eq!(json["error"], format!("conversation '{id}' not found"));
    }

    #[tokio::test]
    async fn empty_field_names_the_field() {
        let response = ApiError::EmptyField("message").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = body(response).await;
        assert_eq!(json["code"], "empty_field");
        assert_eq!(json["field"], "message");
        assert_eq!(json["error"], "message is empty");
    }
}
