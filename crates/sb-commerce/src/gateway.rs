//! Commerce gateway abstraction: the narrow interface handlers call.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{CommerceError, CommerceResult};

/// Status code and decoded body of a store API call.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayResponse {
    pub status: u16,
    /// JSON body, or a JSON string holding the raw text when the body was
    /// not JSON.
    pub body: Value,
}

impl GatewayResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The body of a 2xx response. 401 and 403 become
    /// [`CommerceError::PermissionDenied`], anything else a
    /// [`CommerceError::Status`].
    pub fn into_success(self) -> CommerceResult<Value> {
        if self.is_success() {
            Ok(self.body)
        } else if matches!(self.status, 401 | 403) {
            Err(CommerceError::PermissionDenied(format!(
                "store returned status {}: {}",
                self.status,
                body_excerpt(&self.body)
            )))
        } else {
            Err(CommerceError::Status {
                status: self.status,
                body: body_excerpt(&self.body),
            })
        }
    }

    /// The body of a 2xx response as an array.
    pub fn into_array(self) -> CommerceResult<Vec<Value>> {
        match self.into_success()? {
            Value::Array(items) => Ok(items),
            other => Err(CommerceError::Decode(format!(
                "expected array, got {}",
                body_excerpt(&other)
            ))),
        }
    }
}

/// First 200 characters of a body, for error messages.
fn body_excerpt(body: &Value) -> String {
    let text = match body {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    text.chars().take(200).collect()
}

/// Abstraction over the store's REST API.
///
/// Resources are relative to the API root (e.g. `products`,
/// `orders/123/notes`). Implementations enforce their own request timeout.
#[async_trait]
pub trait CommerceGateway: Send + Sync {
    async fn get(&self, resource: &str, query: &[(&str, String)]) -> CommerceResult<GatewayResponse>;

    async fn post(&self, resource: &str, body: &Value) -> CommerceResult<GatewayResponse>;

    async fn put(&self, resource: &str, body: &Value) -> CommerceResult<GatewayResponse>;

    async fn delete(&self, resource: &str, query: &[(&str, String)]) -> CommerceResult<GatewayResponse>;

    /// Upload a media file to the store's media library.
    async fn upload_media(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> CommerceResult<GatewayResponse>;
}
