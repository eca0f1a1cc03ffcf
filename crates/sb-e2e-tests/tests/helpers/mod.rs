//! Shared test harness for E2E integration tests.
//!
//! Wires a real assistant (router, extractor, resolvers, dispatch table,
//! handlers) over an in-memory store and serves it through the chat API
//! router, so every test exercises real code paths across crate boundaries.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use secrecy::SecretString;
use tower::ServiceExt;
use uuid::Uuid;

use sb_assistant::backend::Provider;
use sb_assistant::{Assistant, AssistantConfig, LanguageModel, ResolverMode, Session};
use sb_chat_api::routes::build_router;
use sb_chat_api::state::AppState;
use sb_commerce::MockCommerceGateway;

/// End-to-end test harness: assistant + chat API over a mock store.
pub struct TestHarness {
    /// Chat API state (shared assistant + conversations).
    pub state: AppState,
    /// Axum router for HTTP requests via `tower::oneshot`.
    pub router: Router,
    /// The store every handler talks to.
    pub gateway: Arc<MockCommerceGateway>,
}

impl TestHarness {
    /// Pattern resolver over the sample store. Unless the config says
    /// otherwise, images are accepted from the system temp directory only.
    pub fn with_sample_store() -> Self {
        Self::with_gateway(MockCommerceGateway::with_sample_store())
    }

    /// Pattern resolver over a custom store.
    pub fn with_gateway(gateway: MockCommerceGateway) -> Self {
        Self::build(&AssistantConfig::default(), gateway, None)
    }

    /// Given resolver mode, driven by an in-process model.
    pub fn with_model(mode: ResolverMode, model: Arc<dyn LanguageModel>) -> Self {
        let mut config = AssistantConfig::default();
        config.resolver.mode = mode;
        Self::build(&config, MockCommerceGateway::with_sample_store(), Some(model))
    }

    /// Backend built from `config.llm`, over the sample store.
    pub fn with_config(config: &AssistantConfig) -> Self {
        Self::build(config, MockCommerceGateway::with_sample_store(), None)
    }

    fn build(
        config: &AssistantConfig,
        gateway: MockCommerceGateway,
        model: Option<Arc<dyn LanguageModel>>,
    ) -> Self {
        let gateway = Arc::new(gateway);
        let mut config = config.clone();
        config.commerce.upload_dir.get_or_insert_with(std::env::temp_dir);
        let assistant = Assistant::build(&config, gateway.clone(), model).unwrap();
        let state = AppState::new(Arc::new(assistant));
        let router = build_router(state.clone());
        Self {
            state,
            router,
            gateway,
        }
    }

    /// A fresh in-process session (bypasses HTTP).
    pub fn session(&self) -> Session {
        self.state.assistant.session()
    }

    /// POST /api/v1/chat. Returns (HTTP status code, response JSON body).
    pub async fn chat(&self, conversation_id: Option<Uuid>, message: &str) -> (StatusCode, serde_json::Value) {
        let body = serde_json::json!({
            "conversation_id": conversation_id,
            "message": message,
        });
        self.post("/api/v1/chat", &body).await
    }

    /// POST /api/v1/chat and return (conversation id, reply text).
    pub async fn say(&self, conversation_id: Option<Uuid>, message: &str) -> (Uuid, String) {
        let (status, json) = self.chat(conversation_id, message).await;
        assert_eq!(status, StatusCode::OK, "chat failed: {json}");
        let id = json["conversation_id"].as_str().unwrap().parse().unwrap();
        (id, json["response"].as_str().unwrap().to_string())
    }

    /// POST /api/v1/images.
    pub async fn post_image(
        &self,
        conversation_id: Option<Uuid>,
        product_name: &str,
        file_path: &str,
    ) -> (StatusCode, serde_json::Value) {
        let body = serde_json::json!({
            "conversation_id": conversation_id,
            "product_name": product_name,
            "file_path": file_path,
        });
        self.post("/api/v1/images", &body).await
    }

    /// GET /api/v1/conversations/{id}.
    pub async fn get_conversation(&self, id: Uuid) -> (StatusCode, serde_json::Value) {
        let response = self
            .router
            .clone()
            .oneshot(
                Request::get(format!("/api/v1/conversations/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    /// DELETE /api/v1/conversations/{id}.
    pub async fn delete_conversation(&self, id: Uuid) -> StatusCode {
        self.router
            .clone()
            .oneshot(
                Request::delete(format!("/api/v1/conversations/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
            .status()
    }

    async fn post(&self, uri: &str, body: &serde_json::Value) -> (StatusCode, serde_json::Value) {
        let response = self
            .router
            .clone()
            .oneshot(
                Request::post(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(serde_json::to_vec(body).unwrap()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        (status, json)
    }
}

/// Assistant config pointing the OpenAI-compatible backend at `base_url`.
pub fn openai_config(mode: ResolverMode, base_url: &str) -> AssistantConfig {
    let mut config = AssistantConfig::default();
    config.resolver.mode = mode;
    config.llm.provider = Provider::OpenAi;
    config.llm.base_url = Some(base_url.to_string());
    config.llm.api_key = Some(SecretString::from("sk-test".to_string()));
    config.llm.timeout_secs = 5;
    config
}

/// Assistant config pointing the Ollama backend at `base_url`.
pub fn ollama_config(mode: ResolverMode, base_url: &str) -> AssistantConfig {
    let mut config = AssistantConfig::default();
    config.resolver.mode = mode;
    config.llm.provider = Provider::Ollama;
    config.llm.base_url = Some(base_url.to_string());
    config.llm.model = "llama3".to_string();
    config.llm.timeout_secs = 5;
    config
}

/// Chat-completions body carrying `content`.
pub fn openai_reply(content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-e2e",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
}

/// Ollama `/api/chat` body carrying `content`.
pub fn ollama_reply(content: &str) -> serde_json::Value {
    serde_json::json!({
        "model": "llama3",
        "message": {"role": "assistant", "content": content},
        "done": true
    })
}
