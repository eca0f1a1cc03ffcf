//! E2E tests for model-resolved messages against mocked model servers.

mod helpers;

use std::sync::Arc;

use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use helpers::{TestHarness, ollama_config, ollama_reply, openai_config, openai_reply};
use sb_assistant::ResolverMode;
use sb_assistant::backend::MockLanguageModel;
use sb_commerce::mock::Method;

const CREATE_X_WITHOUT_PRICE: &str =
    r#"{"agent": "action", "method": "create_product", "params": {"name": "X", "price": null}}"#;
const CREATE_X_AT_50: &str =
    r#"{"agent": "action", "method": "create_product", "params": {"name": "X", "price": 50}}"#;

async fn request_bodies(server: &MockServer) -> Vec<serde_json::Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|r| serde_json::from_slice(&r.body).unwrap())
        .collect()
}

/// A structured reply from the OpenAI-compatible backend runs the operation.
#[tokio::test]
async fn e2e_openai_resolves_and_dispatches() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(openai_reply(CREATE_X_AT_50)))
        .expect(1)
        .mount(&server)
        .await;

    let h = TestHarness::with_config(&openai_config(ResolverMode::Llm, &server.uri()));
    let (_, reply) = h.say(None, "תוסיף בבקשה מוצר X ב-50 שקל").await;

    assert!(reply.contains("X"), "{reply}");
    let post = &h.gateway.calls_to(Method::Post)[0];
    assert_eq!(post.resource, "products");
    assert_eq!(post.body.as_ref().unwrap()["regular_price"], "50");
}

/// A null parameter is reported as missing; the follow-up sees the first
/// exchange in its prompt and completes the operation.
#[tokio::test]
async fn e2e_missing_parameter_then_follow_up() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("הודעה חדשה: הוסף מוצר X"))
        .respond_with(ResponseTemplate::new(200).set_body_json(openai_reply(CREATE_X_WITHOUT_PRICE)))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("הודעה חדשה: המחיר הוא 50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(openai_reply(CREATE_X_AT_50)))
        .mount(&server)
        .await;

    let h = TestHarness::with_config(&openai_config(ResolverMode::Llm, &server.uri()));

    let (id, reply) = h.say(None, "הוסף מוצר X").await;
    assert_eq!(reply, "חסר מידע: price. אנא ספק אותו.");
    assert!(h.gateway.calls().is_empty());

    let (_, reply) = h.say(Some(id), "המחיר הוא 50").await;
    assert!(reply.contains("X"), "{reply}");
    assert_eq!(h.gateway.calls_to(Method::Post).len(), 1);

    let bodies = request_bodies(&server).await;
    assert_eq!(bodies.len(), 2);
    let prompt = bodies[1]["messages"][1]["content"].as_str().unwrap();
    assert!(prompt.contains("משתמש: הוסף מוצר X"));
    assert!(prompt.contains("מערכת: חסר מידע: price"));
}

/// A fenced reply resolves exactly like the bare JSON.
#[tokio::test]
async fn e2e_fenced_reply_matches_bare_reply() {
    let fenced = format!("```json\n{CREATE_X_AT_50}\n```");

    let mut replies = Vec::new();
    for content in [CREATE_X_AT_50.to_string(), fenced] {
        let model = Arc::new(MockLanguageModel::replying(content));
        let h = TestHarness::with_model(ResolverMode::Llm, model);
        let mut session = h.session();
        replies.push(session.handle_user_message("הוסף מוצר X במחיר 50").await);
        let turn = session.history().last().unwrap().clone();
        replies.push(format!("{:?}", turn.operation));
    }

    assert_eq!(replies[0], replies[2]);
    assert_eq!(replies[1], replies[3]);
}

/// The Ollama backend is driven through `/api/chat` in JSON mode.
#[tokio::test]
async fn e2e_ollama_backend() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(serde_json::json!({"model": "llama3", "format": "json", "stream": false})))
        .respond_with(ResponseTemplate::new(200).set_body_json(ollama_reply(
            r#"{"agent": "info", "method": "get_order", "params": {"order_id": 123}}"#,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let h = TestHarness::with_config(&ollama_config(ResolverMode::Llm, &server.uri()));
    let (_, reply) = h.say(None, "מה קורה עם ההזמנה של דנה?").await;

    assert!(reply.contains("123"), "{reply}");
    let get = &h.gateway.calls_to(Method::Get)[0];
    assert_eq!(get.resource, "orders/123");
}

/// Tiered mode answers pattern-resolvable messages without the model.
#[tokio::test]
async fn e2e_tiered_skips_model_when_patterns_match() {
    let model = Arc::new(MockLanguageModel::new());
    let h = TestHarness::with_model(ResolverMode::Tiered, model.clone());

    let (_, reply) = h.say(None, "הוסף מוצר חדש בשם חולצה במחיר 70").await;
    assert!(reply.contains("חולצה"), "{reply}");
    assert!(model.prompts().is_empty());
}

/// Tiered mode hands messages the patterns cannot place to the model.
#[tokio::test]
async fn e2e_tiered_falls_back_to_model() {
    let model = Arc::new(MockLanguageModel::replying(
        r#"{"agent": "info", "method": "get_coupons", "params": {}}"#,
    ));
    let h = TestHarness::with_model(ResolverMode::Tiered, model.clone());

    let (_, reply) = h.say(None, "which discount codes do we have?").await;
    assert!(reply.contains("SUMMER10"), "{reply}");
    assert_eq!(model.prompts().len(), 1);
}

/// When the model fails in tiered mode the user still gets the menu.
#[tokio::test]
async fn e2e_tiered_model_failure_keeps_pattern_answer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let h = TestHarness::with_config(&openai_config(ResolverMode::Tiered, &server.uri()));
    let messages = h.state.assistant.messages();

    let (_, reply) = h.say(None, "what time is it?").await;
    assert!(reply.starts_with(&messages.error("unresolved_domain", &[])), "{reply}");
    assert!(reply.contains("מחקר שוק"));
    assert_eq!(request_bodies(&server).await.len(), 1);
}
