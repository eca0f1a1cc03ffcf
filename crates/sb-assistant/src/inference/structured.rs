//! Structured LLM resolver.
//!
//! Builds a Hebrew instruction prompt, asks the model for a single
//! `{agent, method, params}` JSON object and validates it. The resolver
//! never retries: a malformed reply is `invalid_format` for that message.

use std::fmt::Write as _;
use std::sync::Arc;

use async_trait::async_trait;
use sb_protocol::{Domain, Intent, Operation, ParamValue, ParameterSet, ResolutionError, ResolutionSource};
use serde_json::Value;

use super::IntentResolver;
use crate::backend::LanguageModel;
use crate::history::ConversationHistory;
use crate::requirements::{missing_in_model_output, required_parameters};

/// Worked examples appended to the operation catalog.
const EXAMPLES: &str = r#"דוגמאות:
"הוסף מוצר חדש בשם חולצה במחיר 70" -> {"agent": "action", "method": "create_product", "params": {"name": "חולצה", "regular_price": "70", "type": "simple"}}
"צור קופון של 20 אחוז" -> {"agent": "action", "method": "create_coupon", "params": {"amount": 20, "discount_type": "percent"}}
"מה מצב הזמנה 123?" -> {"agent": "info", "method": "track_shipment", "params": {"order_id": 123}}
"ניתוח מתחרים בתחום אופנה" -> {"agent": "research", "method": "analyze_competitors", "params": {"market_segment": "אופנה"}}
"עדכן את המחיר" -> {"agent": "action", "method": "update_product_price", "params": {"product_name": null, "price": null}}"#;

const INSTRUCTIONS: &str = "הנחיות:
- אם ההודעה החדשה מקוצרת או מתייחסת להודעות קודמות, השתמש במספרים ובשמות המדויקים מתוך השיחה.
- אם פרמטר חיוני חסר ואינו מופיע בשיחה, כתוב null במקומו. אל תנחש ערכים.
- ענה באובייקט JSON יחיד בצורה {\"agent\": ..., \"method\": ..., \"params\": {...}} ללא טקסט נוסף.";

/// LLM-backed resolver.
pub struct LlmResolver {
    model: Arc<dyn LanguageModel>,
    prompt_turns: usize,
}

impl LlmResolver {
    /// `prompt_turns` bounds how many recent turns are rendered into the prompt.
    pub fn new(model: Arc<dyn LanguageModel>, prompt_turns: usize) -> Self {
        Self { model, prompt_turns }
    }

    pub fn build_prompt(&self, message: &str, history: &ConversationHistory) -> String {
        let mut prompt = String::from("אתה עוזר לניהול חנות מקוונת. בחר את הפעולה המתאימה להודעת המשתמש.\n\n");
        prompt.push_str(&catalog());
        prompt.push('\n');
        prompt.push_str(EXAMPLES);
        prompt.push_str("\n\n");

        let context = history.render(self.prompt_turns);
        if !context.is_empty() {
            prompt.push_str("היסטוריית השיחה:\n");
            prompt.push_str(&context);
            prompt.push('\n');
        }

        prompt.push_str(INSTRUCTIONS);
        let _ = write!(prompt, "\n\nהודעה חדשה: {message}\n");
        prompt
    }
}

/// One line per operation: `agent / method: required, ...`.
fn catalog() -> String {
    let mut out = String::from("פעולות זמינות (agent / method: פרמטרים נדרשים):\n");
    for domain in Domain::ALL {
        for op in Operation::in_domain(domain) {
            let required: Vec<&str> = required_parameters(op).iter().map(|r| r.name).collect();
            let required = if required.is_empty() {
                "ללא".to_string()
            } else {
                required.join(", ")
            };
            let _ = writeln!(out, "- {} / {}: {}", domain, op.name(), required);
        }
    }
    out
}

/// Extract JSON from model output that may be wrapped in markdown code blocks.
pub fn strip_fences(text: &str) -> &str {
    let trimmed = text.trim();

    if let Some(start) = trimmed.find("```json") {
        let after_fence = &trimmed[start + 7..];
        if let Some(end) = after_fence.find("```") {
            return after_fence[..end].trim();
        }
    }

    if let Some(start) = trimmed.find("```") {
        let after_fence = &trimmed[start + 3..];
        if let Some(end) = after_fence.find("```") {
            return after_fence[..end].trim();
        }
    }

    trimmed
}

fn invalid(reason: impl Into<String>) -> ResolutionError {
    ResolutionError::InvalidFormat { reason: reason.into() }
}

/// Parse and validate one model reply.
pub fn parse_reply(raw: &str) -> Result<Intent, ResolutionError> {
    let value: Value = serde_json::from_str(strip_fences(raw)).map_err(|e| invalid(e.to_string()))?;
    let Value::Object(mut object) = value else {
        return Err(invalid("reply is not a JSON object"));
    };

    let agent = match object.remove("agent") {
        Some(Value::String(s)) => s,
        _ => return Err(invalid("missing string field `agent`")),
    };
    let method = match object.remove("method") {
        Some(Value::String(s)) => s,
        _ => return Err(invalid("missing string field `method`")),
    };
    let params = match object.remove("params") {
        Some(Value::Object(map)) => map,
        _ => return Err(invalid("missing object field `params`")),
    };

    let operation = Domain::parse(&agent)
        .and_then(|domain| Operation::lookup(domain, &method))
        .ok_or_else(|| ResolutionError::CapabilityNotFound {
            domain: agent.clone(),
            operation: method.clone(),
        })?;

    let mut parameters = ParameterSet::new();
    for (key, value) in params {
        parameters.insert(key, ParamValue::from(value));
    }

    let missing = missing_in_model_output(operation, &parameters);
    if !missing.is_empty() {
        return Err(ResolutionError::MissingParameters { operation, missing });
    }

    Ok(Intent::new(operation, parameters, ResolutionSource::Llm))
}

#[async_trait]
impl IntentResolver for LlmResolver {
    async fn resolve(&self, message: &str, history: &ConversationHistory) -> Result<Intent, ResolutionError> {
        let prompt = self.build_prompt(message, history);
        let raw = self.model.complete(&prompt).await.map_err(|e| {
            tracing::warn!(provider = self.model.provider(), error = %e, "language model call failed");
            ResolutionError::Backend(e.to_string())
        })?;

        match parse_reply(&raw) {
            Ok(intent) => {
                tracing::debug!(operation = %intent.operation, "model resolved intent");
                Ok(intent)
            }
            Err(e) => {
                tracing::warn!(error = %e, content = %raw, "model reply rejected");
                Err(e)
            }
        }
    }

    fn tier_name(&self) -> &str {
        "llm"
    }
}
