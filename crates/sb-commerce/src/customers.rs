//! Customer loyalty points.

use serde_json::{Value, json};

use crate::error::{CommerceError, CommerceResult};
use crate::gateway::CommerceGateway;

const POINTS_KEY: &str = "loyalty_points";

/// Direction of a points change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointsAction {
    Add,
    Subtract,
}

impl PointsAction {
    /// Accepts `add`/`subtract` and the Hebrew verbs `הוסף`/`הורד`.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "add" | "הוסף" => Some(Self::Add),
            "subtract" | "remove" | "הורד" => Some(Self::Subtract),
            _ => None,
        }
    }
}

fn current_points(customer: &Value) -> i64 {
    customer
        .get("meta_data")
        .and_then(Value::as_array)
        .and_then(|meta| {
            meta.iter()
                .find(|m| m.get("key").and_then(Value::as_str) == Some(POINTS_KEY))
        })
        .and_then(|m| match m.get("value") {
            Some(Value::String(s)) => s.trim().parse().ok(),
            Some(Value::Number(n)) => n.as_i64(),
            _ => None,
        })
        .unwrap_or(0)
}

/// Add or subtract loyalty points. The balance never drops below zero.
pub async fn manage_points(
    gateway: &dyn CommerceGateway,
    customer_id: i64,
    action: PointsAction,
    points: i64,
    reason: Option<&str>,
) -> CommerceResult<String> {
    if points <= 0 {
        return Err(CommerceError::InvalidParameter("points must be positive".into()));
    }
    let response = gateway.get(&format!("customers/{customer_id}"), &[]).await?;
    if response.status == 404 {
        return Err(CommerceError::not_found(format!("לקוח {customer_id}")));
    }
    let customer = response.into_success()?;

    let current = current_points(&customer);
    let updated = match action {
        PointsAction::Add => current + points,
        PointsAction::Subtract => (current - points).max(0),
    };
    gateway
        .put(
            &format!("customers/{customer_id}"),
            &json!({"meta_data": [{"key": POINTS_KEY, "value": updated.to_string()}]}),
        )
        .await?
        .into_success()?;

    let sign = match action {
        PointsAction::Add => '+',
        PointsAction::Subtract => '-',
    };
    match reason.map(str::trim).filter(|r| !r.is_empty()) {
        Some(reason) => tracing::info!(customer_id, change = %format!("{sign}{points}"), reason, "loyalty points updated"),
        None => tracing::info!(customer_id, change = %format!("{sign}{points}"), "loyalty points updated"),
    }
    Ok(format!(
        "נקודות המועדון של לקוח {customer_id} עודכנו ({sign}{points}). מצב נוכחי: {updated} נקודות"
    ))
}
