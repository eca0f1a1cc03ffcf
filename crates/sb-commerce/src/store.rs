//! Shipping zones, shipping methods, and payment methods.

use serde_json::{Value, json};

use crate::error::{CommerceError, CommerceResult};
use crate::gateway::CommerceGateway;

/// Default shipping method type.
pub const DEFAULT_METHOD_ID: &str = "flat_rate";

/// Create a shipping zone, optionally restricted to regions and with a
/// flat-rate method at `price`.
pub async fn create_shipping_zone(
    gateway: &dyn CommerceGateway,
    name: &str,
    regions: &[String],
    price: Option<f64>,
) -> CommerceResult<String> {
    let zone = gateway
        .post("shipping/zones", &json!({"name": name}))
        .await?
        .into_success()?;
    let zone_id = zone
        .get("id")
        .and_then(Value::as_i64)
        .ok_or_else(|| CommerceError::Decode("shipping zone has no id".into()))?;

    if !regions.is_empty() {
        let locations: Vec<Value> = regions
            .iter()
            .map(|code| json!({"code": code, "type": "country"}))
            .collect();
        gateway
            .put(
                &format!("shipping/zones/{zone_id}/locations"),
                &Value::Array(locations),
            )
            .await?
            .into_success()?;
    }

    if let Some(price) = price.filter(|p| *p > 0.0) {
        add_method(gateway, zone_id, DEFAULT_METHOD_ID, name, Some(price)).await?;
    }

    Ok(format!("אזור המשלוח '{name}' נוצר בהצלחה (מזהה {zone_id})"))
}

async fn add_method(
    gateway: &dyn CommerceGateway,
    zone_id: i64,
    method_id: &str,
    title: &str,
    cost: Option<f64>,
) -> CommerceResult<Value> {
    let mut settings = json!({"title": title});
    if let Some(cost) = cost {
        settings["cost"] = json!(sb_protocol::format_number(cost));
    }
    let response = gateway
        .post(
            &format!("shipping/zones/{zone_id}/methods"),
            &json!({"method_id": method_id, "settings": settings}),
        )
        .await?;
    if response.status == 404 {
        return Err(CommerceError::not_found(format!("אזור משלוח {zone_id}")));
    }
    response.into_success()
}

pub async fn add_shipping_method(
    gateway: &dyn CommerceGateway,
    zone_id: i64,
    title: &str,
    method_id: Option<&str>,
    cost: Option<f64>,
) -> CommerceResult<String> {
    if cost.is_some_and(|c| c < 0.0) {
        return Err(CommerceError::InvalidParameter("shipping cost must not be negative".into()));
    }
    add_method(gateway, zone_id, method_id.unwrap_or(DEFAULT_METHOD_ID), title, cost).await?;
    let price = cost
        .map(|c| format!(" במחיר {} ₪", sb_protocol::format_number(c)))
        .unwrap_or_default();
    Ok(format!("שיטת המשלוח '{title}'{price} נוספה לאזור {zone_id}"))
}

pub async fn add_payment_method(
    gateway: &dyn CommerceGateway,
    title: &str,
    description: Option<&str>,
) -> CommerceResult<String> {
    let mut body = json!({"title": title, "enabled": true});
    if let Some(description) = description {
        body["description"] = json!(description);
    }
    gateway
        .post("payment_gateways", &body)
        .await?
        .into_success()?;
    Ok(format!("שיטת התשלום '{title}' נוספה בהצלחה"))
}
