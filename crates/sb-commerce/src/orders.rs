//! Orders, order notes, refunds, shipment tracking, and sales reports.

use serde_json::{Value, json};

use crate::error::{CommerceError, CommerceResult};
use crate::gateway::CommerceGateway;

/// Hebrew order status words and their API codes.
const ORDER_STATUSES: &[(&str, &str)] = &[
    ("בהמתנה", "pending"),
    ("בעיבוד", "processing"),
    ("הושלם", "completed"),
    ("בוטל", "cancelled"),
    ("הוחזר", "refunded"),
    ("נכשל", "failed"),
];

/// Payment gateways that refund through the store API.
const API_REFUND_GATEWAYS: &[&str] = &["ppec_paypal", "stripe"];

/// API status code for a Hebrew word or an API code.
pub fn order_status_code(input: &str) -> Option<&'static str> {
    let input = input.trim();
    ORDER_STATUSES
        .iter()
        .find(|(he, code)| *he == input || *code == input)
        .map(|(_, code)| *code)
}

/// Hebrew label for an API status code. Unknown codes pass through.
pub fn order_status_label(code: &str) -> &str {
    ORDER_STATUSES
        .iter()
        .find(|(_, c)| *c == code)
        .map(|(he, _)| *he)
        .unwrap_or(code)
}

fn str_field<'a>(v: &'a Value, field: &str) -> &'a str {
    v.get(field).and_then(Value::as_str).unwrap_or("")
}

/// Numeric field that the store may encode as a string.
fn num_field(v: &Value, field: &str) -> f64 {
    match v.get(field) {
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        _ => 0.0,
    }
}

pub(crate) async fn fetch_order(gateway: &dyn CommerceGateway, order_id: i64) -> CommerceResult<Value> {
    let response = gateway.get(&format!("orders/{order_id}"), &[]).await?;
    if response.status == 404 {
        return Err(CommerceError::not_found(format!("הזמנה {order_id}")));
    }
    response.into_success()
}

// ── Reads ─────────────────────────────────────────────────────

pub async fn order_details(gateway: &dyn CommerceGateway, order_id: i64) -> CommerceResult<String> {
    let order = fetch_order(gateway, order_id).await?;
    let billing = order.get("billing").cloned().unwrap_or(Value::Null);
    let customer = format!("{} {}", str_field(&billing, "first_name"), str_field(&billing, "last_name"));
    let date = str_field(&order, "date_created").split('T').next().unwrap_or("");

    let mut lines = vec![
        format!("פרטי הזמנה #{order_id}:"),
        format!("• סטטוס: {}", order_status_label(str_field(&order, "status"))),
        format!("• תאריך: {date}"),
        format!("• לקוח: {}", customer.trim()),
        format!("• סה״כ: {} ₪", str_field(&order, "total")),
    ];
    if let Some(items) = order.get("line_items").and_then(Value::as_array)
        && !items.is_empty()
    {
        lines.push("פריטים:".into());
        for item in items {
            lines.push(format!(
                "  • {} × {} ({} ₪)",
                str_field(item, "name"),
                item.get("quantity").and_then(Value::as_i64).unwrap_or(0),
                str_field(item, "total")
            ));
        }
    }
    Ok(lines.join("\n"))
}

pub async fn customer_orders(
    gateway: &dyn CommerceGateway,
    customer_id: i64,
    per_page: u32,
) -> CommerceResult<String> {
    let orders = gateway
        .get(
            "orders",
            &[
                ("customer", customer_id.to_string()),
                ("per_page", per_page.to_string()),
                ("orderby", "date".to_string()),
                ("order", "desc".to_string()),
            ],
        )
        .await?
        .into_array()?;
    if orders.is_empty() {
        return Ok(format!("לא נמצאו הזמנות ללקוח {customer_id}"));
    }

    let mut lines = vec![format!("היסטוריית הזמנות ללקוח {customer_id}:")];
    for order in &orders {
        let date = str_field(order, "date_created").split('T').next().unwrap_or("");
        lines.push(format!(
            "- הזמנה #{} ({date}): {} ₪ | {}",
            order.get("id").and_then(Value::as_i64).unwrap_or(0),
            str_field(order, "total"),
            order_status_label(str_field(order, "status"))
        ));
    }
    Ok(lines.join("\n"))
}

pub async fn track_shipment(gateway: &dyn CommerceGateway, order_id: i64) -> CommerceResult<String> {
    let order = fetch_order(gateway, order_id).await?;
    let shipping = order
        .get("shipping_lines")
        .and_then(Value::as_array)
        .and_then(|lines| lines.first());
    let Some(line) = shipping else {
        return Ok(format!("לא נמצאו פרטי משלוח להזמנה {order_id}"));
    };

    let tracking = line
        .get("tracking_number")
        .and_then(Value::as_str)
        .unwrap_or("טרם הוקצה");
    Ok(format!(
        "מעקב משלוח להזמנה {order_id}:\nמספר מעקב: {tracking}\nחברת שילוח: {}",
        str_field(line, "method_title")
    ))
}

/// Sales summary for `week`, `month` or `year`.
pub async fn sales_report(gateway: &dyn CommerceGateway, period: &str) -> CommerceResult<String> {
    let period_label = match period {
        "week" => "שבוע",
        "month" => "חודש",
        "year" => "שנה",
        other => {
            return Err(CommerceError::InvalidParameter(format!(
                "unknown report period '{other}'"
            )));
        }
    };
    let data = gateway
        .get("reports/sales", &[("period", period.to_string())])
        .await?
        .into_success()?;
    let report = match &data {
        Value::Array(items) => items.first().cloned(),
        Value::Object(_) => Some(data.clone()),
        _ => None,
    };
    let Some(report) = report else {
        return Ok(format!(
            "אין נתוני מכירות ל{period_label} האחרון.\n\
             המלצות:\n\
             • לבדוק את מחירי המוצרים מול המתחרים\n\
             • לשקול יצירת קופוני הנחה לקידום מכירות\n\
             • לוודא שהמוצרים מוצגים היטב עם תמונות ותיאורים"
        ));
    };

    let total_sales = num_field(&report, "total_sales");
    let total_orders = num_field(&report, "total_orders");
    let total_items = num_field(&report, "total_items");
    let (avg_order, items_per_order) = if total_orders > 0.0 {
        (total_sales / total_orders, total_items / total_orders)
    } else {
        (0.0, 0.0)
    };
    let rating = if total_sales > 10_000.0 {
        "✅ מצוין"
    } else if total_sales > 1_000.0 {
        "⚠️ בינוני"
    } else {
        "❌ נמוך"
    };

    Ok(format!(
        "דוח מכירות ל{period_label} האחרון:\n\
         • סה״כ מכירות: {total_sales:.2} ₪\n\
         • מספר הזמנות: {total_orders:.0}\n\
         • מספר פריטים: {total_items:.0}\n\
         • ממוצע להזמנה: {avg_order:.2} ₪\n\
         • פריטים להזמנה: {items_per_order:.1}\n\
         \n\
         מדדי ביצוע:\n\
         {rating}"
    ))
}

// ── Mutations ─────────────────────────────────────────────────

pub async fn add_note(
    gateway: &dyn CommerceGateway,
    order_id: i64,
    note: &str,
    customer_note: bool,
) -> CommerceResult<String> {
    gateway
        .post(
            &format!("orders/{order_id}/notes"),
            &json!({"note": note, "customer_note": customer_note}),
        )
        .await?
        .into_success()?;
    let audience = if customer_note { " (נשלחה ללקוח)" } else { "" };
    Ok(format!("ההערה נוספה להזמנה {order_id}{audience}"))
}

pub async fn update_status(
    gateway: &dyn CommerceGateway,
    order_id: i64,
    status: &str,
    note: Option<&str>,
) -> CommerceResult<String> {
    let code = order_status_code(status).ok_or_else(|| {
        CommerceError::InvalidParameter(format!("unknown order status '{status}'"))
    })?;
    let response = gateway
        .put(&format!("orders/{order_id}"), &json!({"status": code}))
        .await?;
    if response.status == 404 {
        return Err(CommerceError::not_found(format!("הזמנה {order_id}")));
    }
    response.into_success()?;
    if let Some(note) = note.map(str::trim).filter(|n| !n.is_empty()) {
        add_note(gateway, order_id, note, false).await?;
    }
    Ok(format!(
        "סטטוס הזמנה {order_id} עודכן ל-{}",
        order_status_label(code)
    ))
}

/// Move a pending order to processing.
pub async fn approve(
    gateway: &dyn CommerceGateway,
    order_id: i64,
    note: Option<&str>,
) -> CommerceResult<String> {
    let order = fetch_order(gateway, order_id).await?;
    let current = str_field(&order, "status");
    if current != "pending" {
        return Ok(format!(
            "לא ניתן לאשר הזמנה בסטטוס {}",
            order_status_label(current)
        ));
    }
    gateway
        .put(&format!("orders/{order_id}"), &json!({"status": "processing"}))
        .await?
        .into_success()?;
    if let Some(note) = note.map(str::trim).filter(|n| !n.is_empty()) {
        add_note(gateway, order_id, &format!("הזמנה אושרה: {note}"), false).await?;
    }
    Ok(format!("הזמנה {order_id} אושרה בהצלחה"))
}

/// Cancel an order that is not yet final, notifying the customer.
pub async fn reject(gateway: &dyn CommerceGateway, order_id: i64, reason: &str) -> CommerceResult<String> {
    let order = fetch_order(gateway, order_id).await?;
    let current = str_field(&order, "status");
    if matches!(current, "completed" | "refunded" | "cancelled") {
        return Ok(format!(
            "לא ניתן לדחות הזמנה בסטטוס {}",
            order_status_label(current)
        ));
    }
    gateway
        .put(&format!("orders/{order_id}"), &json!({"status": "cancelled"}))
        .await?
        .into_success()?;
    add_note(gateway, order_id, &format!("הזמנה נדחתה: {reason}"), true).await?;
    Ok(format!("הזמנה {order_id} נדחתה בהצלחה"))
}

/// Refund part or all of an order. Amounts above the order total are
/// capped. Gateways without API refunds get a manual refund: the order is
/// marked refunded and the customer receives a note.
pub async fn refund(
    gateway: &dyn CommerceGateway,
    order_id: i64,
    amount: f64,
    reason: Option<&str>,
) -> CommerceResult<String> {
    if amount <= 0.0 {
        return Err(CommerceError::InvalidParameter("refund amount must be positive".into()));
    }
    let order = fetch_order(gateway, order_id).await?;
    let total = num_field(&order, "total");
    let amount = if total > 0.0 && amount > total {
        tracing::info!(order_id, amount, total, "refund capped at order total");
        total
    } else {
        amount
    };
    let reason = reason.map(str::trim).unwrap_or("");
    let amount_text = sb_protocol::format_number(amount);

    let payment_method = str_field(&order, "payment_method");
    if API_REFUND_GATEWAYS.contains(&payment_method) {
        let response = gateway
            .post(
                &format!("orders/{order_id}/refunds"),
                &json!({"amount": amount_text, "reason": reason, "api_refund": true}),
            )
            .await?;
        if response.is_success() {
            return Ok(format!("בוצע החזר בסך {amount_text} ₪ להזמנה {order_id}"));
        }
        tracing::warn!(order_id, status = response.status, "API refund failed, falling back to manual refund");
    }

    gateway
        .put(&format!("orders/{order_id}"), &json!({"status": "refunded"}))
        .await?
        .into_success()?;
    let note = if reason.is_empty() {
        format!("בוצע החזר ידני בסך {amount_text} ₪")
    } else {
        format!("בוצע החזר ידני בסך {amount_text} ₪. סיבה: {reason}")
    };
    add_note(gateway, order_id, &note, true).await?;
    Ok(format!("בוצע החזר בסך {amount_text} ₪ להזמנה {order_id}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{Method, MockCommerceGateway};

    #[test]
    fn status_mapping() {
        assert_eq!(order_status_code("הושלם"), Some("completed"));
        assert_eq!(order_status_code("processing"), Some("processing"));
        assert_eq!(order_status_code("מעופף"), None);
        assert_eq!(order_status_label("cancelled"), "בוטל");
    }

    #[tokio::test]
    async fn details_lists_items() {
        let gateway = MockCommerceGateway::with_sample_store();
        let text = order_details(&gateway, 123).await.unwrap();
        assert!(text.contains("פרטי הזמנה #123"));
        assert!(text.contains("בעיבוד"));
        assert!(text.contains("דנה כהן"));
        assert!(text.contains("חולצה × 1"));
    }

    #[tokio::test]
    async fn missing_order_is_not_found() {
        let gateway = MockCommerceGateway::with_sample_store();
        let err = order_details(&gateway, 999).await.unwrap_err();
        assert!(matches!(err, CommerceError::NotFound { .. }));
    }

    #[tokio::test]
    async fn tracking_from_shipping_lines() {
        let gateway = MockCommerceGateway::with_sample_store();
        let text = track_shipment(&gateway, 123).await.unwrap();
        assert!(text.contains("IL123456789"));
        assert!(text.contains("דואר ישראל"));
    }

    #[tokio::test]
    async fn weekly_report_metrics() {
        let gateway = MockCommerceGateway::with_sample_store();
        let text = sales_report(&gateway, "week").await.unwrap();
        assert!(text.starts_with("דוח מכירות לשבוע האחרון:"));
        assert!(text.contains("סה״כ מכירות: 2450.00 ₪"));
        assert!(text.contains("מספר הזמנות: 14"));
        assert!(text.contains("ממוצע להזמנה: 175.00 ₪"));
        assert!(text.contains("⚠️ בינוני"));
    }

    #[tokio::test]
    async fn empty_report_gives_advice() {
        let mut gateway = MockCommerceGateway::new();
        gateway.respond(Method::Get, "reports/sales", 200, json!([]));
        let text = sales_report(&gateway, "month").await.unwrap();
        assert!(text.contains("אין נתוני מכירות לחודש"));
    }

    #[tokio::test]
    async fn status_update_with_note() {
        let gateway = MockCommerceGateway::with_sample_store();
        let text = update_status(&gateway, 123, "הושלם", Some("  נשלח עם שליח  "))
            .await
            .unwrap();
        assert_eq!(text, "סטטוס הזמנה 123 עודכן ל-הושלם");

        let put = &gateway.calls_to(Method::Put)[0];
        assert_eq!(put.body.as_ref().unwrap()["status"], "completed");
        let note = &gateway.calls_to(Method::Post)[0];
        assert_eq!(note.resource, "orders/123/notes");
        assert_eq!(note.body.as_ref().unwrap()["note"], "נשלח עם שליח");
    }

    #[tokio::test]
    async fn approve_requires_pending() {
        let gateway = MockCommerceGateway::with_sample_store();
        let text = approve(&gateway, 123, None).await.unwrap();
        assert!(text.contains("לא ניתן לאשר"));
        assert!(gateway.calls_to(Method::Put).is_empty());
    }

    #[tokio::test]
    async fn approve_pending_order() {
        let gateway = MockCommerceGateway::with_sample_store();
        let text = approve(&gateway, 124, Some("שולם בהעברה")).await.unwrap();
        assert_eq!(text, "הזמנה 124 אושרה בהצלחה");
        assert_eq!(gateway.calls_to(Method::Post).len(), 1);
    }

    #[tokio::test]
    async fn reject_notifies_customer() {
        let gateway = MockCommerceGateway::with_sample_store();
        reject(&gateway, 124, "אין במלאי").await.unwrap();
        let note = gateway.calls_to(Method::Post)[0].body.clone().unwrap();
        assert_eq!(note["customer_note"], true);
        assert_eq!(note["note"], "הזמנה נדחתה: אין במלאי");
    }

    #[tokio::test]
    async fn manual_refund_caps_amount() {
        let gateway = MockCommerceGateway::with_sample_store();
        let text = refund(&gateway, 123, 500.0, Some("פגם")).await.unwrap();
        assert_eq!(text, "בוצע החזר בסך 220 ₪ להזמנה 123");

        let put = &gateway.calls_to(Method::Put)[0];
        assert_eq!(put.body.as_ref().unwrap()["status"], "refunded");
        let note = gateway.calls_to(Method::Post)[0].body.clone().unwrap();
        assert!(note["note"].as_str().unwrap().contains("סיבה: פגם"));
    }

    #[tokio::test]
    async fn api_refund_for_stripe_orders() {
        let gateway = MockCommerceGateway::with_sample_store();
        let text = refund(&gateway, 124, 45.0, None).await.unwrap();
        assert_eq!(text, "בוצע החזר בסך 45 ₪ להזמנה 124");
        let posts = gateway.calls_to(Method::Post);
        assert_eq!(posts[0].resource, "orders/124/refunds");
        assert!(gateway.calls_to(Method::Put).is_empty());
    }
}
