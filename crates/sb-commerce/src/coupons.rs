//! Coupon listing, creation, and code generation.

use rand::Rng;
use serde_json::{Value, json};

use crate::error::{CommerceError, CommerceResult};
use crate::gateway::CommerceGateway;

/// Code prefix for percentage coupons.
pub const PERCENT_PREFIX: &str = "SALE";
/// Code prefix for fixed-amount coupons.
pub const FIXED_PREFIX: &str = "FIXED";

const DISCOUNT_TYPES: &[&str] = &["percent", "fixed_cart", "fixed_product"];

/// Generate a coupon code: prefix, amount, and a random 4-digit suffix,
/// e.g. `SALE20_4821`.
pub fn generate_code(prefix: &str, amount: &str) -> String {
    let suffix: u16 = rand::thread_rng().gen_range(1000..=9999);
    format!("{prefix}{}_{suffix}", amount.trim())
}

/// Code prefix matching a discount type.
pub fn prefix_for(discount_type: &str) -> &'static str {
    if discount_type == "percent" {
        PERCENT_PREFIX
    } else {
        FIXED_PREFIX
    }
}

pub async fn list_coupons(gateway: &dyn CommerceGateway, per_page: u32) -> CommerceResult<String> {
    let coupons = gateway
        .get(
            "coupons",
            &[("page", "1".to_string()), ("per_page", per_page.to_string())],
        )
        .await?
        .into_array()?;
    if coupons.is_empty() {
        return Ok("אין קופונים פעילים כרגע.".into());
    }

    let mut lines = vec!["קופונים פעילים:".to_string()];
    for c in &coupons {
        let code = c.get("code").and_then(Value::as_str).unwrap_or("ללא קוד");
        let amount = c.get("amount").and_then(Value::as_str).unwrap_or("0");
        let kind = c.get("discount_type").and_then(Value::as_str).unwrap_or("");
        let line = match kind {
            "percent" => format!("- קוד: {code}, {amount}% הנחה"),
            "fixed_cart" => format!("- קוד: {code}, {amount} ₪ הנחה קבועה לסל"),
            "fixed_product" => format!("- קוד: {code}, {amount} ₪ הנחה קבועה למוצר"),
            other => format!("- קוד: {code}, {amount} ₪ {other}"),
        };
        lines.push(line);
    }
    Ok(lines.join("\n"))
}

/// Create a single-use-per-customer coupon.
pub async fn create_coupon(
    gateway: &dyn CommerceGateway,
    amount: f64,
    discount_type: &str,
    code: Option<String>,
) -> CommerceResult<String> {
    if !DISCOUNT_TYPES.contains(&discount_type) {
        return Err(CommerceError::InvalidParameter(format!(
            "unknown discount type '{discount_type}'"
        )));
    }
    if amount <= 0.0 || (discount_type == "percent" && amount > 100.0) {
        return Err(CommerceError::InvalidParameter(format!(
            "discount amount {amount} is out of range"
        )));
    }

    let amount_text = sb_protocol::format_number(amount);
    let code = code.unwrap_or_else(|| generate_code(prefix_for(discount_type), &amount_text));
    let body = json!({
        "code": code,
        "discount_type": discount_type,
        "amount": amount_text,
        "description": "קופון שנוצר אוטומטית",
        "minimum_amount": "0",
        "usage_limit": 100,
        "usage_limit_per_user": 1,
        "individual_use": true,
    });
    let created = gateway.post("coupons", &body).await?.into_success()?;
    let code = created.get("code").and_then(Value::as_str).unwrap_or(&code);
    let discount = if discount_type == "percent" {
        format!("{amount_text}% הנחה")
    } else {
        format!("{amount_text} ₪ הנחה")
    };
    Ok(format!("הקופון {code} נוצר בהצלחה ({discount})"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{Method, MockCommerceGateway};

    fn looks_generated(code: &str, prefix: &str, amount: &str) -> bool {
        let Some(rest) = code.strip_prefix(&format!("{prefix}{amount}_")) else {
            return false;
        };
        rest.len() == 4 && rest.chars().all(|c| c.is_ascii_digit()) && !rest.starts_with('0')
    }

    #[test]
    fn generated_code_shape() {
        for _ in 0..50 {
            let code = generate_code("SALE", "20");
            assert!(looks_generated(&code, "SALE", "20"), "bad code {code}");
        }
    }

    #[test]
    fn prefixes() {
        assert_eq!(prefix_for("percent"), "SALE");
        assert_eq!(prefix_for("fixed_cart"), "FIXED");
    }

    #[tokio::test]
    async fn list_formats_percent_and_fixed() {
        let gateway = MockCommerceGateway::with_sample_store();
        let text = list_coupons(&gateway, 10).await.unwrap();
        assert!(text.contains("- קוד: SUMMER10, 10% הנחה"));
        assert!(text.contains("- קוד: FIXED50, 50 ₪ הנחה קבועה לסל"));
    }

    #[tokio::test]
    async fn create_generates_code_when_absent() {
        let gateway = MockCommerceGateway::new();
        let text = create_coupon(&gateway, 20.0, "percent", None).await.unwrap();
        assert!(text.contains("נוצר בהצלחה"));

        let body = gateway.calls_to(Method::Post)[0].body.clone().unwrap();
        let code = body["code"].as_str().unwrap();
        assert!(looks_generated(code, "SALE", "20"), "bad code {code}");
        assert_eq!(body["amount"], "20");
        assert_eq!(body["usage_limit_per_user"], 1);
        assert_eq!(body["individual_use"], true);
    }

    #[tokio::test]
    async fn create_keeps_explicit_code() {
        let gateway = MockCommerceGateway::new();
        let text = create_coupon(&gateway, 50.0, "fixed_cart", Some("VIP50".into()))
            .await
            .unwrap();
        assert!(text.contains("VIP50"));
    }

    #[tokio::test]
    async fn percent_over_hundred_rejected() {
        let gateway = MockCommerceGateway::new();
        let err = create_coupon(&gateway, 120.0, "percent", None).await.unwrap_err();
        assert!(matches!(err, CommerceError::InvalidParameter(_)));
        assert!(gateway.calls().is_empty());
    }
}
