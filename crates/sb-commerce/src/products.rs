//! Product reads and mutations.

use serde_json::{Value, json};

use crate::error::{CommerceError, CommerceResult};
use crate::gateway::CommerceGateway;

/// Store stock status codes and their Hebrew labels.
const STOCK_STATUSES: &[(&str, &str)] = &[
    ("instock", "במלאי"),
    ("outofstock", "אזל מהמלאי"),
    ("onbackorder", "בהזמנה מראש"),
];

/// Hebrew label for a stock status code. Unknown codes pass through.
pub fn stock_status_label(code: &str) -> &str {
    STOCK_STATUSES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, label)| *label)
        .unwrap_or(code)
}

/// Stock status code for a Hebrew word or an API code.
pub fn stock_status_code(input: &str) -> Option<&'static str> {
    let input = input.trim();
    match input {
        "במלאי" | "instock" => Some("instock"),
        "אזל" | "אזל מהמלאי" | "outofstock" => Some("outofstock"),
        "בהזמנה מראש" | "onbackorder" => Some("onbackorder"),
        _ => None,
    }
}

/// Find a product by exact (case-insensitive) name.
pub(crate) async fn find_product(gateway: &dyn CommerceGateway, name: &str) -> CommerceResult<Value> {
    let products = gateway
        .get("products", &[("search", name.to_string())])
        .await?
        .into_array()?;
    let wanted = name.trim().to_lowercase();
    products
        .into_iter()
        .find(|p| {
            p.get("name")
                .and_then(Value::as_str)
                .is_some_and(|n| n.trim().to_lowercase() == wanted)
        })
        .ok_or_else(|| CommerceError::not_found(format!("מוצר בשם '{name}'")))
}

pub(crate) fn entity_id(entity: &Value) -> CommerceResult<i64> {
    entity
        .get("id")
        .and_then(Value::as_i64)
        .ok_or_else(|| CommerceError::Decode("entity has no numeric id".into()))
}

fn text_field<'a>(entity: &'a Value, field: &str, default: &'a str) -> &'a str {
    entity.get(field).and_then(Value::as_str).unwrap_or(default)
}

// ── Reads ─────────────────────────────────────────────────────

pub async fn list_products(gateway: &dyn CommerceGateway, per_page: u32) -> CommerceResult<String> {
    let products = gateway
        .get(
            "products",
            &[("page", "1".to_string()), ("per_page", per_page.to_string())],
        )
        .await?
        .into_array()?;
    if products.is_empty() {
        return Ok("אין כרגע מוצרים בחנות.".into());
    }

    let mut lines = vec!["מוצרים בחנות:".to_string()];
    for p in products.iter().take(per_page as usize) {
        let status = stock_status_label(text_field(p, "stock_status", "לא ידוע"));
        lines.push(format!(
            "- {}, מחיר: {} ₪, סטטוס: {}",
            text_field(p, "name", "ללא שם"),
            text_field(p, "price", "לא צוין"),
            status
        ));
    }
    Ok(lines.join("\n"))
}

// ── Mutations ─────────────────────────────────────────────────

pub async fn create_product(
    gateway: &dyn CommerceGateway,
    name: &str,
    regular_price: &str,
    product_type: &str,
    stock_status: &str,
) -> CommerceResult<String> {
    let body = json!({
        "name": name,
        "regular_price": regular_price,
        "type": product_type,
        "stock_status": stock_status,
    });
    let created = gateway.post("products", &body).await?.into_success()?;
    Ok(format!(
        "נוצר מוצר חדש: {} במחיר {} ₪",
        text_field(&created, "name", name),
        regular_price
    ))
}

async fn update_product(
    gateway: &dyn CommerceGateway,
    product_name: &str,
    body: Value,
) -> CommerceResult<Value> {
    let product = find_product(gateway, product_name).await?;
    let id = entity_id(&product)?;
    gateway
        .put(&format!("products/{id}"), &body)
        .await?
        .into_success()
}

pub async fn update_price(
    gateway: &dyn CommerceGateway,
    product_name: &str,
    price: &str,
) -> CommerceResult<String> {
    update_product(gateway, product_name, json!({"regular_price": price})).await?;
    Ok(format!("מחיר המוצר '{product_name}' עודכן ל-{price} ₪"))
}

pub async fn update_stock_status(
    gateway: &dyn CommerceGateway,
    product_name: &str,
    status: &str,
) -> CommerceResult<String> {
    let code = stock_status_code(status).ok_or_else(|| {
        CommerceError::InvalidParameter(format!("unknown stock status '{status}'"))
    })?;
    update_product(gateway, product_name, json!({"stock_status": code})).await?;
    Ok(format!(
        "סטטוס המלאי של המוצר '{product_name}' עודכן ל{}",
        stock_status_label(code)
    ))
}

pub async fn update_stock_quantity(
    gateway: &dyn CommerceGateway,
    product_name: &str,
    quantity: i64,
) -> CommerceResult<String> {
    if quantity < 0 {
        return Err(CommerceError::InvalidParameter("quantity must not be negative".into()));
    }
    let status = if quantity > 0 { "instock" } else { "outofstock" };
    update_product(
        gateway,
        product_name,
        json!({"manage_stock": true, "stock_quantity": quantity, "stock_status": status}),
    )
    .await?;
    Ok(format!("כמות המלאי של המוצר '{product_name}' עודכנה ל-{quantity} יחידות"))
}

pub async fn set_low_stock_threshold(
    gateway: &dyn CommerceGateway,
    product_name: &str,
    threshold: i64,
) -> CommerceResult<String> {
    if threshold < 0 {
        return Err(CommerceError::InvalidParameter("threshold must not be negative".into()));
    }
    update_product(
        gateway,
        product_name,
        json!({"manage_stock": true, "low_stock_amount": threshold}),
    )
    .await?;
    Ok(format!("סף המלאי הנמוך של המוצר '{product_name}' הוגדר ל-{threshold} יחידות"))
}

pub async fn rename(
    gateway: &dyn CommerceGateway,
    old_name: &str,
    new_name: &str,
) -> CommerceResult<String> {
    update_product(gateway, old_name, json!({"name": new_name})).await?;
    Ok(format!("שם המוצר שונה מ-'{old_name}' ל-'{new_name}'"))
}

pub async fn update_description(
    gateway: &dyn CommerceGateway,
    product_name: &str,
    description: &str,
) -> CommerceResult<String> {
    update_product(gateway, product_name, json!({"description": description})).await?;
    Ok(format!("התיאור של המוצר '{product_name}' עודכן בהצלחה"))
}

/// Assign a product to a category, creating the category when it does not
/// exist yet.
pub async fn update_category(
    gateway: &dyn CommerceGateway,
    product_name: &str,
    category_name: &str,
) -> CommerceResult<String> {
    let product = find_product(gateway, product_name).await?;
    let product_id = entity_id(&product)?;

    let categories = gateway
        .get("products/categories", &[("search", category_name.to_string())])
        .await?
        .into_array()?;
    let existing = categories.into_iter().find(|c| {
        c.get("name")
            .and_then(Value::as_str)
            .is_some_and(|n| n.trim() == category_name.trim())
    });
    let category_id = match existing {
        Some(category) => entity_id(&category)?,
        None => {
            tracing::info!(category = category_name, "creating missing product category");
            let created = gateway
                .post("products/categories", &json!({"name": category_name}))
                .await?
                .into_success()?;
            entity_id(&created)?
        }
    };

    gateway
        .put(
            &format!("products/{product_id}"),
            &json!({"categories": [{"id": category_id}]}),
        )
        .await?
        .into_success()?;
    Ok(format!("המוצר '{product_name}' שויך לקטגוריה '{category_name}'"))
}

/// Delete a product by name. An unknown name is reported, never treated as
/// already deleted.
pub async fn delete(gateway: &dyn CommerceGateway, product_name: &str) -> CommerceResult<String> {
    let product = find_product(gateway, product_name).await?;
    let id = entity_id(&product)?;
    gateway
        .delete(&format!("products/{id}"), &[("force", "true".to_string())])
        .await?
        .into_success()?;
    tracing::info!(product = product_name, product_id = id, "product deleted");
    Ok(format!("המוצר '{product_name}' נמחק בהצלחה"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{Method, MockCommerceGateway};

    #[test]
    fn stock_status_mapping() {
        assert_eq!(stock_status_label("outofstock"), "אזל מהמלאי");
        assert_eq!(stock_status_label("weird"), "weird");
        assert_eq!(stock_status_code("אזל"), Some("outofstock"));
        assert_eq!(stock_status_code(" בהזמנה מראש "), Some("onbackorder"));
        assert_eq!(stock_status_code("לפעמים"), None);
    }

    #[tokio::test]
    async fn list_renders_status_labels() {
        let gateway = MockCommerceGateway::with_sample_store();
        let text = list_products(&gateway, 5).await.unwrap();
        assert!(text.starts_with("מוצרים בחנות:"));
        assert!(text.contains("- חולצה, מחיר: 70 ₪, סטטוס: במלאי"));
        assert!(text.contains("אזל מהמלאי"));
    }

    #[tokio::test]
    async fn list_empty_store() {
        let mut gateway = MockCommerceGateway::new();
        gateway.respond(Method::Get, "products", 200, json!([]));
        let text = list_products(&gateway, 5).await.unwrap();
        assert_eq!(text, "אין כרגע מוצרים בחנות.");
    }

    #[tokio::test]
    async fn find_requires_exact_name() {
        let gateway = MockCommerceGateway::with_sample_store();
        let product = find_product(&gateway, "חולצה").await.unwrap();
        assert_eq!(product["id"], 101);

        let err = find_product(&gateway, "חולצ").await.unwrap_err();
        assert!(matches!(err, CommerceError::NotFound { .. }));
    }

    #[tokio::test]
    async fn update_price_puts_regular_price() {
        let gateway = MockCommerceGateway::with_sample_store();
        let text = update_price(&gateway, "חולצה", "80").await.unwrap();
        assert!(text.contains("80"));

        let puts = gateway.calls_to(Method::Put);
        assert_eq!(puts[0].resource, "products/101");
        assert_eq!(puts[0].body.as_ref().unwrap()["regular_price"], "80");
    }

    #[tokio::test]
    async fn stock_quantity_zero_marks_out_of_stock() {
        let gateway = MockCommerceGateway::with_sample_store();
        update_stock_quantity(&gateway, "כובע", 0).await.unwrap();
        let body = gateway.calls_to(Method::Put)[0].body.clone().unwrap();
        assert_eq!(body["stock_status"], "outofstock");
        assert_eq!(body["stock_quantity"], 0);
    }

    #[tokio::test]
    async fn category_is_created_when_missing() {
        let gateway = MockCommerceGateway::with_sample_store();
        update_category(&gateway, "חולצה", "מבצעים").await.unwrap();
        let posts = gateway.calls_to(Method::Post);
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].resource, "products/categories");
    }

    #[tokio::test]
    async fn category_reuses_existing() {
        let gateway = MockCommerceGateway::with_sample_store();
        update_category(&gateway, "חולצה", "בגדי קיץ").await.unwrap();
        assert!(gateway.calls_to(Method::Post).is_empty());
        let put = &gateway.calls_to(Method::Put)[0];
        assert_eq!(put.body.as_ref().unwrap()["categories"][0]["id"], 15);
    }

    #[tokio::test]
    async fn delete_unknown_product_is_not_found() {
        let gateway = MockCommerceGateway::with_sample_store();
        let err = delete(&gateway, "גרביים").await.unwrap_err();
        assert!(matches!(&err, CommerceError::NotFound { item } if item == "מוצר בשם 'גרביים'"));
        assert!(gateway.calls_to(Method::Delete).is_empty());
    }

    #[tokio::test]
    async fn delete_known_product_forces_removal() {
        let gateway = MockCommerceGateway::with_sample_store();
        let text = delete(&gateway, "חולצה").await.unwrap();
        assert_eq!(text, "המוצר 'חולצה' נמחק בהצלחה");
        let call = &gateway.calls_to(Method::Delete)[0];
        assert_eq!(call.resource, "products/101");
    }

    #[tokio::test]
    async fn store_error_status_propagates() {
        let mut gateway = MockCommerceGateway::with_sample_store();
        gateway.respond(Method::Post, "products", 400, json!({"message": "Invalid price"}));
        let err = create_product(&gateway, "חולצה", "abc", "simple", "instock")
            .await
            .unwrap_err();
        assert!(matches!(err, CommerceError::Status { status: 400, .. }));
    }
}
