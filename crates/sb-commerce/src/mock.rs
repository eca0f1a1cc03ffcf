//! In-memory commerce gateway for tests: canned responses plus a call log.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::error::{CommerceError, CommerceResult};
use crate::gateway::{CommerceGateway, GatewayResponse};

/// HTTP verb of a recorded call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Upload,
}

/// A call made against the mock.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: Method,
    pub resource: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

/// A mock gateway serving canned responses by `(method, resource)`.
///
/// Unregistered reads return 404. Unregistered writes echo the request body
/// back with an `id`, the way the store does for created/updated entities.
/// `GET` list responses honour a `search` query by filtering on `name`.
pub struct MockCommerceGateway {
    responses: HashMap<(Method, String), GatewayResponse>,
    failures: HashMap<(Method, String), String>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl Default for MockCommerceGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCommerceGateway {
    pub fn new() -> Self {
        Self {
            responses: HashMap::new(),
            failures: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Register a canned response.
    pub fn respond(&mut self, method: Method, resource: impl Into<String>, status: u16, body: Value) {
        self.responses
            .insert((method, resource.into()), GatewayResponse::new(status, body));
    }

    /// Make a call fail at the transport level.
    pub fn fail(&mut self, method: Method, resource: impl Into<String>, message: impl Into<String>) {
        self.failures.insert((method, resource.into()), message.into());
    }

    /// Calls received so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Calls received for one method.
    pub fn calls_to(&self, method: Method) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.method == method)
            .collect()
    }

    /// A small fashion store: three products, two categories, two coupons,
    /// a shipped order (123) and a pending one (124), a customer with loyalty
    /// points (7), and a weekly sales report.
    pub fn with_sample_store() -> Self {
        let mut m = Self::new();
        m.respond(
            Method::Get,
            "products",
            200,
            json!([
                {"id": 101, "name": "חולצה", "price": "70", "regular_price": "70", "stock_status": "instock", "stock_quantity": 12},
                {"id": 102, "name": "מכנסיים", "price": "150", "regular_price": "150", "stock_status": "outofstock", "stock_quantity": 0},
                {"id": 103, "name": "כובע", "price": "45", "regular_price": "45", "stock_status": "onbackorder", "stock_quantity": null}
            ]),
        );
        m.respond(
            Method::Get,
            "products/categories",
            200,
            json!([
                {"id": 15, "name": "בגדי קיץ", "count": 4},
                {"id": 16, "name": "אביזרים", "count": 2}
            ]),
        );
        m.respond(
            Method::Get,
            "coupons",
            200,
            json!([
                {"id": 1, "code": "SUMMER10", "amount": "10", "discount_type": "percent", "usage_count": 3, "date_expires": null},
                {"id": 2, "code": "FIXED50", "amount": "50", "discount_type": "fixed_cart", "usage_count": 0, "date_expires": "2026-12-31T00:00:00"}
            ]),
        );
        m.respond(
            Method::Get,
            "reports/sales",
            200,
            json!([
                {"total_sales": "2450.00", "total_orders": 14, "total_items": 21, "total_customers": 9, "net_sales": "2300.00"}
            ]),
        );
        m.respond(
            Method::Get,
            "orders/123",
            200,
            json!({
                "id": 123,
                "status": "processing",
                "total": "220.00",
                "currency": "ILS",
                "date_created": "2026-10-01T10:15:00",
                "billing": {"first_name": "דנה", "last_name": "כהן"},
                "line_items": [
                    {"name": "חולצה", "quantity": 1, "total": "70.00"},
                    {"name": "מכנסיים", "quantity": 1, "total": "150.00"}
                ],
                "shipping_lines": [
                    {"method_title": "דואר ישראל", "tracking_number": "IL123456789", "total": "25.00"}
                ]
            }),
        );
        m.respond(
            Method::Get,
            "orders/124",
            200,
            json!({
                "id": 124,
                "status": "pending",
                "total": "45.00",
                "payment_method": "stripe",
                "date_created": "2026-10-14T18:30:00",
                "billing": {"first_name": "יוסי", "last_name": "לוי"},
                "line_items": [{"name": "כובע", "quantity": 1, "total": "45.00"}],
                "shipping_lines": []
            }),
        );
        m.respond(
            Method::Get,
            "orders",
            200,
            json!([
                {"id": 123, "status": "processing", "total": "220.00", "date_created": "2026-10-01T10:15:00"},
                {"id": 98, "status": "completed", "total": "45.00", "date_created": "2026-09-12T08:00:00"}
            ]),
        );
        m.respond(
            Method::Get,
            "customers/7",
            200,
            json!({"id": 7, "first_name": "דנה", "last_name": "כהן", "meta_data": [{"key": "loyalty_points", "value": "40"}]}),
        );
        m.respond(
            Method::Get,
            "shipping/zones",
            200,
            json!([{"id": 1, "name": "ישראל"}]),
        );
        m
    }

    fn record(&self, method: Method, resource: &str, query: &[(&str, String)], body: Option<&Value>) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RecordedCall {
                method,
                resource: resource.to_string(),
                query: query
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.clone()))
                    .collect(),
                body: body.cloned(),
            });
        }
    }

    fn check_failure(&self, method: Method, resource: &str) -> CommerceResult<()> {
        match self.failures.get(&(method, resource.to_string())) {
            Some(message) => Err(CommerceError::Http(message.clone())),
            None => Ok(()),
        }
    }

    fn canned(&self, method: Method, resource: &str) -> Option<GatewayResponse> {
        self.responses.get(&(method, resource.to_string())).cloned()
    }

    /// Echo a write back with an id: the trailing path segment when numeric,
    /// otherwise a fresh one.
    fn echo(&self, status: u16, resource: &str, body: Option<&Value>) -> GatewayResponse {
        let id = resource
            .rsplit('/')
            .next()
            .and_then(|s| s.parse::<i64>().ok())
            .unwrap_or_else(|| 1000 + self.calls().len() as i64);
        let mut echoed = match body {
            Some(Value::Object(map)) => Value::Object(map.clone()),
            _ => json!({}),
        };
        if let Value::Object(map) = &mut echoed {
            map.insert("id".into(), json!(id));
        }
        GatewayResponse::new(status, echoed)
    }
}

fn filter_by_search(response: GatewayResponse, query: &[(&str, String)]) -> GatewayResponse {
    let Some((_, needle)) = query.iter().find(|(k, _)| *k == "search") else {
        return response;
    };
    let needle = needle.to_lowercase();
    match response.body {
        Value::Array(items) => {
            let filtered = items
                .into_iter()
                .filter(|item| {
                    item.get("name")
                        .or_else(|| item.get("code"))
                        .and_then(Value::as_str)
                        .is_some_and(|name| name.to_lowercase().contains(&needle))
                })
                .collect();
            GatewayResponse::new(response.status, Value::Array(filtered))
        }
        body => GatewayResponse::new(response.status, body),
    }
}

#[async_trait]
impl CommerceGateway for MockCommerceGateway {
    async fn get(&self, resource: &str, query: &[(&str, String)]) -> CommerceResult<GatewayResponse> {
        self.record(Method::Get, resource, query, None);
        self.check_failure(Method::Get, resource)?;
        Ok(match self.canned(Method::Get, resource) {
            Some(resp) => filter_by_search(resp, query),
            None => GatewayResponse::new(404, json!({"code": "not_found", "message": "Invalid ID."})),
        })
    }

    async fn post(&self, resource: &str, body: &Value) -> CommerceResult<GatewayResponse> {
        self.record(Method::Post, resource, &[], Some(body));
        self.check_failure(Method::Post, resource)?;
        Ok(self
            .canned(Method::Post, resource)
            .unwrap_or_else(|| self.echo(201, resource, Some(body))))
    }

    async fn put(&self, resource: &str, body: &Value) -> CommerceResult<GatewayResponse> {
        self.record(Method::Put, resource, &[], Some(body));
        self.check_failure(Method::Put, resource)?;
        Ok(self
            .canned(Method::Put, resource)
            .unwrap_or_else(|| self.echo(200, resource, Some(body))))
    }

    async fn delete(&self, resource: &str, query: &[(&str, String)]) -> CommerceResult<GatewayResponse> {
        self.record(Method::Delete, resource, query, None);
        self.check_failure(Method::Delete, resource)?;
        Ok(self
            .canned(Method::Delete, resource)
            .unwrap_or_else(|| self.echo(200, resource, None)))
    }

    async fn upload_media(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> CommerceResult<GatewayResponse> {
        let meta = json!({"file_name": file_name, "content_type": content_type, "size": bytes.len()});
        self.record(Method::Upload, "media", &[], Some(&meta));
        self.check_failure(Method::Upload, "media")?;
        Ok(self.canned(Method::Upload, "media").unwrap_or_else(|| {
            GatewayResponse::new(201, json!({"id": 500, "source_url": format!("https://shop.test/{file_name}")}))
        }))
    }
}
