//! Action domain: mutating commands.

use std::sync::Arc;

use async_trait::async_trait;
use sb_protocol::{ActionOp, Domain, Operation, ParameterSet};

use crate::customers::{self, PointsAction};
use crate::error::{CommerceError, CommerceResult};
use crate::gateway::CommerceGateway;
use crate::handler::{CapabilityHandler, require_integer, require_number, require_text, wrong_domain};
use crate::{coupons, orders, products, store};

/// Reason recorded when an order is rejected without one.
const DEFAULT_REJECT_REASON: &str = "לא צוינה סיבה";

pub struct ActionHandler {
    gateway: Arc<dyn CommerceGateway>,
}

/// A price given as text, validated as a non-negative decimal.
fn require_price(params: &ParameterSet, names: &[&str]) -> CommerceResult<String> {
    let price = require_text(params, names)?;
    match price.parse::<f64>() {
        Ok(p) if p.is_finite() && p >= 0.0 => Ok(price),
        _ => Err(CommerceError::InvalidParameter(format!("'{price}' is not a valid price"))),
    }
}

impl ActionHandler {
    pub fn new(gateway: Arc<dyn CommerceGateway>) -> Self {
        Self { gateway }
    }

    async fn run(&self, op: ActionOp, params: &ParameterSet) -> CommerceResult<String> {
        let gw = self.gateway.as_ref();
        match op {
            // ── Products ──────────────────────────────────────
            ActionOp::CreateProduct => {
                let name = require_text(params, &["name"])?;
                let price = require_price(params, &["price", "regular_price"])?;
                let product_type = params.text("type").unwrap_or_else(|| "simple".into());
                let stock_status = params
                    .text("stock_status")
                    .and_then(|s| products::stock_status_code(&s))
                    .unwrap_or("instock");
                products::create_product(gw, &name, &price, &product_type, stock_status).await
            }
            ActionOp::UpdateProductPrice => {
                let name = require_text(params, &["product_name"])?;
                let price = require_price(params, &["price", "new_price", "regular_price"])?;
                products::update_price(gw, &name, &price).await
            }
            ActionOp::UpdateProductStock => {
                let name = require_text(params, &["product_name"])?;
                let status = require_text(params, &["stock_status"])?;
                products::update_stock_status(gw, &name, &status).await
            }
            ActionOp::UpdateStockQuantity => {
                let name = require_text(params, &["product_name"])?;
                let quantity = require_integer(params, "quantity")?;
                products::update_stock_quantity(gw, &name, quantity).await
            }
            ActionOp::SetLowStockThreshold => {
                let name = require_text(params, &["product_name"])?;
                let threshold = require_integer(params, "threshold")?;
                products::set_low_stock_threshold(gw, &name, threshold).await
            }
            ActionOp::UpdateProductName => {
                let old_name = require_text(params, &["old_name"])?;
                let new_name = require_text(params, &["new_name"])?;
                products::rename(gw, &old_name, &new_name).await
            }
            ActionOp::UpdateProductDescription => {
                let name = require_text(params, &["product_name"])?;
                let description = require_text(params, &["description"])?;
                products::update_description(gw, &name, &description).await
            }
            ActionOp::UpdateProductCategory => {
                let name = require_text(params, &["product_name"])?;
                let category = require_text(params, &["category_name"])?;
                products::update_category(gw, &name, &category).await
            }
            ActionOp::DeleteProduct => {
                let name = require_text(params, &["product_name"])?;
                products::delete(gw, &name).await
            }

            // ── Coupons ───────────────────────────────────────
            ActionOp::CreateCoupon => {
                let amount = require_number(params, &["amount"])?;
                let discount_type = params
                    .text("discount_type")
                    .unwrap_or_else(|| "percent".into());
                coupons::create_coupon(gw, amount, &discount_type, params.text("code")).await
            }

            // ── Orders ────────────────────────────────────────
            ActionOp::UpdateOrderStatus => {
                let order_id = require_integer(params, "order_id")?;
                let status = require_text(params, &["status"])?;
                let note = params.text("note");
                orders::update_status(gw, order_id, &status, note.as_deref()).await
            }
            ActionOp::AddOrderNote => {
                let order_id = require_integer(params, "order_id")?;
                let note = require_text(params, &["note"])?;
                let to_customer = params.flag("is_customer_note").unwrap_or(false);
                orders::add_note(gw, order_id, &note, to_customer).await
            }
            ActionOp::ProcessRefund => {
                let order_id = require_integer(params, "order_id")?;
                let amount = require_number(params, &["amount"])?;
                let reason = params.text("reason");
                orders::refund(gw, order_id, amount, reason.as_deref()).await
            }
            ActionOp::ApproveOrder => {
                let order_id = require_integer(params, "order_id")?;
                let note = params.text("note");
                orders::approve(gw, order_id, note.as_deref()).await
            }
            ActionOp::RejectOrder => {
                let order_id = require_integer(params, "order_id")?;
                let reason = params
                    .text("reason")
                    .unwrap_or_else(|| DEFAULT_REJECT_REASON.into());
                orders::reject(gw, order_id, &reason).await
            }

            // ── Customers ─────────────────────────────────────
            ActionOp::ManageCustomerPoints => {
                let customer_id = require_integer(params, "customer_id")?;
                let action_text = require_text(params, &["action"])?;
                let action = PointsAction::parse(&action_text).ok_or_else(|| {
                    CommerceError::InvalidParameter(format!("unknown points action '{action_text}'"))
                })?;
                let points = require_integer(params, "points")?;
                let reason = params.text("reason");
                customers::manage_points(gw, customer_id, action, points, reason.as_deref()).await
            }

            // ── Shipping & payments ───────────────────────────
            ActionOp::CreateShippingZone => {
                let name = require_text(params, &["name"])?;
                let regions = params.list("regions").unwrap_or_default();
                let price = params.number("price");
                store::create_shipping_zone(gw, &name, &regions, price).await
            }
            ActionOp::AddShippingMethod => {
                let zone_id = require_integer(params, "zone_id")?;
                let title = require_text(params, &["title"])?;
                let method_id = params.text("method_id");
                let cost = params.number_any(&["cost", "price"]);
                store::add_shipping_method(gw, zone_id, &title, method_id.as_deref(), cost).await
            }
            ActionOp::AddPaymentMethod => {
                let title = require_text(params, &["title"])?;
                let description = params.text("description");
                store::add_payment_method(gw, &title, description.as_deref()).await
            }
        }
    }
}

#[async_trait]
impl CapabilityHandler for ActionHandler {
    fn domain(&self) -> Domain {
        Domain::Action
    }

    async fn handle(&self, operation: Operation, params: &ParameterSet) -> CommerceResult<String> {
        match operation {
            Operation::Action(op) => self.run(op, params).await,
            other => Err(wrong_domain(other, Domain::Action)),
        }
    }
}
