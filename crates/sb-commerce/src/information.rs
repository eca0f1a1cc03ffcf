//! Information domain: read-only queries.

use std::sync::Arc;

use async_trait::async_trait;
use sb_protocol::{Domain, InformationOp, Operation, ParameterSet};

use crate::error::CommerceResult;
use crate::gateway::CommerceGateway;
use crate::handler::{CapabilityHandler, require_integer, wrong_domain};
use crate::{coupons, orders, products};

/// Products shown by default when listing.
const DEFAULT_PRODUCT_PAGE: u32 = 5;

pub struct InformationHandler {
    gateway: Arc<dyn CommerceGateway>,
    max_fetch: u32,
}

impl InformationHandler {
    /// `max_fetch` caps every list request.
    pub fn new(gateway: Arc<dyn CommerceGateway>, max_fetch: u32) -> Self {
        Self {
            gateway,
            max_fetch: max_fetch.max(1),
        }
    }

    fn page_size(&self, params: &ParameterSet, default: u32) -> u32 {
        params
            .integer("per_page")
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(default)
            .clamp(1, self.max_fetch)
    }
}

#[async_trait]
impl CapabilityHandler for InformationHandler {
    fn domain(&self) -> Domain {
        Domain::Information
    }

    async fn handle(&self, operation: Operation, params: &ParameterSet) -> CommerceResult<String> {
        let Operation::Information(op) = operation else {
            return Err(wrong_domain(operation, Domain::Information));
        };
        let gateway = self.gateway.as_ref();
        match op {
            InformationOp::GetProducts => {
                products::list_products(gateway, self.page_size(params, DEFAULT_PRODUCT_PAGE)).await
            }
            InformationOp::GetSalesReport => {
                let period = params.text("period").unwrap_or_else(|| "week".into());
                orders::sales_report(gateway, &period).await
            }
            InformationOp::GetCoupons => {
                coupons::list_coupons(gateway, self.page_size(params, self.max_fetch)).await
            }
            InformationOp::GetOrder => {
                orders::order_details(gateway, require_integer(params, "order_id")?).await
            }
            InformationOp::GetCustomerOrders => {
                let customer_id = require_integer(params, "customer_id")?;
                orders::customer_orders(gateway, customer_id, self.page_size(params, self.max_fetch))
                    .await
            }
            InformationOp::TrackShipment => {
                orders::track_shipment(gateway, require_integer(params, "order_id")?).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CommerceError;
    use crate::mock::{Method, MockCommerceGateway};
    use sb_protocol::ActionOp;

    fn handler(gateway: Arc<MockCommerceGateway>) -> InformationHandler {
        InformationHandler::new(gateway, 10)
    }

    #[tokio::test]
    async fn products_default_page_of_five() {
        let gateway = Arc::new(MockCommerceGateway::with_sample_store());
        let text = handler(gateway.clone())
            .handle(
                Operation::Information(InformationOp::GetProducts),
                &ParameterSet::new(),
            )
            .await
            .unwrap();
        assert!(text.contains("חולצה"));
        let call = &gateway.calls_to(Method::Get)[0];
        assert!(call.query.contains(&("per_page".to_string(), "5".to_string())));
    }

    #[tokio::test]
    async fn page_size_is_capped() {
        let gateway = Arc::new(MockCommerceGateway::with_sample_store());
        handler(gateway.clone())
            .handle(
                Operation::Information(InformationOp::GetProducts),
                &ParameterSet::new().with("per_page", 500_i64),
            )
            .await
            .unwrap();
        let call = &gateway.calls_to(Method::Get)[0];
        assert!(call.query.contains(&("per_page".to_string(), "10".to_string())));
    }

    #[tokio::test]
    async fn sales_report_period() {
        let gateway = Arc::new(MockCommerceGateway::with_sample_store());
        let text = handler(gateway.clone())
            .handle(
                Operation::Information(InformationOp::GetSalesReport),
                &ParameterSet::new().with("period", "month"),
            )
            .await
            .unwrap();
        assert!(text.contains("לחודש"));
    }

    #[tokio::test]
    async fn order_id_must_be_numeric() {
        let gateway = Arc::new(MockCommerceGateway::with_sample_store());
        let err = handler(gateway)
            .handle(
                Operation::Information(InformationOp::GetOrder),
                &ParameterSet::new().with("order_id", "abc"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CommerceError::InvalidParameter(_)));
    }

    #[tokio::test]
    async fn rejects_action_operation() {
        let gateway = Arc::new(MockCommerceGateway::with_sample_store());
        let err = handler(gateway)
            .handle(Operation::Action(ActionOp::DeleteProduct), &ParameterSet::new())
            .await
            .unwrap_err();
        assert!(matches!(err, CommerceError::InvalidParameter(_)));
    }
}
