//! Dispatch table: routes a validated intent to its domain handler.
//!
//! This is the failure boundary for handlers. Requirements are checked
//! again here for every intent whatever its source, so a handler never
//! sees a missing required parameter. Handler errors are logged with the
//! redacted parameter set and returned as a [`DispatchError`]; nothing
//! below this point can reach the chat transport as a raw error.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use sb_commerce::{
    ActionHandler, CapabilityHandler, CommerceError, CommerceGateway, InformationHandler, MarketCatalog,
    ResearchHandler,
};
use sb_protocol::{DispatchError, Domain, Intent};
use tokio::time::timeout;

use crate::requirements::missing_parameters;

/// Default per-handler time budget.
pub const DEFAULT_HANDLER_TIMEOUT: Duration = Duration::from_secs(30);

pub struct DispatchTable {
    handlers: HashMap<Domain, Arc<dyn CapabilityHandler>>,
    timeout: Duration,
}

impl DispatchTable {
    /// An empty table. Every dispatch fails with `capability_not_found`
    /// until handlers are registered.
    pub fn new(timeout: Duration) -> Self {
        Self {
            handlers: HashMap::new(),
            timeout,
        }
    }

    /// Register a handler for its domain, replacing any previous one.
    pub fn register(mut self, handler: Arc<dyn CapabilityHandler>) -> Self {
        self.handlers.insert(handler.domain(), handler);
        self
    }

    /// The three store-backed handlers over one gateway.
    pub fn with_commerce(
        gateway: Arc<dyn CommerceGateway>,
        catalog: MarketCatalog,
        max_fetch: u32,
        timeout: Duration,
    ) -> Self {
        Self::new(timeout)
            .register(Arc::new(InformationHandler::new(gateway.clone(), max_fetch)))
            .register(Arc::new(ActionHandler::new(gateway)))
            .register(Arc::new(ResearchHandler::new(catalog)))
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Validate and run `intent`, returning the handler's reply.
    pub async fn dispatch(&self, intent: &Intent) -> Result<String, DispatchError> {
        let operation = intent.operation;
        let domain = operation.domain();

        let missing = missing_parameters(operation, &intent.parameters);
        if !missing.is_empty() {
            tracing::info!(operation = %operation, missing = ?missing, "intent rejected before dispatch");
            return Err(DispatchError::MissingParameters { operation, missing });
        }

        let Some(handler) = self.handlers.get(&domain) else {
            tracing::warn!(domain = %domain, operation = %operation, "no handler registered");
            return Err(DispatchError::CapabilityNotFound { domain, operation });
        };

        let result = match timeout(self.timeout, handler.handle(operation, &intent.parameters)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::error!(
                    domain = %domain,
                    operation = %operation,
                    params = ?intent.parameters.redacted(),
                    timeout_secs = self.timeout.as_secs(),
                    "handler timed out"
                );
                return Err(DispatchError::Timeout {
                    secs: self.timeout.as_secs(),
                });
            }
        };

        match result {
            Ok(reply) => {
                tracing::info!(
                    domain = %domain,
                    operation = %operation,
                    source = intent.source.as_str(),
                    "operation completed"
                );
                Ok(reply)
            }
            Err(CommerceError::NotFound { item }) => {
                tracing::info!(operation = %operation, item = %item, "entity not found");
                Err(DispatchError::NotFound { item })
            }
            Err(CommerceError::PermissionDenied(detail)) => {
                tracing::warn!(domain = %domain, operation = %operation, detail = %detail, "store refused the request");
                Err(DispatchError::PermissionDenied { detail })
            }
            Err(e) => {
                tracing::error!(
                    domain = %domain,
                    operation = %operation,
                    params = ?intent.parameters.redacted(),
                    error = %e,
                    "handler failed"
                );
                Err(DispatchError::HandlerFailure { detail: e.to_string() })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use sb_commerce::mock::Method;
    use sb_commerce::{CommerceResult, MockCommerceGateway};
    use sb_protocol::{ActionOp, ErrorKind, InformationOp, Operation, ParameterSet, ResolutionSource};

    /// Counts calls and answers with a fixed result.
    struct CountingHandler {
        domain: Domain,
        calls: AtomicUsize,
        delay: Duration,
        fail: bool,
    }

    impl CountingHandler {
        fn new(domain: Domain) -> Self {
            Self {
                domain,
                calls: AtomicUsize::new(0),
                delay: Duration::ZERO,
                fail: false,
            }
        }
    }

    #[async_trait]
    impl CapabilityHandler for CountingHandler {
        fn domain(&self) -> Domain {
            self.domain
        }

        async fn handle(&self, operation: Operation, _params: &ParameterSet) -> CommerceResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            if self.fail {
                return Err(CommerceError::Status {
                    status: 500,
                    body: "internal error, password=hunter2".into(),
                });
            }
            Ok(format!("ran {operation}"))
        }
    }

    fn intent(operation: Operation, params: ParameterSet) -> Intent {
        Intent::new(operation, params, ResolutionSource::PatternMatch)
    }

    #[tokio::test]
    async fn missing_parameters_never_reach_handler() {
        let handler = Arc::new(CountingHandler::new(Domain::Action));
        let table = DispatchTable::new(DEFAULT_HANDLER_TIMEOUT).register(handler.clone());

        for op in Operation::in_domain(Domain::Action) {
            if crate::requirements::required_parameters(op).is_empty() {
                continue;
            }
            let err = table.dispatch(&intent(op, ParameterSet::new())).await.unwrap_err();
            assert!(matches!(err, DispatchError::MissingParameters { .. }), "{op}");
        }
        assert_eq!(handler.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unregistered_domain_is_capability_not_found() {
        let table = DispatchTable::new(DEFAULT_HANDLER_TIMEOUT).register(Arc::new(CountingHandler::new(Domain::Action)));
        let op = Operation::Information(InformationOp::GetCoupons);
        let err = table.dispatch(&intent(op, ParameterSet::new())).await.unwrap_err();
        assert_eq!(
            err,
            DispatchError::CapabilityNotFound {
                domain: Domain::Information,
                operation: op,
            }
        );
    }

    #[tokio::test]
    async fn handler_error_is_normalized() {
        let mut handler = CountingHandler::new(Domain::Information);
        handler.fail = true;
        let table = DispatchTable::new(DEFAULT_HANDLER_TIMEOUT).register(Arc::new(handler));
        let err = table
            .dispatch(&intent(Operation::Information(InformationOp::GetCoupons), ParameterSet::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::HandlerFailure { .. }));
    }

    #[tokio::test]
    async fn slow_handler_times_out() {
        let mut handler = CountingHandler::new(Domain::Information);
        handler.delay = Duration::from_secs(5);
        let table = DispatchTable::new(Duration::from_millis(50)).register(Arc::new(handler));
        let err = table
            .dispatch(&intent(Operation::Information(InformationOp::GetProducts), ParameterSet::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::Timeout { .. }));
    }

    #[tokio::test]
    async fn commerce_table_creates_product() {
        let gateway = Arc::new(MockCommerceGateway::with_sample_store());
        let table = DispatchTable::with_commerce(
            gateway.clone(),
            MarketCatalog::default(),
            10,
            DEFAULT_HANDLER_TIMEOUT,
        );
        let params = ParameterSet::new()
            .with("name", "חולצה")
            .with("regular_price", "70")
            .with("type", "simple")
            .with("stock_status", "instock");
        let reply = table
            .dispatch(&intent(Operation::Action(ActionOp::CreateProduct), params))
            .await
            .unwrap();
        assert!(reply.contains("חולצה"), "{reply}");
        assert_eq!(gateway.calls_to(Method::Post).len(), 1);
    }

    #[tokio::test]
    async fn unknown_product_is_not_found() {
        let gateway = Arc::new(MockCommerceGateway::with_sample_store());
        let table = DispatchTable::with_commerce(gateway, MarketCatalog::default(), 10, DEFAULT_HANDLER_TIMEOUT);
        let params = ParameterSet::new().with("product_name", "מעיל חורף");
        let err = table
            .dispatch(&intent(Operation::Action(ActionOp::DeleteProduct), params))
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::NotFound { .. }), "{err:?}");
    }

    #[tokio::test]
    async fn rejected_credentials_are_permission_denied() {
        let mut gateway = MockCommerceGateway::with_sample_store();
        gateway.respond(Method::Get, "products", 401, serde_json::json!({"code": "woocommerce_rest_cannot_view"}));
        let table = DispatchTable::with_commerce(Arc::new(gateway), MarketCatalog::default(), 10, DEFAULT_HANDLER_TIMEOUT);
        let params = ParameterSet::new().with("product_name", "חולצה");
        let err = table
            .dispatch(&intent(Operation::Action(ActionOp::DeleteProduct), params))
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::PermissionDenied { .. }), "{err:?}");
        assert_eq!(err.kind(), ErrorKind::PermissionDenied);
    }
}
