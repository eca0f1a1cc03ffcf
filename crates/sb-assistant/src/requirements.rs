//! Parameter requirement table.
//!
//! Maps each operation to the parameters it cannot run without. A
//! requirement may accept aliases (models and users name prices in more
//! than one way); it is satisfied when any of its names carries a non-null
//! value and is always reported under its canonical name.

use sb_protocol::{ActionOp, InformationOp, Operation, ParameterSet, ResearchOp};

/// One required parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requirement {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
}

impl Requirement {
    const fn named(name: &'static str) -> Self {
        Self { name, aliases: &[] }
    }

    const fn with_aliases(name: &'static str, aliases: &'static [&'static str]) -> Self {
        Self { name, aliases }
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        std::iter::once(self.name).chain(self.aliases.iter().copied())
    }

    pub fn is_satisfied(&self, params: &ParameterSet) -> bool {
        self.names().any(|n| params.is_present(n))
    }
}

const ORDER_ID: Requirement = Requirement::named("order_id");
const CUSTOMER_ID: Requirement = Requirement::named("customer_id");
const PRODUCT_NAME: Requirement = Requirement::named("product_name");
const NAME: Requirement = Requirement::named("name");
const TITLE: Requirement = Requirement::named("title");
const AMOUNT: Requirement = Requirement::named("amount");
const MARKET_SEGMENT: Requirement = Requirement::named("market_segment");
const PRICE: Requirement = Requirement::with_aliases("price", &["regular_price"]);
const NEW_PRICE: Requirement = Requirement::with_aliases("price", &["new_price", "regular_price"]);

/// Required parameters for `operation`, in reporting order. Operations
/// without requirements yield an empty slice.
pub fn required_parameters(operation: Operation) -> &'static [Requirement] {
    match operation {
        Operation::Information(op) => match op {
            InformationOp::GetOrder | InformationOp::TrackShipment => &[ORDER_ID],
            InformationOp::GetCustomerOrders => &[CUSTOMER_ID],
            InformationOp::GetProducts | InformationOp::GetSalesReport | InformationOp::GetCoupons => &[],
        },
        Operation::Action(op) => match op {
            ActionOp::CreateProduct => &[NAME, PRICE],
            ActionOp::UpdateProductPrice => &[PRODUCT_NAME, NEW_PRICE],
            ActionOp::UpdateProductStock => {
                const STOCK_STATUS: Requirement = Requirement::named("stock_status");
                &[PRODUCT_NAME, STOCK_STATUS]
            }
            ActionOp::UpdateStockQuantity => {
                const QUANTITY: Requirement = Requirement::named("quantity");
                &[PRODUCT_NAME, QUANTITY]
            }
            ActionOp::SetLowStockThreshold => {
                const THRESHOLD: Requirement = Requirement::named("threshold");
                &[PRODUCT_NAME, THRESHOLD]
            }
            ActionOp::UpdateProductName => {
                const OLD_NAME: Requirement = Requirement::named("old_name");
                const NEW_NAME: Requirement = Requirement::named("new_name");
                &[OLD_NAME, NEW_NAME]
            }
            ActionOp::UpdateProductDescription => {
                const DESCRIPTION: Requirement = Requirement::named("description");
                &[PRODUCT_NAME, DESCRIPTION]
            }
            ActionOp::UpdateProductCategory => {
                const CATEGORY_NAME: Requirement = Requirement::named("category_name");
                &[PRODUCT_NAME, CATEGORY_NAME]
            }
            ActionOp::DeleteProduct => &[PRODUCT_NAME],
            ActionOp::CreateCoupon => &[AMOUNT],
            ActionOp::UpdateOrderStatus => {
                const STATUS: Requirement = Requirement::named("status");
                &[ORDER_ID, STATUS]
            }
            ActionOp::AddOrderNote => {
                const NOTE: Requirement = Requirement::named("note");
                &[ORDER_ID, NOTE]
            }
            ActionOp::ProcessRefund => &[ORDER_ID, AMOUNT],
            ActionOp::ApproveOrder | ActionOp::RejectOrder => &[ORDER_ID],
            ActionOp::ManageCustomerPoints => {
                const ACTION: Requirement = Requirement::named("action");
                const POINTS: Requirement = Requirement::named("points");
                &[CUSTOMER_ID, ACTION, POINTS]
            }
            ActionOp::CreateShippingZone => &[NAME],
            ActionOp::AddShippingMethod => {
                const ZONE_ID: Requirement = Requirement::named("zone_id");
                &[ZONE_ID, TITLE]
            }
            ActionOp::AddPaymentMethod => &[TITLE],
        },
        Operation::Research(
            ResearchOp::AnalyzeCompetitors | ResearchOp::GetMarketTrends | ResearchOp::GetRecommendations,
        ) => &[MARKET_SEGMENT],
    }
}

/// Canonical names of the unsatisfied requirements of `operation`.
pub fn missing_parameters(operation: Operation, params: &ParameterSet) -> Vec<String> {
    required_parameters(operation)
        .iter()
        .filter(|r| !r.is_satisfied(params))
        .map(|r| r.name.to_string())
        .collect()
}

/// Stricter check for model output: unsatisfied requirements, followed by
/// any other key the model explicitly set to null. A null stands for
/// "essential but unknown", so it is reported even when the table does not
/// list the key.
pub fn missing_in_model_output(operation: Operation, params: &ParameterSet) -> Vec<String> {
    let requirements = required_parameters(operation);
    let mut missing = missing_parameters(operation, params);

    for (key, value) in params.iter() {
        if !value.is_null() {
            continue;
        }
        // Keys belonging to a table requirement are already accounted for.
        let covered = requirements.iter().any(|r| r.names().any(|n| n == key));
        if !covered && !missing.contains(key) {
            missing.push(key.clone());
        }
    }
    missing
}

#[cfg(test)]
mod tests {
    use super::*;
    use sb_protocol::{Domain, ParamValue};

    #[test]
    fn unlisted_operations_have_no_requirements() {
        assert!(required_parameters(Operation::Information(InformationOp::GetProducts)).is_empty());
        assert!(missing_parameters(
            Operation::Information(InformationOp::GetCoupons),
            &ParameterSet::new()
        )
        .is_empty());
    }

    #[test]
    fn table_covers_every_operation_without_duplicates() {
        for op in Operation::all() {
            let names: Vec<_> = required_parameters(op).iter().map(|r| r.name).collect();
            let mut unique = names.clone();
            unique.dedup();
            assert_eq!(names, unique, "{op:?}");
        }
        let update_price = required_parameters(Operation::Action(ActionOp::UpdateProductPrice));
        assert_eq!(update_price[1].aliases, ["new_price", "regular_price"]);
    }

    #[test]
    fn every_research_operation_needs_a_segment() {
        for op in Operation::in_domain(Domain::Research) {
            assert_eq!(required_parameters(op)[0].name, "market_segment");
        }
    }

    #[test]
    fn null_counts_as_missing() {
        let params = ParameterSet::new()
            .with("name", "X")
            .with("price", ParamValue::Null);
        assert_eq!(
            missing_parameters(Operation::Action(ActionOp::CreateProduct), &params),
            ["price"]
        );
    }

    #[test]
    fn alias_satisfies_requirement() {
        let params = ParameterSet::new()
            .with("name", "חולצה")
            .with("regular_price", "70");
        assert!(missing_parameters(Operation::Action(ActionOp::CreateProduct), &params).is_empty());
    }

    #[test]
    fn reported_in_table_order() {
        let missing = missing_parameters(
            Operation::Action(ActionOp::ManageCustomerPoints),
            &ParameterSet::new().with("action", "add"),
        );
        assert_eq!(missing, ["customer_id", "points"]);
    }

    #[test]
    fn model_output_nulls_are_reported() {
        let params = ParameterSet::new()
            .with("amount", 20_i64)
            .with("code", ParamValue::Null);
        assert_eq!(
            missing_in_model_output(Operation::Action(ActionOp::CreateCoupon), &params),
            ["code"]
        );
    }

    #[test]
    fn model_output_null_alias_with_satisfied_requirement_is_fine() {
        let params = ParameterSet::new()
            .with("name", "X")
            .with("price", ParamValue::Null)
            .with("regular_price", "50");
        assert!(missing_in_model_output(Operation::Action(ActionOp::CreateProduct), &params).is_empty());
    }

    #[test]
    fn model_output_missing_reported_once() {
        let params = ParameterSet::new()
            .with("name", "X")
            .with("price", ParamValue::Null);
        assert_eq!(
            missing_in_model_output(Operation::Action(ActionOp::CreateProduct), &params),
            ["price"]
        );
    }
}
