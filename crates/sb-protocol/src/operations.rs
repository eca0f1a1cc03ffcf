use std::fmt;

use serde::{Deserialize, Serialize};

/// Capability area a message is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Domain {
    /// Read-only queries (products, reports, coupons, orders).
    #[serde(rename = "info", alias = "information")]
    Information,
    /// Mutating commands against the store.
    #[serde(rename = "action")]
    Action,
    /// Market and competitor research.
    #[serde(rename = "research")]
    Research,
}

impl Domain {
    pub const ALL: [Domain; 3] = [Domain::Information, Domain::Action, Domain::Research];

    /// Wire name used by the model (`agent` field) and in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Information => "info",
            Self::Action => "action",
            Self::Research => "research",
        }
    }

    /// Parse a wire name. Accepts `information` as an alias for `info`.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "info" | "information" => Some(Self::Information),
            "action" => Some(Self::Action),
            "research" => Some(Self::Research),
            _ => None,
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-only operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InformationOp {
    GetProducts,
    GetSalesReport,
    GetCoupons,
    GetOrder,
    GetCustomerOrders,
    TrackShipment,
}

impl InformationOp {
    pub const ALL: &'static [Self] = &[
        Self::GetProducts,
        Self::GetSalesReport,
        Self::GetCoupons,
        Self::GetOrder,
        Self::GetCustomerOrders,
        Self::TrackShipment,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::GetProducts => "get_products",
            Self::GetSalesReport => "get_sales_report",
            Self::GetCoupons => "get_coupons",
            Self::GetOrder => "get_order",
            Self::GetCustomerOrders => "get_customer_orders",
            Self::TrackShipment => "track_shipment",
        }
    }
}

/// Mutating operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionOp {
    CreateProduct,
    UpdateProductPrice,
    UpdateProductStock,
    UpdateStockQuantity,
    SetLowStockThreshold,
    UpdateProductName,
    UpdateProductDescription,
    UpdateProductCategory,
    DeleteProduct,
    CreateCoupon,
    UpdateOrderStatus,
    AddOrderNote,
    ProcessRefund,
    ApproveOrder,
    RejectOrder,
    ManageCustomerPoints,
    CreateShippingZone,
    AddShippingMethod,
    AddPaymentMethod,
}

impl ActionOp {
    pub const ALL: &'static [Self] = &[
        Self::CreateProduct,
        Self::UpdateProductPrice,
        Self::UpdateProductStock,
        Self::UpdateStockQuantity,
        Self::SetLowStockThreshold,
        Self::UpdateProductName,
        Self::UpdateProductDescription,
        Self::UpdateProductCategory,
        Self::DeleteProduct,
        Self::CreateCoupon,
        Self::UpdateOrderStatus,
        Self::AddOrderNote,
        Self::ProcessRefund,
        Self::ApproveOrder,
        Self::RejectOrder,
        Self::ManageCustomerPoints,
        Self::CreateShippingZone,
        Self::AddShippingMethod,
        Self::AddPaymentMethod,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::CreateProduct => "create_product",
            Self::UpdateProductPrice => "update_product_price",
            Self::UpdateProductStock => "update_product_stock",
            Self::UpdateStockQuantity => "update_stock_quantity",
            Self::SetLowStockThreshold => "set_low_stock_threshold",
            Self::UpdateProductName => "update_product_name",
            Self::UpdateProductDescription => "update_product_description",
            Self::UpdateProductCategory => "update_product_category",
            Self::DeleteProduct => "delete_product",
            Self::CreateCoupon => "create_coupon",
            Self::UpdateOrderStatus => "update_order_status",
            Self::AddOrderNote => "add_order_note",
            Self::ProcessRefund => "process_refund",
            Self::ApproveOrder => "approve_order",
            Self::RejectOrder => "reject_order",
            Self::ManageCustomerPoints => "manage_customer_points",
            Self::CreateShippingZone => "create_shipping_zone",
            Self::AddShippingMethod => "add_shipping_method",
            Self::AddPaymentMethod => "add_payment_method",
        }
    }
}

/// Research operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResearchOp {
    AnalyzeCompetitors,
    GetMarketTrends,
    GetRecommendations,
}

impl ResearchOp {
    pub const ALL: &'static [Self] = &[
        Self::AnalyzeCompetitors,
        Self::GetMarketTrends,
        Self::GetRecommendations,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::AnalyzeCompetitors => "analyze_competitors",
            Self::GetMarketTrends => "get_market_trends",
            Self::GetRecommendations => "get_recommendations",
        }
    }
}

/// A `(domain, operation)` pair. Closed: unknown pairs are rejected at
/// lookup rather than discovered at call time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "domain", content = "operation")]
pub enum Operation {
    #[serde(rename = "info")]
    Information(InformationOp),
    #[serde(rename = "action")]
    Action(ActionOp),
    #[serde(rename = "research")]
    Research(ResearchOp),
}

impl Operation {
    pub fn domain(self) -> Domain {
        match self {
            Self::Information(_) => Domain::Information,
            Self::Action(_) => Domain::Action,
            Self::Research(_) => Domain::Research,
        }
    }

    /// Operation name, unique within its domain (the model's `method`).
    pub fn name(self) -> &'static str {
        match self {
            Self::Information(op) => op.name(),
            Self::Action(op) => op.name(),
            Self::Research(op) => op.name(),
        }
    }

    /// Resolve an operation by wire name within a domain.
    pub fn lookup(domain: Domain, name: &str) -> Option<Self> {
        let name = name.trim();
        match domain {
            Domain::Information => InformationOp::ALL
                .iter()
                .find(|op| op.name() == name)
                .map(|op| Self::Information(*op)),
            Domain::Action => ActionOp::ALL
                .iter()
                .find(|op| op.name() == name)
                .map(|op| Self::Action(*op)),
            Domain::Research => ResearchOp::ALL
                .iter()
                .find(|op| op.name() == name)
                .map(|op| Self::Research(*op)),
        }
    }

    /// Every operation of a domain, in declaration order.
    pub fn in_domain(domain: Domain) -> Vec<Self> {
        match domain {
            Domain::Information => InformationOp::ALL
                .iter()
                .map(|op| Self::Information(*op))
                .collect(),
            Domain::Action => ActionOp::ALL.iter().map(|op| Self::Action(*op)).collect(),
            Domain::Research => ResearchOp::ALL.iter().map(|op| Self::Research(*op)).collect(),
        }
    }

    /// Every operation across all domains.
    pub fn all() -> Vec<Self> {
        Domain::ALL
            .iter()
            .flat_map(|d| Self::in_domain(*d))
            .collect()
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.domain(), self.name())
    }
}
