//! Commerce gateway and capability handlers.
//!
//! A narrow `CommerceGateway` abstraction over the store's REST API
//! (WooCommerce over HTTP, or an in-memory mock for tests) and the three
//! per-domain handlers that turn a validated operation into gateway calls
//! and a Hebrew reply: information, action, and research.

pub mod action;
pub mod config;
pub mod coupons;
pub mod customers;
pub mod error;
pub mod gateway;
pub mod handler;
pub mod http;
pub mod images;
pub mod information;
pub mod mock;
pub mod orders;
pub mod products;
pub mod research;
pub mod store;

// Re-export key types for convenience
pub use action::ActionHandler;
pub use config::CommerceConfig;
pub use error::{CommerceError, CommerceResult};
pub use gateway::{CommerceGateway, GatewayResponse};
pub use handler::CapabilityHandler;
pub use http::WooCommerceGateway;
pub use images::ImageAssociator;
pub use information::InformationHandler;
pub use mock::MockCommerceGateway;
pub use research::{MarketCatalog, ResearchHandler};
