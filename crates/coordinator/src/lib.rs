//! Order coordination façade and collaborator contracts.
//!
//! This crate provides the single mutation entry point for order
//! lifecycle management. Placing an order runs a fixed collaborator
//! sequence:
//! 1. Verify the payment method and inventory availability
//! 2. Charge payment, then reserve inventory (refunding the charge if
//!    reservation fails)
//! 3. Build and store the order, then fire a confirmation notification
//!
//! Later façade calls drive lifecycle transitions with their side
//! effects: shipment scheduling on ship, inventory release and refund on
//! cancel, notifications throughout. Collaborator failures and illegal
//! transitions are expected outcomes reported as `Option`/`bool` results,
//! never as panics.

pub mod config;
pub mod coordinator;
pub mod services;

pub use config::CoordinatorConfig;
pub use coordinator::OrderCoordinator;
pub use services::{
    InMemoryInventoryLedger, InMemoryNotificationSink, InMemoryPaymentGateway,
    InMemoryShippingGateway, InventoryLedger, NotificationKind, NotificationSink, PaymentGateway,
    ShippingGateway, StockLine,
};
