//! Collaborator traits and in-memory implementations for the coordinator.

pub mod inventory;
pub mod notification;
pub mod payment;
pub mod shipping;

pub use inventory::{InMemoryInventoryLedger, InventoryLedger, StockLine};
pub use notification::{InMemoryNotificationSink, NotificationKind, NotificationSink};
pub use payment::{InMemoryPaymentGateway, PaymentGateway};
pub use shipping::{InMemoryShippingGateway, ShippingGateway};
