//! Order aggregate and related types.

mod aggregate;
mod builder;
mod component;
mod policy;
mod state;
mod value_objects;

pub use aggregate::Order;
pub use builder::{
    ExpressOrderBuilder, InternationalOrderBuilder, OrderBuilder, StandardOrderBuilder,
};
pub use component::{OrderBundle, OrderComponent, OrderItem, components_total, flatten_items};
pub use policy::FulfillmentPolicy;
pub use state::OrderState;
pub use value_objects::{CustomerId, Money, ProductId};

use thiserror::Error;

/// Errors that can occur during order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Order ID is required.
    #[error("order id is required")]
    MissingOrderId,

    /// Customer ID is required.
    #[error("customer id is required")]
    MissingCustomerId,

    /// Order has no components.
    #[error("order has no components")]
    NoComponents,

    /// Invalid quantity.
    #[error("invalid quantity: {quantity} (must be greater than 0)")]
    InvalidQuantity { quantity: u32 },

    /// Invalid unit price.
    #[error("invalid price: {price} (must not be negative)")]
    InvalidPrice { price: i64 },

    /// Invalid bundle discount.
    #[error("invalid discount: {discount} (must be within [0, 1))")]
    InvalidDiscount { discount: f64 },

    /// The fulfillment policy declines the component set.
    #[error("policy {policy} cannot process this order")]
    PolicyRejected { policy: String },

    /// Lifecycle method invoked in a state that forbids it.
    #[error("cannot {action} order in {current_state} state: {reason}")]
    InvalidTransition {
        current_state: OrderState,
        action: &'static str,
        reason: &'static str,
    },

    /// Tracking number is assigned exactly once, by the shipping step.
    #[error("tracking number already assigned")]
    TrackingAlreadyAssigned,
}
