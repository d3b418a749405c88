//! Domain layer for the order lifecycle system.
//!
//! This crate provides the core order domain:
//! - Priceable components: single items and discountable bundles
//! - Fulfillment policies computing shipping cost, fees, and eligibility
//! - The order lifecycle state machine
//! - The Order aggregate and its builder family

pub mod order;

pub use order::{
    CustomerId, ExpressOrderBuilder, FulfillmentPolicy, InternationalOrderBuilder, Money, Order,
    OrderBuilder, OrderBundle, OrderComponent, OrderError, OrderItem, OrderState, ProductId,
    StandardOrderBuilder, components_total, flatten_items,
};
