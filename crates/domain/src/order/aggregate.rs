//! Order aggregate implementation.

use chrono::{DateTime, Utc};
use common::OrderId;
use serde::{Deserialize, Serialize};

use super::component::{OrderComponent, OrderItem, components_total, flatten_items};
use super::policy::FulfillmentPolicy;
use super::state::OrderState;
use super::value_objects::{CustomerId, Money};
use super::OrderError;

/// Order aggregate root.
///
/// Identity, components, and fulfillment policy are fixed at construction;
/// only the lifecycle state and the tracking number change afterwards, and
/// both only through their dedicated methods. Monetary totals are derived
/// from the components and policy on every read, never cached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Unique order identifier.
    id: OrderId,

    /// Customer who placed the order.
    customer_id: CustomerId,

    /// Creation timestamp, set once at construction.
    created_at: DateTime<Utc>,

    /// Priceable components, in the order they were supplied.
    components: Vec<OrderComponent>,

    /// Fulfillment policy governing shipping, fees, and eligibility.
    policy: FulfillmentPolicy,

    /// Current lifecycle state.
    state: OrderState,

    /// Tracking number, absent until the shipping step assigns it.
    tracking_number: Option<String>,

    /// Set by the express builder.
    priority: bool,

    /// Set by the international builder.
    international: bool,
}

impl Order {
    /// Creates an order in the `New` state.
    ///
    /// Only the builder family constructs orders, after validating inputs
    /// and policy eligibility.
    pub(crate) fn new(
        id: OrderId,
        customer_id: CustomerId,
        components: Vec<OrderComponent>,
        policy: FulfillmentPolicy,
    ) -> Self {
        Self {
            id,
            customer_id,
            created_at: Utc::now(),
            components,
            policy,
            state: OrderState::New,
            tracking_number: None,
            priority: false,
            international: false,
        }
    }

    pub(crate) fn set_priority(&mut self, priority: bool) {
        self.priority = priority;
    }

    pub(crate) fn set_international(&mut self, international: bool) {
        self.international = international;
    }
}

// Query methods
impl Order {
    /// Returns the order ID.
    pub fn id(&self) -> &OrderId {
        &self.id
    }

    /// Returns the customer ID.
    pub fn customer_id(&self) -> &CustomerId {
        &self.customer_id
    }

    /// Returns the creation timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the order's components.
    pub fn components(&self) -> &[OrderComponent] {
        &self.components
    }

    /// Returns the fulfillment policy.
    pub fn policy(&self) -> &FulfillmentPolicy {
        &self.policy
    }

    /// Returns the current lifecycle state.
    pub fn state(&self) -> OrderState {
        self.state
    }

    /// Returns the tracking number once shipping has assigned one.
    pub fn tracking_number(&self) -> Option<&str> {
        self.tracking_number.as_deref()
    }

    /// Returns true for priority (express) orders.
    pub fn is_priority(&self) -> bool {
        self.priority
    }

    /// Returns true for international orders.
    pub fn is_international(&self) -> bool {
        self.international
    }

    /// Returns the leaf items across all components, depth first.
    pub fn line_items(&self) -> Vec<&OrderItem> {
        flatten_items(&self.components)
    }

    /// Returns the component subtotal, before shipping and fees.
    pub fn subtotal(&self) -> Money {
        components_total(&self.components)
    }

    /// Returns the shipping cost under the order's policy.
    pub fn shipping_cost(&self) -> Money {
        self.policy.shipping_cost(&self.components)
    }

    /// Returns the processing fee under the order's policy.
    pub fn processing_fee(&self) -> Money {
        self.policy.processing_fee()
    }

    /// Returns the full amount: subtotal + shipping + processing fee.
    ///
    /// Recomputed from the components and policy on every call.
    pub fn total_amount(&self) -> Money {
        self.subtotal() + self.shipping_cost() + self.processing_fee()
    }

    /// Returns the policy's delivery estimate in business days.
    pub fn estimated_delivery_days(&self) -> u32 {
        self.policy.estimated_delivery_days()
    }

    /// Returns true if the order is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Renders an itemized receipt: each component's description followed
    /// by the subtotal, shipping, fee, and total lines.
    pub fn receipt(&self) -> String {
        let mut receipt = String::new();
        for component in &self.components {
            receipt.push_str(&component.description());
            receipt.push('\n');
        }
        receipt.push_str(&format!("Subtotal: {}\n", self.subtotal()));
        receipt.push_str(&format!("Shipping: {}\n", self.shipping_cost()));
        receipt.push_str(&format!("Processing fee: {}\n", self.processing_fee()));
        receipt.push_str(&format!("Total: {}", self.total_amount()));
        receipt
    }
}

// Lifecycle methods
impl Order {
    /// Moves the order into processing.
    pub fn process(&mut self) -> Result<(), OrderError> {
        self.state = self.state.process()?;
        Ok(())
    }

    /// Marks the order as shipped.
    pub fn ship(&mut self) -> Result<(), OrderError> {
        self.state = self.state.ship()?;
        Ok(())
    }

    /// Marks the order as delivered.
    pub fn deliver(&mut self) -> Result<(), OrderError> {
        self.state = self.state.deliver()?;
        Ok(())
    }

    /// Cancels the order.
    pub fn cancel(&mut self) -> Result<(), OrderError> {
        self.state = self.state.cancel()?;
        Ok(())
    }

    /// Attaches the tracking number assigned by the shipping step.
    ///
    /// Fails if one was already assigned; the number never changes once set.
    pub fn assign_tracking(&mut self, tracking_number: impl Into<String>) -> Result<(), OrderError> {
        if self.tracking_number.is_some() {
            return Err(OrderError::TrackingAlreadyAssigned);
        }
        self.tracking_number = Some(tracking_number.into());
        Ok(())
    }
}

impl std::fmt::Display for Order {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Order {} - Status: {}, Customer: {}, Total: {}",
            self.id,
            self.state,
            self.customer_id,
            self.total_amount()
        )
    }
}
