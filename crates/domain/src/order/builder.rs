//! Order builders, one per fulfillment tier.

use common::OrderId;

use super::aggregate::Order;
use super::component::OrderComponent;
use super::policy::FulfillmentPolicy;
use super::value_objects::CustomerId;
use super::OrderError;

/// Factory for orders of a particular fulfillment tier.
///
/// `build` validates the inputs, forces the tier's policy, checks
/// eligibility against the effective policy, and produces the order in
/// its initial state. Implementations supply the tier-specific pieces.
pub trait OrderBuilder {
    /// Builder name used in creation logs.
    fn builder_name(&self) -> &'static str;

    /// Selects the policy the built order will carry.
    ///
    /// Every builder forces its own tier: a supplied policy of another
    /// tier is replaced, never silently kept.
    fn effective_policy(&self, supplied: FulfillmentPolicy) -> FulfillmentPolicy;

    /// Applies tier-specific decoration to a freshly constructed order.
    fn decorate(&self, _order: &mut Order) {}

    /// Validates inputs and produces an order in the `New` state.
    fn build(
        &self,
        id: OrderId,
        customer_id: CustomerId,
        components: Vec<OrderComponent>,
        policy: FulfillmentPolicy,
    ) -> Result<Order, OrderError> {
        if id.is_empty() {
            return Err(OrderError::MissingOrderId);
        }
        if customer_id.is_empty() {
            return Err(OrderError::MissingCustomerId);
        }
        if components.is_empty() {
            return Err(OrderError::NoComponents);
        }

        let policy = self.effective_policy(policy);
        if !policy.can_process(&components) {
            return Err(OrderError::PolicyRejected {
                policy: policy.name(),
            });
        }

        let mut order = Order::new(id, customer_id, components, policy);
        self.decorate(&mut order);

        tracing::info!(
            order_id = %order.id(),
            builder = self.builder_name(),
            total = %order.total_amount(),
            "order created"
        );
        metrics::counter!("orders_created_total").increment(1);

        Ok(order)
    }
}

/// Builds standard-tier orders.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardOrderBuilder;

impl OrderBuilder for StandardOrderBuilder {
    fn builder_name(&self) -> &'static str {
        "standard order builder"
    }

    fn effective_policy(&self, _supplied: FulfillmentPolicy) -> FulfillmentPolicy {
        FulfillmentPolicy::Standard
    }
}

/// Builds express-tier orders; always marks them as priority.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExpressOrderBuilder;

impl OrderBuilder for ExpressOrderBuilder {
    fn builder_name(&self) -> &'static str {
        "express order builder"
    }

    fn effective_policy(&self, supplied: FulfillmentPolicy) -> FulfillmentPolicy {
        match supplied {
            FulfillmentPolicy::Express => supplied,
            _ => FulfillmentPolicy::Express,
        }
    }

    fn decorate(&self, order: &mut Order) {
        order.set_priority(true);
    }
}

/// Builds international-tier orders; always marks them as international.
///
/// A supplied international policy keeps its destination; anything else is
/// replaced by an international policy for the builder's default country.
#[derive(Debug, Clone)]
pub struct InternationalOrderBuilder {
    default_destination: String,
}

impl InternationalOrderBuilder {
    /// Creates a builder with a default destination country.
    pub fn new(default_destination: impl Into<String>) -> Self {
        Self {
            default_destination: default_destination.into(),
        }
    }

    /// Returns the default destination country.
    pub fn default_destination(&self) -> &str {
        &self.default_destination
    }
}

impl OrderBuilder for InternationalOrderBuilder {
    fn builder_name(&self) -> &'static str {
        "international order builder"
    }

    fn effective_policy(&self, supplied: FulfillmentPolicy) -> FulfillmentPolicy {
        match supplied {
            FulfillmentPolicy::International { .. } => supplied,
            _ => FulfillmentPolicy::international(self.default_destination.clone()),
        }
    }

    fn decorate(&self, order: &mut Order) {
        order.set_international(true);
    }
}
