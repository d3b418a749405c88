//! Payment gateway trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use domain::{CustomerId, Money};

/// Contract for payment operations consumed by the coordinator.
///
/// A negative result is an expected outcome, not an error; the
/// coordinator reacts with an early return and, where needed, a
/// compensating refund.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Verifies that the customer has a usable payment method.
    async fn verify_method(&self, customer_id: &CustomerId) -> bool;

    /// Charges the customer. Returns false when the amount is not
    /// positive or the charge is declined.
    async fn charge(&self, customer_id: &CustomerId, amount: Money) -> bool;

    /// Refunds a previously charged amount. Returns false when the
    /// amount is not positive.
    async fn refund(&self, customer_id: &CustomerId, amount: Money) -> bool;
}

#[derive(Debug, Default)]
struct InMemoryPaymentState {
    charged: HashMap<CustomerId, Money>,
    charge_count: u32,
    fail_on_verify: bool,
    fail_on_charge: bool,
}

/// In-memory payment gateway for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPaymentGateway {
    state: Arc<RwLock<InMemoryPaymentState>>,
}

impl InMemoryPaymentGateway {
    /// Creates a new in-memory payment gateway.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the gateway to fail payment-method verification.
    pub fn set_fail_on_verify(&self, fail: bool) {
        self.state.write().unwrap().fail_on_verify = fail;
    }

    /// Configures the gateway to decline charges.
    pub fn set_fail_on_charge(&self, fail: bool) {
        self.state.write().unwrap().fail_on_charge = fail;
    }

    /// Returns the net amount charged (charges minus refunds) for a customer.
    pub fn charged_total(&self, customer_id: &CustomerId) -> Money {
        self.state
            .read()
            .unwrap()
            .charged
            .get(customer_id)
            .copied()
            .unwrap_or_default()
    }

    /// Returns the number of successful charges.
    pub fn charge_count(&self) -> u32 {
        self.state.read().unwrap().charge_count
    }
}

#[async_trait]
impl PaymentGateway for InMemoryPaymentGateway {
    async fn verify_method(&self, customer_id: &CustomerId) -> bool {
        let state = self.state.read().unwrap();
        if state.fail_on_verify {
            tracing::warn!(%customer_id, "payment method rejected");
            return false;
        }
        true
    }

    async fn charge(&self, customer_id: &CustomerId, amount: Money) -> bool {
        if !amount.is_positive() {
            return false;
        }

        let mut state = self.state.write().unwrap();
        if state.fail_on_charge {
            tracing::warn!(%customer_id, %amount, "charge declined");
            return false;
        }

        state.charge_count += 1;
        *state.charged.entry(customer_id.clone()).or_default() += amount;
        true
    }

    async fn refund(&self, customer_id: &CustomerId, amount: Money) -> bool {
        if !amount.is_positive() {
            return false;
        }

        let mut state = self.state.write().unwrap();
        *state.charged.entry(customer_id.clone()).or_default() -= amount;
        true
    }
}
