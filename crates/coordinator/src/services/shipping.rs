//! Shipping gateway trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use common::OrderId;
use domain::Order;

/// Days the carrier adds to the reference date when estimating delivery.
///
/// Independent of the policy-driven delivery-day figure, which is a
/// display estimate.
const DELIVERY_OFFSET_DAYS: i64 = 3;

/// Contract for carrier operations consumed by the coordinator.
#[async_trait]
pub trait ShippingGateway: Send + Sync {
    /// Schedules a shipment and returns its tracking number:
    /// `TRACK-` followed by 8 digits, unique per call.
    async fn schedule(&self, order: &Order) -> String;

    /// Returns a human-readable status for a tracking number.
    async fn status(&self, tracking_number: &str) -> String;

    /// Estimates the delivery date as a fixed offset from the reference date.
    async fn estimate_delivery_date(&self, reference: DateTime<Utc>) -> DateTime<Utc>;
}

#[derive(Debug)]
struct InMemoryShippingState {
    shipments: HashMap<String, OrderId>,
    next_id: u64,
}

impl Default for InMemoryShippingState {
    fn default() -> Self {
        Self {
            shipments: HashMap::new(),
            next_id: 1000,
        }
    }
}

/// In-memory shipping gateway for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryShippingGateway {
    state: Arc<RwLock<InMemoryShippingState>>,
}

impl InMemoryShippingGateway {
    /// Creates a new in-memory shipping gateway.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of scheduled shipments.
    pub fn shipment_count(&self) -> usize {
        self.state.read().unwrap().shipments.len()
    }

    /// Returns true if a shipment exists with the given tracking number.
    pub fn has_shipment(&self, tracking_number: &str) -> bool {
        self.state
            .read()
            .unwrap()
            .shipments
            .contains_key(tracking_number)
    }
}

#[async_trait]
impl ShippingGateway for InMemoryShippingGateway {
    async fn schedule(&self, order: &Order) -> String {
        let mut state = self.state.write().unwrap();

        state.next_id += 1;
        let tracking_number = format!("TRACK-{:08}", state.next_id);
        state
            .shipments
            .insert(tracking_number.clone(), order.id().clone());

        tracing::info!(order_id = %order.id(), %tracking_number, "shipment scheduled");
        tracking_number
    }

    async fn status(&self, tracking_number: &str) -> String {
        if self.has_shipment(tracking_number) {
            format!("Package with tracking number {tracking_number} is in transit")
        } else {
            format!("No shipment found for tracking number {tracking_number}")
        }
    }

    async fn estimate_delivery_date(&self, reference: DateTime<Utc>) -> DateTime<Utc> {
        reference + Duration::days(DELIVERY_OFFSET_DAYS)
    }
}
