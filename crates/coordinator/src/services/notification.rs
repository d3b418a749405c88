//! Notification sink trait and in-memory implementation.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::OrderId;
use domain::Order;

/// Kind of customer-facing notification emitted by the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    /// Order placed and confirmed.
    Confirmation,
    /// Order moved into processing.
    Processing,
    /// Order left the warehouse.
    Shipped,
    /// Order reached the customer.
    Delivered,
    /// Order was cancelled.
    Cancelled,
}

impl NotificationKind {
    /// Returns the kind name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Confirmation => "confirmation",
            NotificationKind::Processing => "processing",
            NotificationKind::Shipped => "shipped",
            NotificationKind::Delivered => "delivered",
            NotificationKind::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One-way notification channel consumed by the coordinator.
///
/// Fire-and-forget: the coordinator never consumes a result, and a lost
/// notification never fails an order operation.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Delivers a notification about an order.
    async fn notify(&self, kind: NotificationKind, order: &Order);
}

/// In-memory notification sink recording deliveries for tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNotificationSink {
    sent: Arc<RwLock<Vec<(NotificationKind, OrderId)>>>,
}

impl InMemoryNotificationSink {
    /// Creates a new in-memory notification sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every notification sent, in order.
    pub fn sent(&self) -> Vec<(NotificationKind, OrderId)> {
        self.sent.read().unwrap().clone()
    }

    /// Returns the total number of notifications sent.
    pub fn sent_count(&self) -> usize {
        self.sent.read().unwrap().len()
    }

    /// Returns the number of notifications of a given kind.
    pub fn count_of(&self, kind: NotificationKind) -> usize {
        self.sent
            .read()
            .unwrap()
            .iter()
            .filter(|(sent_kind, _)| *sent_kind == kind)
            .count()
    }
}

#[async_trait]
impl NotificationSink for InMemoryNotificationSink {
    async fn notify(&self, kind: NotificationKind, order: &Order) {
        tracing::info!(
            order_id = %order.id(),
            customer_id = %order.customer_id(),
            kind = %kind,
            "notification sent"
        );
        self.sent.write().unwrap().push((kind, order.id().clone()));
    }
}
