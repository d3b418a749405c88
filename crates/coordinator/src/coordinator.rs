//! Order coordination façade.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use chrono::{DateTime, Utc};
use common::OrderId;
use domain::{
    CustomerId, ExpressOrderBuilder, FulfillmentPolicy, InternationalOrderBuilder, Money, Order,
    OrderBuilder, OrderComponent, OrderItem, OrderState, StandardOrderBuilder,
};

use crate::config::CoordinatorConfig;
use crate::services::inventory::{InventoryLedger, StockLine};
use crate::services::notification::{NotificationKind, NotificationSink};
use crate::services::payment::PaymentGateway;
use crate::services::shipping::ShippingGateway;

/// Coordinates collaborator calls and lifecycle transitions for orders.
///
/// The coordinator is the sole mutation entry point for client code: it
/// owns the order collection, sequences payment, inventory, shipping, and
/// notification calls, and compensates completed steps when a later step
/// fails. Mutating operations are serialized per order id so two
/// concurrent transitions (say, ship and cancel) cannot race past the
/// lifecycle check. Collaborator failures and illegal transitions are
/// expected outcomes reported as `Option`/`bool` results.
pub struct OrderCoordinator<P, I, S, N>
where
    P: PaymentGateway,
    I: InventoryLedger,
    S: ShippingGateway,
    N: NotificationSink,
{
    orders: RwLock<HashMap<OrderId, Order>>,
    order_locks: Mutex<HashMap<OrderId, Arc<tokio::sync::Mutex<()>>>>,
    order_sequence: AtomicU64,
    international_builder: InternationalOrderBuilder,
    payment: P,
    inventory: I,
    shipping: S,
    notifications: N,
}

impl<P, I, S, N> OrderCoordinator<P, I, S, N>
where
    P: PaymentGateway,
    I: InventoryLedger,
    S: ShippingGateway,
    N: NotificationSink,
{
    /// Creates a coordinator with default configuration.
    pub fn new(payment: P, inventory: I, shipping: S, notifications: N) -> Self {
        Self::with_config(CoordinatorConfig::default(), payment, inventory, shipping, notifications)
    }

    /// Creates a coordinator with explicit configuration.
    pub fn with_config(
        config: CoordinatorConfig,
        payment: P,
        inventory: I,
        shipping: S,
        notifications: N,
    ) -> Self {
        Self {
            orders: RwLock::new(HashMap::new()),
            order_locks: Mutex::new(HashMap::new()),
            order_sequence: AtomicU64::new(config.sequence_start),
            international_builder: InternationalOrderBuilder::new(config.default_destination),
            payment,
            inventory,
            shipping,
            notifications,
        }
    }

    /// Places a standard order for a customer.
    ///
    /// Returns the stored order in the `New` state, or `None` when any
    /// validation or collaborator step fails.
    #[tracing::instrument(skip(self, items))]
    pub async fn place_order(
        &self,
        customer_id: CustomerId,
        items: Vec<OrderItem>,
    ) -> Option<Order> {
        self.place_order_with_policy(customer_id, items, FulfillmentPolicy::Standard)
            .await
    }

    /// Places an order under an explicit fulfillment policy.
    ///
    /// The builder matching the policy's tier is used, so express orders
    /// come back flagged priority and international orders flagged
    /// international. Collaborator sequence: verify payment method, check
    /// availability, charge, reserve. A reservation or construction
    /// failure after the charge succeeded refunds it before returning
    /// `None`.
    #[tracing::instrument(skip(self, items))]
    pub async fn place_order_with_policy(
        &self,
        customer_id: CustomerId,
        items: Vec<OrderItem>,
        policy: FulfillmentPolicy,
    ) -> Option<Order> {
        let started = std::time::Instant::now();

        if items.is_empty() {
            tracing::warn!(%customer_id, "rejected order with no items");
            return None;
        }

        // Naive total: item prices only, no policy fees. This is the
        // amount charged, and the amount refunded on compensation.
        let charge_amount = items
            .iter()
            .fold(Money::zero(), |acc, item| acc + item.total_price());
        let stock_lines: Vec<StockLine> = items.iter().map(StockLine::from).collect();

        if !self.payment.verify_method(&customer_id).await {
            tracing::warn!(%customer_id, "payment method verification failed");
            return None;
        }

        if !self.inventory.check_available(&stock_lines).await {
            tracing::warn!(%customer_id, "items not available in inventory");
            return None;
        }

        if !self.payment.charge(&customer_id, charge_amount).await {
            tracing::warn!(%customer_id, amount = %charge_amount, "payment charge failed");
            return None;
        }

        if !self.inventory.reserve(&stock_lines).await {
            // The charge already went through; undo it before reporting failure.
            tracing::warn!(%customer_id, "reservation failed, refunding charge");
            self.refund_or_log(&customer_id, charge_amount).await;
            return None;
        }

        let order_id = self.next_order_id();
        let components: Vec<OrderComponent> =
            items.into_iter().map(OrderComponent::Item).collect();

        let built = match policy {
            FulfillmentPolicy::Standard => {
                StandardOrderBuilder.build(order_id, customer_id.clone(), components, policy)
            }
            FulfillmentPolicy::Express => {
                ExpressOrderBuilder.build(order_id, customer_id.clone(), components, policy)
            }
            FulfillmentPolicy::International { .. } => {
                self.international_builder
                    .build(order_id, customer_id.clone(), components, policy)
            }
        };

        let order = match built {
            Ok(order) => order,
            Err(error) => {
                // Construction failures must not strand the charge or the
                // reservation.
                tracing::warn!(%customer_id, %error, "order rejected, compensating");
                self.inventory.release(&stock_lines).await;
                self.refund_or_log(&customer_id, charge_amount).await;
                return None;
            }
        };

        self.store(order.clone());
        self.notifications
            .notify(NotificationKind::Confirmation, &order)
            .await;

        metrics::counter!("orders_placed_total").increment(1);
        metrics::histogram!("place_order_duration_seconds")
            .record(started.elapsed().as_secs_f64());
        tracing::info!(order_id = %order.id(), total = %order.total_amount(), "order placed");

        Some(order)
    }

    /// Moves an order into processing.
    #[tracing::instrument(skip(self))]
    pub async fn process_order(&self, order_id: &OrderId) -> bool {
        let lock = self.lock_for(order_id);
        let _guard = lock.lock().await;

        let Some(mut order) = self.get_clone(order_id) else {
            tracing::warn!(%order_id, "order not found");
            return false;
        };

        let previous = order.state();
        if let Err(error) = order.process() {
            tracing::warn!(%order_id, %error, "cannot process order");
            return false;
        }

        let advanced = order.state() != previous;
        self.store(order.clone());

        if advanced {
            self.notifications
                .notify(NotificationKind::Processing, &order)
                .await;
            metrics::counter!("order_transitions_total", "transition" => "process").increment(1);
            tracing::info!(%order_id, "order processing");
        }
        true
    }

    /// Ships an order: schedules the shipment, attaches the tracking
    /// number, then marks the order shipped.
    ///
    /// Re-shipping an already shipped order is a no-op success that
    /// schedules nothing; the original tracking number stands.
    #[tracing::instrument(skip(self))]
    pub async fn ship_order(&self, order_id: &OrderId) -> bool {
        let lock = self.lock_for(order_id);
        let _guard = lock.lock().await;

        let Some(mut order) = self.get_clone(order_id) else {
            tracing::warn!(%order_id, "order not found");
            return false;
        };

        let previous = order.state();

        // The tracking number must be attached before the state flips,
        // and only a real transition schedules a shipment.
        if order.state().can_ship() {
            let tracking_number = self.shipping.schedule(&order).await;
            if let Err(error) = order.assign_tracking(tracking_number) {
                tracing::error!(%order_id, %error, "could not attach tracking number");
                return false;
            }
        }

        if let Err(error) = order.ship() {
            tracing::warn!(%order_id, %error, "cannot ship order");
            return false;
        }

        let advanced = order.state() != previous;
        self.store(order.clone());

        if advanced {
            self.notifications
                .notify(NotificationKind::Shipped, &order)
                .await;
            metrics::counter!("order_transitions_total", "transition" => "ship").increment(1);
            tracing::info!(
                %order_id,
                tracking_number = order.tracking_number().unwrap_or(""),
                "order shipped"
            );
        }
        true
    }

    /// Marks an order as delivered.
    #[tracing::instrument(skip(self))]
    pub async fn deliver_order(&self, order_id: &OrderId) -> bool {
        let lock = self.lock_for(order_id);
        let _guard = lock.lock().await;

        let Some(mut order) = self.get_clone(order_id) else {
            tracing::warn!(%order_id, "order not found");
            return false;
        };

        let previous = order.state();
        if let Err(error) = order.deliver() {
            tracing::warn!(%order_id, %error, "cannot deliver order");
            return false;
        }

        let advanced = order.state() != previous;
        self.store(order.clone());

        if advanced {
            self.notifications
                .notify(NotificationKind::Delivered, &order)
                .await;
            metrics::counter!("order_transitions_total", "transition" => "deliver").increment(1);
            tracing::info!(%order_id, "order delivered");
        }
        true
    }

    /// Cancels an order.
    ///
    /// When the order was still `New` or `Processing`, its reserved
    /// inventory is released and the charged amount refunded. Cancelling
    /// an already cancelled order is a no-op success with no second
    /// compensation.
    #[tracing::instrument(skip(self))]
    pub async fn cancel_order(&self, order_id: &OrderId) -> bool {
        let lock = self.lock_for(order_id);
        let _guard = lock.lock().await;

        let Some(mut order) = self.get_clone(order_id) else {
            tracing::warn!(%order_id, "order not found");
            return false;
        };

        let previous = order.state();
        if let Err(error) = order.cancel() {
            tracing::warn!(%order_id, %error, "cannot cancel order");
            return false;
        }

        if matches!(previous, OrderState::New | OrderState::Processing) {
            let stock_lines: Vec<StockLine> =
                order.line_items().into_iter().map(StockLine::from).collect();
            self.inventory.release(&stock_lines).await;
            self.refund_or_log(order.customer_id(), order.subtotal()).await;
        }

        let advanced = order.state() != previous;
        self.store(order.clone());

        if advanced {
            self.notifications
                .notify(NotificationKind::Cancelled, &order)
                .await;
            metrics::counter!("orders_cancelled_total").increment(1);
            tracing::info!(%order_id, "order cancelled");
        }
        true
    }

    /// Returns the current status of an order.
    pub fn get_order_status(&self, order_id: &OrderId) -> Option<OrderState> {
        self.orders
            .read()
            .unwrap()
            .get(order_id)
            .map(|order| order.state())
    }

    /// Returns a snapshot of an order.
    pub fn get_order_details(&self, order_id: &OrderId) -> Option<Order> {
        self.get_clone(order_id)
    }

    /// Returns snapshots of every order placed by a customer.
    pub fn get_customer_orders(&self, customer_id: &CustomerId) -> Vec<Order> {
        self.orders
            .read()
            .unwrap()
            .values()
            .filter(|order| order.customer_id() == customer_id)
            .cloned()
            .collect()
    }

    /// Returns the carrier's delivery-date estimate for an order.
    pub async fn get_estimated_delivery(&self, order_id: &OrderId) -> Option<DateTime<Utc>> {
        if !self.orders.read().unwrap().contains_key(order_id) {
            return None;
        }
        Some(self.shipping.estimate_delivery_date(Utc::now()).await)
    }

    /// Returns the carrier's shipment status for an order, once shipped.
    pub async fn track_order(&self, order_id: &OrderId) -> Option<String> {
        let order = self.get_clone(order_id)?;
        let tracking_number = order.tracking_number()?.to_string();
        Some(self.shipping.status(&tracking_number).await)
    }

    /// Returns the number of stored orders.
    pub fn order_count(&self) -> usize {
        self.orders.read().unwrap().len()
    }

    fn next_order_id(&self) -> OrderId {
        let sequence = self.order_sequence.fetch_add(1, Ordering::Relaxed) + 1;
        OrderId::new(format!("ORD-{sequence:06}"))
    }

    /// Returns the mutex serializing mutations of one order.
    fn lock_for(&self, order_id: &OrderId) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.order_locks.lock().unwrap();
        locks.entry(order_id.clone()).or_default().clone()
    }

    fn get_clone(&self, order_id: &OrderId) -> Option<Order> {
        self.orders.read().unwrap().get(order_id).cloned()
    }

    fn store(&self, order: Order) {
        self.orders
            .write()
            .unwrap()
            .insert(order.id().clone(), order);
    }

    async fn refund_or_log(&self, customer_id: &CustomerId, amount: Money) {
        if !self.payment.refund(customer_id, amount).await {
            tracing::error!(%customer_id, %amount, "compensating refund failed");
        }
    }
}
