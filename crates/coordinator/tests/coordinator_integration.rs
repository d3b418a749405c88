//! End-to-end tests for the order coordination façade.
//!
//! These tests drive the full placement-to-delivery flow against the
//! in-memory collaborators and verify the compensation paths that keep
//! collaborator state consistent when a step fails.

use std::sync::Arc;

use async_trait::async_trait;
use common::OrderId;
use coordinator::{
    CoordinatorConfig, InMemoryInventoryLedger, InMemoryNotificationSink, InMemoryPaymentGateway,
    InMemoryShippingGateway, InventoryLedger, NotificationKind, OrderCoordinator, StockLine,
};
use domain::{CustomerId, FulfillmentPolicy, Money, OrderItem, OrderState, ProductId};

type TestCoordinator<I = InMemoryInventoryLedger> = OrderCoordinator<
    InMemoryPaymentGateway,
    I,
    InMemoryShippingGateway,
    InMemoryNotificationSink,
>;

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn setup() -> (
    TestCoordinator,
    InMemoryPaymentGateway,
    InMemoryInventoryLedger,
    InMemoryShippingGateway,
    InMemoryNotificationSink,
) {
    init_tracing();

    let payment = InMemoryPaymentGateway::new();
    let inventory = InMemoryInventoryLedger::new()
        .with_stock("P1", 100)
        .with_stock("P2", 50);
    let shipping = InMemoryShippingGateway::new();
    let notifications = InMemoryNotificationSink::new();

    let coordinator = OrderCoordinator::with_config(
        CoordinatorConfig {
            default_destination: "Canada".to_string(),
            sequence_start: 1000,
        },
        payment.clone(),
        inventory.clone(),
        shipping.clone(),
        notifications.clone(),
    );

    (coordinator, payment, inventory, shipping, notifications)
}

fn items() -> Vec<OrderItem> {
    vec![
        OrderItem::new("P1", "Laptop", 1, Money::from_cents(99_999)).unwrap(),
        OrderItem::new("P2", "Mouse", 2, Money::from_cents(2999)).unwrap(),
    ]
}

fn is_valid_tracking_number(tracking_number: &str) -> bool {
    let digits = match tracking_number.strip_prefix("TRACK-") {
        Some(digits) => digits,
        None => return false,
    };
    digits.len() == 8 && digits.chars().all(|c| c.is_ascii_digit())
}

#[tokio::test]
async fn place_order_charges_naive_total_and_stores_new_order() {
    let (coordinator, payment, inventory, _, notifications) = setup();
    let customer_id = CustomerId::new("CUST-1");

    let order = coordinator.place_order(customer_id.clone(), items()).await.unwrap();

    assert_eq!(order.state(), OrderState::New);
    assert_eq!(order.subtotal().cents(), 105_997);
    assert_eq!(payment.charged_total(&customer_id).cents(), 105_997);

    // Reservation took the units out of stock.
    assert_eq!(inventory.available_quantity(&ProductId::new("P1")).await, 99);
    assert_eq!(inventory.available_quantity(&ProductId::new("P2")).await, 48);

    assert_eq!(notifications.count_of(NotificationKind::Confirmation), 1);
    assert_eq!(
        coordinator.get_order_status(order.id()),
        Some(OrderState::New)
    );
}

#[tokio::test]
async fn full_lifecycle_from_placement_to_delivery() {
    let (coordinator, _, _, shipping, notifications) = setup();

    let order = coordinator
        .place_order(CustomerId::new("CUST-1"), items())
        .await
        .unwrap();
    let order_id = order.id().clone();

    assert!(coordinator.process_order(&order_id).await);
    assert_eq!(
        coordinator.get_order_status(&order_id),
        Some(OrderState::Processing)
    );

    assert!(coordinator.ship_order(&order_id).await);
    let shipped = coordinator.get_order_details(&order_id).unwrap();
    assert_eq!(shipped.state(), OrderState::Shipped);
    let tracking_number = shipped.tracking_number().unwrap();
    assert!(is_valid_tracking_number(tracking_number));
    assert!(shipping.has_shipment(tracking_number));

    assert!(coordinator.deliver_order(&order_id).await);
    assert_eq!(
        coordinator.get_order_status(&order_id),
        Some(OrderState::Delivered)
    );

    let kinds: Vec<NotificationKind> = notifications.sent().into_iter().map(|(k, _)| k).collect();
    assert_eq!(
        kinds,
        vec![
            NotificationKind::Confirmation,
            NotificationKind::Processing,
            NotificationKind::Shipped,
            NotificationKind::Delivered,
        ]
    );
}

#[tokio::test]
async fn cancel_after_processing_releases_inventory_and_refunds() {
    let (coordinator, payment, inventory, _, notifications) = setup();
    let customer_id = CustomerId::new("CUST-1");

    let order = coordinator.place_order(customer_id.clone(), items()).await.unwrap();
    let order_id = order.id().clone();
    assert!(coordinator.process_order(&order_id).await);

    assert!(coordinator.cancel_order(&order_id).await);
    assert_eq!(
        coordinator.get_order_status(&order_id),
        Some(OrderState::Cancelled)
    );

    // Stock is back at its pre-reservation counts and the charge is gone.
    assert_eq!(inventory.available_quantity(&ProductId::new("P1")).await, 100);
    assert_eq!(inventory.available_quantity(&ProductId::new("P2")).await, 50);
    assert_eq!(payment.charged_total(&customer_id).cents(), 0);
    assert_eq!(notifications.count_of(NotificationKind::Cancelled), 1);

    // Cancelling again is a no-op success without a second refund.
    assert!(coordinator.cancel_order(&order_id).await);
    assert_eq!(payment.charged_total(&customer_id).cents(), 0);
    assert_eq!(notifications.count_of(NotificationKind::Cancelled), 1);
}

#[tokio::test]
async fn empty_order_is_rejected_without_side_effects() {
    let (coordinator, payment, inventory, shipping, notifications) = setup();

    let result = coordinator
        .place_order(CustomerId::new("CUST-1"), Vec::new())
        .await;

    assert!(result.is_none());
    assert_eq!(coordinator.order_count(), 0);
    assert_eq!(payment.charge_count(), 0);
    assert_eq!(inventory.available_quantity(&ProductId::new("P1")).await, 100);
    assert_eq!(shipping.shipment_count(), 0);
    assert_eq!(notifications.sent_count(), 0);
}

#[tokio::test]
async fn policy_rejection_after_charge_is_fully_compensated() {
    let (coordinator, payment, inventory, _, notifications) = setup();
    let customer_id = CustomerId::new("CUST-1");

    // Six laptops push the total past the express ceiling; the charge and
    // reservation already happened and must both be undone.
    let expensive = vec![OrderItem::new("P1", "Laptop", 6, Money::from_cents(99_999)).unwrap()];
    let result = coordinator
        .place_order_with_policy(customer_id.clone(), expensive, FulfillmentPolicy::Express)
        .await;

    assert!(result.is_none());
    assert_eq!(coordinator.order_count(), 0);
    assert_eq!(payment.charged_total(&customer_id).cents(), 0);
    assert_eq!(inventory.available_quantity(&ProductId::new("P1")).await, 100);
    assert_eq!(notifications.sent_count(), 0);

    // An international order under the $50 floor is rejected the same way.
    let cheap = vec![OrderItem::new("P2", "Mouse", 1, Money::from_cents(2999)).unwrap()];
    let result = coordinator
        .place_order_with_policy(
            customer_id.clone(),
            cheap,
            FulfillmentPolicy::international("Japan"),
        )
        .await;

    assert!(result.is_none());
    assert_eq!(payment.charged_total(&customer_id).cents(), 0);
    assert_eq!(inventory.available_quantity(&ProductId::new("P2")).await, 50);
}

#[tokio::test]
async fn express_and_international_placement_set_their_flags() {
    let (coordinator, _, _, _, _) = setup();

    let express = coordinator
        .place_order_with_policy(
            CustomerId::new("CUST-1"),
            items(),
            FulfillmentPolicy::Express,
        )
        .await
        .unwrap();
    assert!(express.is_priority());
    assert_eq!(express.policy(), &FulfillmentPolicy::Express);

    let international = coordinator
        .place_order_with_policy(
            CustomerId::new("CUST-1"),
            items(),
            FulfillmentPolicy::international("Japan"),
        )
        .await
        .unwrap();
    assert!(international.is_international());
    assert_eq!(international.policy().destination(), Some("Japan"));
}

#[tokio::test]
async fn verification_failure_aborts_before_any_charge() {
    let (coordinator, payment, inventory, _, _) = setup();
    payment.set_fail_on_verify(true);

    let result = coordinator
        .place_order(CustomerId::new("CUST-1"), items())
        .await;

    assert!(result.is_none());
    assert_eq!(payment.charge_count(), 0);
    assert_eq!(inventory.available_quantity(&ProductId::new("P1")).await, 100);
}

#[tokio::test]
async fn unavailable_stock_aborts_before_any_charge() {
    let (coordinator, payment, _, _, _) = setup();
    let customer_id = CustomerId::new("CUST-1");

    let too_many = vec![OrderItem::new("P1", "Laptop", 500, Money::from_cents(99_999)).unwrap()];
    let result = coordinator.place_order(customer_id.clone(), too_many).await;

    assert!(result.is_none());
    assert_eq!(payment.charged_total(&customer_id).cents(), 0);
}

#[tokio::test]
async fn shipped_order_cannot_be_cancelled() {
    let (coordinator, payment, inventory, _, _) = setup();
    let customer_id = CustomerId::new("CUST-1");

    let order = coordinator.place_order(customer_id.clone(), items()).await.unwrap();
    let order_id = order.id().clone();
    coordinator.process_order(&order_id).await;
    coordinator.ship_order(&order_id).await;

    assert!(!coordinator.cancel_order(&order_id).await);
    assert_eq!(
        coordinator.get_order_status(&order_id),
        Some(OrderState::Shipped)
    );

    // No compensation ran: the charge stands and stock stays reserved.
    assert_eq!(payment.charged_total(&customer_id).cents(), 105_997);
    assert_eq!(inventory.available_quantity(&ProductId::new("P1")).await, 99);
}

#[tokio::test]
async fn repeated_ship_keeps_the_original_tracking_number() {
    let (coordinator, _, _, shipping, _) = setup();

    let order = coordinator
        .place_order(CustomerId::new("CUST-1"), items())
        .await
        .unwrap();
    let order_id = order.id().clone();
    coordinator.process_order(&order_id).await;
    coordinator.ship_order(&order_id).await;

    let first = coordinator
        .get_order_details(&order_id)
        .unwrap()
        .tracking_number()
        .unwrap()
        .to_string();

    // A second ship is a no-op success that schedules nothing new.
    assert!(coordinator.ship_order(&order_id).await);
    let second = coordinator
        .get_order_details(&order_id)
        .unwrap()
        .tracking_number()
        .unwrap()
        .to_string();

    assert_eq!(first, second);
    assert_eq!(shipping.shipment_count(), 1);
}

#[tokio::test]
async fn estimated_delivery_is_three_days_out() {
    let (coordinator, _, _, _, _) = setup();

    let order = coordinator
        .place_order(CustomerId::new("CUST-1"), items())
        .await
        .unwrap();

    let before = chrono::Utc::now();
    let estimated = coordinator.get_estimated_delivery(order.id()).await.unwrap();
    assert_eq!((estimated - before).num_days(), 3);
}

#[tokio::test]
async fn concurrent_ship_and_cancel_cannot_both_win() {
    let (coordinator, _, _, shipping, _) = setup();
    let coordinator = Arc::new(coordinator);

    let order = coordinator
        .place_order(CustomerId::new("CUST-1"), items())
        .await
        .unwrap();
    let order_id = order.id().clone();
    coordinator.process_order(&order_id).await;

    let ship_task = {
        let coordinator = Arc::clone(&coordinator);
        let order_id = order_id.clone();
        tokio::spawn(async move { coordinator.ship_order(&order_id).await })
    };
    let cancel_task = {
        let coordinator = Arc::clone(&coordinator);
        let order_id = order_id.clone();
        tokio::spawn(async move { coordinator.cancel_order(&order_id).await })
    };

    let shipped = ship_task.await.unwrap();
    let cancelled = cancel_task.await.unwrap();

    // Per-order serialization guarantees exactly one transition won.
    assert!(shipped != cancelled);

    let final_state = coordinator.get_order_status(&order_id).unwrap();
    if shipped {
        assert_eq!(final_state, OrderState::Shipped);
        assert_eq!(shipping.shipment_count(), 1);
    } else {
        assert_eq!(final_state, OrderState::Cancelled);
        assert_eq!(shipping.shipment_count(), 0);
    }
}

/// Inventory double whose availability check passes but whose
/// reservation always fails, forcing the refund compensation path.
#[derive(Debug, Clone, Default)]
struct UnreliableInventoryLedger;

#[async_trait]
impl InventoryLedger for UnreliableInventoryLedger {
    async fn check_available(&self, _lines: &[StockLine]) -> bool {
        true
    }

    async fn reserve(&self, _lines: &[StockLine]) -> bool {
        false
    }

    async fn release(&self, _lines: &[StockLine]) {}

    async fn available_quantity(&self, _product_id: &ProductId) -> u32 {
        0
    }
}

#[tokio::test]
async fn reservation_failure_after_charge_triggers_refund() {
    init_tracing();

    let payment = InMemoryPaymentGateway::new();
    let coordinator: TestCoordinator<UnreliableInventoryLedger> = OrderCoordinator::new(
        payment.clone(),
        UnreliableInventoryLedger,
        InMemoryShippingGateway::new(),
        InMemoryNotificationSink::new(),
    );

    let customer_id = CustomerId::new("CUST-1");
    let result = coordinator.place_order(customer_id.clone(), items()).await;

    assert!(result.is_none());
    assert_eq!(coordinator.order_count(), 0);
    // The charge happened, then the compensating refund zeroed it out.
    assert_eq!(payment.charge_count(), 1);
    assert_eq!(payment.charged_total(&customer_id).cents(), 0);
}
