//! Order lifecycle state machine.

use serde::{Deserialize, Serialize};

use super::OrderError;

/// The state of an order in its lifecycle.
///
/// State transitions:
/// ```text
/// New ──► Processing ──► Shipped ──► Delivered
///  │          │
///  └──────────┴──► Cancelled
/// ```
///
/// Transition methods consume the current state and return the next one;
/// the order aggregate swaps the value in. Repeating a transition that
/// already happened is a no-op; a forbidden transition is an error the
/// caller must treat as recoverable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderState {
    /// Order has been placed but not yet processed.
    #[default]
    New,

    /// Order is being prepared for shipment.
    Processing,

    /// Order has left the warehouse with a tracking number.
    Shipped,

    /// Order reached the customer (terminal state).
    Delivered,

    /// Order was cancelled (terminal state).
    Cancelled,
}

impl OrderState {
    /// Advances to `Processing`, or stays put once processing has started.
    pub fn process(self) -> Result<OrderState, OrderError> {
        match self {
            OrderState::New => Ok(OrderState::Processing),
            OrderState::Processing | OrderState::Shipped | OrderState::Delivered => Ok(self),
            OrderState::Cancelled => Err(self.rejected("process", "it was cancelled")),
        }
    }

    /// Advances to `Shipped` from `Processing`.
    pub fn ship(self) -> Result<OrderState, OrderError> {
        match self {
            OrderState::New => Err(self.rejected("ship", "it has not been processed yet")),
            OrderState::Processing => Ok(OrderState::Shipped),
            OrderState::Shipped | OrderState::Delivered => Ok(self),
            OrderState::Cancelled => Err(self.rejected("ship", "it was cancelled")),
        }
    }

    /// Advances to `Delivered` from `Shipped`.
    pub fn deliver(self) -> Result<OrderState, OrderError> {
        match self {
            OrderState::New => Err(self.rejected("deliver", "it has not been processed yet")),
            OrderState::Processing => Err(self.rejected("deliver", "it has not been shipped yet")),
            OrderState::Shipped => Ok(OrderState::Delivered),
            OrderState::Delivered => Ok(self),
            OrderState::Cancelled => Err(self.rejected("deliver", "it was cancelled")),
        }
    }

    /// Advances to `Cancelled`; only allowed before shipment.
    pub fn cancel(self) -> Result<OrderState, OrderError> {
        match self {
            OrderState::New | OrderState::Processing => Ok(OrderState::Cancelled),
            OrderState::Shipped => Err(self.rejected("cancel", "it has already been shipped")),
            OrderState::Delivered => Err(self.rejected("cancel", "it has already been delivered")),
            OrderState::Cancelled => Ok(self),
        }
    }

    /// Returns true if `process` would advance the state.
    pub fn can_process(&self) -> bool {
        matches!(self, OrderState::New)
    }

    /// Returns true if `ship` would advance the state.
    pub fn can_ship(&self) -> bool {
        matches!(self, OrderState::Processing)
    }

    /// Returns true if `deliver` would advance the state.
    pub fn can_deliver(&self) -> bool {
        matches!(self, OrderState::Shipped)
    }

    /// Returns true if the order can be cancelled in this state.
    pub fn can_cancel(&self) -> bool {
        matches!(self, OrderState::New | OrderState::Processing)
    }

    /// Returns true if this is a terminal state (no further transitions possible).
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderState::Delivered | OrderState::Cancelled)
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderState::New => "NEW",
            OrderState::Processing => "PROCESSING",
            OrderState::Shipped => "SHIPPED",
            OrderState::Delivered => "DELIVERED",
            OrderState::Cancelled => "CANCELLED",
        }
    }

    fn rejected(self, action: &'static str, reason: &'static str) -> OrderError {
        OrderError::InvalidTransition {
            current_state: self,
            action,
            reason,
        }
    }
}

impl std::fmt::Display for OrderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_is_new() {
        assert_eq!(OrderState::default(), OrderState::New);
    }

    #[test]
    fn test_new_order_transitions() {
        assert_eq!(OrderState::New.process().unwrap(), OrderState::Processing);
        assert_eq!(OrderState::New.cancel().unwrap(), OrderState::Cancelled);
        assert!(OrderState::New.ship().is_err());
        assert!(OrderState::New.deliver().is_err());
    }

    #[test]
    fn test_processing_order_transitions() {
        assert_eq!(
            OrderState::Processing.process().unwrap(),
            OrderState::Processing
        );
        assert_eq!(OrderState::Processing.ship().unwrap(), OrderState::Shipped);
        assert_eq!(
            OrderState::Processing.cancel().unwrap(),
            OrderState::Cancelled
        );
        assert!(OrderState::Processing.deliver().is_err());
    }

    #[test]
    fn test_shipped_order_transitions() {
        assert_eq!(OrderState::Shipped.process().unwrap(), OrderState::Shipped);
        assert_eq!(OrderState::Shipped.ship().unwrap(), OrderState::Shipped);
        assert_eq!(OrderState::Shipped.deliver().unwrap(), OrderState::Delivered);
        assert!(OrderState::Shipped.cancel().is_err());
    }

    #[test]
    fn test_delivered_order_never_regresses() {
        assert_eq!(
            OrderState::Delivered.process().unwrap(),
            OrderState::Delivered
        );
        assert_eq!(OrderState::Delivered.ship().unwrap(), OrderState::Delivered);
        assert_eq!(
            OrderState::Delivered.deliver().unwrap(),
            OrderState::Delivered
        );
        assert!(OrderState::Delivered.cancel().is_err());
    }

    #[test]
    fn test_cancelled_order_rejects_everything_but_cancel() {
        assert!(OrderState::Cancelled.process().is_err());
        assert!(OrderState::Cancelled.ship().is_err());
        assert!(OrderState::Cancelled.deliver().is_err());
        assert_eq!(
            OrderState::Cancelled.cancel().unwrap(),
            OrderState::Cancelled
        );
    }

    #[test]
    fn test_transition_predicates() {
        assert!(OrderState::New.can_process());
        assert!(!OrderState::Processing.can_process());

        assert!(OrderState::Processing.can_ship());
        assert!(!OrderState::New.can_ship());

        assert!(OrderState::Shipped.can_deliver());
        assert!(!OrderState::Processing.can_deliver());
    }

    #[test]
    fn test_can_cancel_before_shipment_only() {
        assert!(OrderState::New.can_cancel());
        assert!(OrderState::Processing.can_cancel());
        assert!(!OrderState::Shipped.can_cancel());
        assert!(!OrderState::Delivered.can_cancel());
        assert!(!OrderState::Cancelled.can_cancel());
    }

    #[test]
    fn test_terminal_states() {
        assert!(!OrderState::New.is_terminal());
        assert!(!OrderState::Processing.is_terminal());
        assert!(!OrderState::Shipped.is_terminal());
        assert!(OrderState::Delivered.is_terminal());
        assert!(OrderState::Cancelled.is_terminal());
    }

    #[test]
    fn test_transition_error_names_state_and_action() {
        let err = OrderState::Cancelled.process().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("process"));
        assert!(message.contains("CANCELLED"));
    }

    #[test]
    fn test_display() {
        assert_eq!(OrderState::New.to_string(), "NEW");
        assert_eq!(OrderState::Processing.to_string(), "PROCESSING");
        assert_eq!(OrderState::Shipped.to_string(), "SHIPPED");
        assert_eq!(OrderState::Delivered.to_string(), "DELIVERED");
        assert_eq!(OrderState::Cancelled.to_string(), "CANCELLED");
    }

    #[test]
    fn test_serialization() {
        let state = OrderState::Processing;
        let json = serde_json::to_string(&state).unwrap();
        let deserialized: OrderState = serde_json::from_str(&json).unwrap();
        assert_eq!(state, deserialized);
    }
}
