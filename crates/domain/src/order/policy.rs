//! Fulfillment policies governing shipping cost, fees, and eligibility.

use serde::{Deserialize, Serialize};

use super::component::{OrderComponent, components_total};
use super::value_objects::Money;

/// Orders strictly above this total ship free on the standard tier.
const STANDARD_FREE_SHIPPING_OVER: Money = Money::from_dollars(100);
/// Flat rate below the free-shipping threshold.
const STANDARD_FLAT_RATE: Money = Money::from_cents(599);

/// Express shipping rate as a fraction of the order total.
const EXPRESS_RATE: f64 = 0.15;
const EXPRESS_MINIMUM: Money = Money::from_dollars(15);
const EXPRESS_FEE: Money = Money::from_cents(999);
/// Express is only available strictly below this total.
const EXPRESS_MAX_TOTAL: Money = Money::from_dollars(5000);

/// International shipping rate as a fraction of the order total.
const INTERNATIONAL_RATE: f64 = 0.25;
const INTERNATIONAL_MINIMUM: Money = Money::from_dollars(30);
const INTERNATIONAL_FEE: Money = Money::from_cents(1999);
const INTERNATIONAL_MIN_TOTAL: Money = Money::from_dollars(50);
const INTERNATIONAL_MAX_TOTAL: Money = Money::from_dollars(10_000);

/// Strategy for processing an order: how shipping cost, fees, delivery
/// estimates, and eligibility vary by service tier.
///
/// All methods are pure functions of the component list (and, for
/// `International`, the destination country fixed at construction).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FulfillmentPolicy {
    /// Regular shipping, free above the threshold, no processing fee.
    Standard,
    /// Expedited shipping with a processing surcharge.
    Express,
    /// Cross-border shipping with customs handling.
    International { destination: String },
}

impl FulfillmentPolicy {
    /// Creates an international policy for a destination country.
    pub fn international(destination: impl Into<String>) -> Self {
        FulfillmentPolicy::International {
            destination: destination.into(),
        }
    }

    /// Returns the policy name, including the destination for international.
    pub fn name(&self) -> String {
        match self {
            FulfillmentPolicy::Standard => "Standard Processing".to_string(),
            FulfillmentPolicy::Express => "Express Processing".to_string(),
            FulfillmentPolicy::International { destination } => {
                format!("International Processing ({destination})")
            }
        }
    }

    /// Returns the destination country for international policies.
    pub fn destination(&self) -> Option<&str> {
        match self {
            FulfillmentPolicy::International { destination } => Some(destination),
            _ => None,
        }
    }

    /// Computes the shipping cost for a component list.
    pub fn shipping_cost(&self, components: &[OrderComponent]) -> Money {
        let total = components_total(components);
        match self {
            FulfillmentPolicy::Standard => {
                if total > STANDARD_FREE_SHIPPING_OVER {
                    Money::zero()
                } else {
                    STANDARD_FLAT_RATE
                }
            }
            FulfillmentPolicy::Express => total.scale(EXPRESS_RATE).max(EXPRESS_MINIMUM),
            FulfillmentPolicy::International { .. } => {
                total.scale(INTERNATIONAL_RATE).max(INTERNATIONAL_MINIMUM)
            }
        }
    }

    /// Returns the flat processing fee for this tier.
    pub fn processing_fee(&self) -> Money {
        match self {
            FulfillmentPolicy::Standard => Money::zero(),
            FulfillmentPolicy::Express => EXPRESS_FEE,
            FulfillmentPolicy::International { .. } => INTERNATIONAL_FEE,
        }
    }

    /// Returns the estimated delivery time in business days.
    pub fn estimated_delivery_days(&self) -> u32 {
        match self {
            FulfillmentPolicy::Standard => 5,
            FulfillmentPolicy::Express => 2,
            FulfillmentPolicy::International { .. } => 14,
        }
    }

    /// Returns true if this tier can process the component list.
    pub fn can_process(&self, components: &[OrderComponent]) -> bool {
        if components.is_empty() {
            return false;
        }

        let total = components_total(components);
        match self {
            FulfillmentPolicy::Standard => true,
            FulfillmentPolicy::Express => total < EXPRESS_MAX_TOTAL,
            FulfillmentPolicy::International { .. } => {
                total >= INTERNATIONAL_MIN_TOTAL && total < INTERNATIONAL_MAX_TOTAL
            }
        }
    }

    /// Returns a customer-facing description of this tier.
    pub fn description(&self) -> String {
        match self {
            FulfillmentPolicy::Standard => {
                "Standard processing with 5-7 business days delivery. \
                 Free shipping on orders over $100."
                    .to_string()
            }
            FulfillmentPolicy::Express => format!(
                "Express processing with 1-2 business days delivery. \
                 Additional processing fee of {EXPRESS_FEE} applies."
            ),
            FulfillmentPolicy::International { destination } => format!(
                "International processing to {destination} with 10-14 business days \
                 delivery. Includes customs documentation fee of {INTERNATIONAL_FEE}."
            ),
        }
    }
}
