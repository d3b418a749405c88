//! Priceable order components: single items and discountable bundles.

use serde::{Deserialize, Serialize};

use super::value_objects::{Money, ProductId};
use super::OrderError;

/// A single product line in an order.
///
/// Immutable after construction; the constructor validates price and
/// quantity so an invalid line can never reach an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    product_id: ProductId,
    name: String,
    quantity: u32,
    unit_price: Money,
}

impl OrderItem {
    /// Creates a new order item.
    ///
    /// Fails when the quantity is zero or the unit price is negative.
    pub fn new(
        product_id: impl Into<ProductId>,
        name: impl Into<String>,
        quantity: u32,
        unit_price: Money,
    ) -> Result<Self, OrderError> {
        if quantity == 0 {
            return Err(OrderError::InvalidQuantity { quantity });
        }
        if unit_price.is_negative() {
            return Err(OrderError::InvalidPrice {
                price: unit_price.cents(),
            });
        }

        Ok(Self {
            product_id: product_id.into(),
            name: name.into(),
            quantity,
            unit_price,
        })
    }

    /// Returns the product identifier.
    pub fn product_id(&self) -> &ProductId {
        &self.product_id
    }

    /// Returns the product name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the quantity ordered.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Returns the price per unit.
    pub fn unit_price(&self) -> Money {
        self.unit_price
    }

    /// Returns the total price for this line (unit price * quantity).
    pub fn total_price(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }

    /// Renders a one-line description of this item.
    pub fn description(&self) -> String {
        format!(
            "{} x{} @ {} = {}",
            self.name,
            self.quantity,
            self.unit_price,
            self.total_price()
        )
    }
}

/// A named group of components with a discount applied to its subtotal.
///
/// Children are exclusively owned, so a bundle can never contain an
/// ancestor of itself. Insertion order is description order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBundle {
    name: String,
    discount: f64,
    children: Vec<OrderComponent>,
}

impl OrderBundle {
    /// Creates an empty bundle with a discount fraction.
    ///
    /// Fails when the discount is outside `[0, 1)`.
    pub fn new(name: impl Into<String>, discount: f64) -> Result<Self, OrderError> {
        if !(0.0..1.0).contains(&discount) {
            return Err(OrderError::InvalidDiscount { discount });
        }

        Ok(Self {
            name: name.into(),
            discount,
            children: Vec::new(),
        })
    }

    /// Adds a component to the bundle.
    pub fn add(&mut self, component: impl Into<OrderComponent>) {
        self.children.push(component.into());
    }

    /// Returns the bundle name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the discount fraction.
    pub fn discount(&self) -> f64 {
        self.discount
    }

    /// Returns the child components in insertion order.
    pub fn children(&self) -> &[OrderComponent] {
        &self.children
    }

    /// Returns the discounted total: (sum of children totals) * (1 - discount).
    pub fn total_price(&self) -> Money {
        let subtotal = components_total(&self.children);
        subtotal.scale(1.0 - self.discount)
    }

    /// Renders a tree description of the bundle and its children.
    pub fn description(&self) -> String {
        let discount = if self.discount > 0.0 {
            format!(" ({:.0}% discount)", self.discount * 100.0)
        } else {
            String::new()
        };

        let mut description = format!("{}{}:\n", self.name, discount);
        for child in &self.children {
            description.push_str("  └─ ");
            description.push_str(&child.description().replace('\n', "\n     "));
            description.push('\n');
        }
        description.push_str(&format!("  Total: {}", self.total_price()));
        description
    }
}

/// A priceable component of an order: a single item or a bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OrderComponent {
    /// A single product line.
    Item(OrderItem),
    /// A discountable group of components.
    Bundle(OrderBundle),
}

impl OrderComponent {
    /// Returns the component's display name.
    pub fn name(&self) -> &str {
        match self {
            OrderComponent::Item(item) => item.name(),
            OrderComponent::Bundle(bundle) => bundle.name(),
        }
    }

    /// Returns the quantity: the item quantity, or 1 for a bundle.
    pub fn quantity(&self) -> u32 {
        match self {
            OrderComponent::Item(item) => item.quantity(),
            OrderComponent::Bundle(_) => 1,
        }
    }

    /// Returns the unit price: the item price, or the bundle's total.
    pub fn unit_price(&self) -> Money {
        match self {
            OrderComponent::Item(item) => item.unit_price(),
            OrderComponent::Bundle(bundle) => bundle.total_price(),
        }
    }

    /// Returns the total price of this component, recursively.
    pub fn total_price(&self) -> Money {
        match self {
            OrderComponent::Item(item) => item.total_price(),
            OrderComponent::Bundle(bundle) => bundle.total_price(),
        }
    }

    /// Renders a human-readable description of this component.
    pub fn description(&self) -> String {
        match self {
            OrderComponent::Item(item) => item.description(),
            OrderComponent::Bundle(bundle) => bundle.description(),
        }
    }
}

impl From<OrderItem> for OrderComponent {
    fn from(item: OrderItem) -> Self {
        OrderComponent::Item(item)
    }
}

impl From<OrderBundle> for OrderComponent {
    fn from(bundle: OrderBundle) -> Self {
        OrderComponent::Bundle(bundle)
    }
}

/// Sums the total prices of a component slice.
pub fn components_total(components: &[OrderComponent]) -> Money {
    components
        .iter()
        .fold(Money::zero(), |acc, component| acc + component.total_price())
}

/// Flattens a component slice into its leaf items, depth first.
///
/// Bundle discounts do not apply here; this is the physical item list
/// used for inventory reservation and release.
pub fn flatten_items(components: &[OrderComponent]) -> Vec<&OrderItem> {
    let mut items = Vec::new();
    for component in components {
        match component {
            OrderComponent::Item(item) => items.push(item),
            OrderComponent::Bundle(bundle) => items.extend(flatten_items(bundle.children())),
        }
    }
    items
}
