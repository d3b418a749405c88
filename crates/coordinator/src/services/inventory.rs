//! Inventory ledger trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use domain::{OrderItem, ProductId};

/// A product quantity to check, reserve, or release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockLine {
    /// The product concerned.
    pub product_id: ProductId,
    /// Number of units.
    pub quantity: u32,
}

impl StockLine {
    /// Creates a stock line.
    pub fn new(product_id: impl Into<ProductId>, quantity: u32) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
        }
    }
}

impl From<&OrderItem> for StockLine {
    fn from(item: &OrderItem) -> Self {
        Self {
            product_id: item.product_id().clone(),
            quantity: item.quantity(),
        }
    }
}

/// Contract for inventory operations consumed by the coordinator.
#[async_trait]
pub trait InventoryLedger: Send + Sync {
    /// Returns true if every line can be satisfied from current stock.
    async fn check_available(&self, lines: &[StockLine]) -> bool;

    /// Reserves stock for every line, or none at all.
    ///
    /// Returns false without any partial reservation when any line is
    /// short.
    async fn reserve(&self, lines: &[StockLine]) -> bool;

    /// Returns previously reserved stock to the ledger.
    async fn release(&self, lines: &[StockLine]);

    /// Returns the available quantity for a product (0 for unknown).
    async fn available_quantity(&self, product_id: &ProductId) -> u32;
}

#[derive(Debug, Default)]
struct InMemoryInventoryState {
    stock: HashMap<ProductId, u32>,
}

impl InMemoryInventoryState {
    fn all_available(&self, lines: &[StockLine]) -> bool {
        lines.iter().all(|line| {
            let available = self.stock.get(&line.product_id).copied().unwrap_or(0);
            if available < line.quantity {
                tracing::warn!(
                    product_id = %line.product_id,
                    needed = line.quantity,
                    available,
                    "insufficient stock"
                );
                return false;
            }
            true
        })
    }
}

/// In-memory inventory ledger for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryInventoryLedger {
    state: Arc<RwLock<InMemoryInventoryState>>,
}

impl InMemoryInventoryLedger {
    /// Creates an empty in-memory inventory ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds stock for a product, builder style.
    pub fn with_stock(self, product_id: impl Into<ProductId>, quantity: u32) -> Self {
        self.set_stock(product_id, quantity);
        self
    }

    /// Sets the stock level for a product.
    pub fn set_stock(&self, product_id: impl Into<ProductId>, quantity: u32) {
        self.state
            .write()
            .unwrap()
            .stock
            .insert(product_id.into(), quantity);
    }
}

#[async_trait]
impl InventoryLedger for InMemoryInventoryLedger {
    async fn check_available(&self, lines: &[StockLine]) -> bool {
        self.state.read().unwrap().all_available(lines)
    }

    async fn reserve(&self, lines: &[StockLine]) -> bool {
        let mut state = self.state.write().unwrap();

        // All-or-nothing: verify every line before touching any count.
        if !state.all_available(lines) {
            return false;
        }

        for line in lines {
            if let Some(available) = state.stock.get_mut(&line.product_id) {
                *available -= line.quantity;
            }
        }
        true
    }

    async fn release(&self, lines: &[StockLine]) {
        let mut state = self.state.write().unwrap();
        for line in lines {
            *state.stock.entry(line.product_id.clone()).or_insert(0) += line.quantity;
        }
    }

    async fn available_quantity(&self, product_id: &ProductId) -> u32 {
        self.state
            .read()
            .unwrap()
            .stock
            .get(product_id)
            .copied()
            .unwrap_or(0)
    }
}
