//! Shared types for the order lifecycle system.

pub mod types;

pub use types::OrderId;
