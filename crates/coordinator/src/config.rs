//! Coordinator configuration loaded from environment variables.

/// Coordinator configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `ORDER_DEFAULT_DESTINATION` — destination country used when an
///   international order is built without one (default: `"UNKNOWN"`)
/// - `ORDER_SEQUENCE_START` — first value of the order-id sequence
///   (default: `1000`)
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    pub default_destination: String,
    pub sequence_start: u64,
}

impl CoordinatorConfig {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            default_destination: std::env::var("ORDER_DEFAULT_DESTINATION")
                .unwrap_or_else(|_| "UNKNOWN".to_string()),
            sequence_start: std::env::var("ORDER_SEQUENCE_START")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1000),
        }
    }
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            default_destination: "UNKNOWN".to_string(),
            sequence_start: 1000,
        }
    }
}
