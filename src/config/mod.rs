// ==========================================
// Poultry Metrics - configuration layer
// ==========================================
// Storage: config_kv table
// ==========================================

pub mod config_manager;
pub mod feed_plan;

pub use config_manager::{config_keys, ConfigManager, MetricsConfig};
pub use feed_plan::{FeedPlan, FeedTier};
