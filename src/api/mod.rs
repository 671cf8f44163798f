// ==========================================
// Poultry Metrics - API layer
// ==========================================
// Async services behind the dashboard, batch detail,
// comparison and finance screens
// ==========================================

pub mod error;
pub mod metrics_api;
pub mod refresh;

pub use error::{ApiError, ApiResult};
pub use metrics_api::{BatchComparison, MetricsApi};
pub use refresh::{RefreshCoordinator, RefreshTicket};
