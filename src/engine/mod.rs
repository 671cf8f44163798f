// ==========================================
// Poultry Metrics - engine layer
// ==========================================
// Role: reduce in-memory rows into KPI structs via calc
// Rule: engines never touch SQL and never log above debug
// ==========================================

pub mod batch_kpi;
pub mod comparison;
pub mod dashboard;
pub mod finance;
pub mod totals;

pub use batch_kpi::BatchKpiEngine;
pub use comparison::{ComparisonEngine, ComparisonInsights, MetricLeader};
pub use dashboard::DashboardEngine;
pub use finance::FinanceEngine;
pub use totals::FlockTotals;
