// ==========================================
// Poultry Metrics - domain layer
// ==========================================
// Records, entry forms, KPI result types
// No data access, no aggregation logic
// ==========================================

pub mod batch;
pub mod entry;
pub mod logs;
pub mod metrics;
pub mod types;

pub use batch::Batch;
pub use entry::{
    BatchEntry, EntryError, EntryResult, ExpenseEntry, FeedEntry, MortalityEntry, SaleEntry,
    VaccinationEntry, WaterEntry, WeightEntry,
};
pub use logs::{
    BatchLogs, ExpenseLog, FeedLog, MortalityLog, SaleLog, VaccinationLog, WaterLog, WeightLog,
};
pub use metrics::{
    BatchFinanceStats, BatchKpis, CategoryShare, ChartSeries, ComparisonMetric, ComparisonMetrics,
    ComparisonSelection, DashboardStats, EstimateError, FeedRecommendation, FinanceReport,
    ProfitEstimate,
};
pub use types::{BatchStatus, ExpenseCategory, FinancePeriod, LogCategory};
