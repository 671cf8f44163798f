// ==========================================
// Poultry Metrics - core library
// ==========================================
// Derived KPIs for broiler production batches:
// FCR, mortality, birds alive, profit, margin, ROI,
// cost per bird / per lb, batch age and production week.
// ==========================================

// Localization tables (locales/*.yml)
rust_i18n::i18n!("locales", fallback = "es");

// ==========================================
// Module declarations
// ==========================================

// Calculation layer - pure conversions, dates, formatting, KPI formulas
pub mod calc;

// Domain layer - batches, log rows, entry forms, KPI results
pub mod domain;

// Engine layer - aggregation of rows into KPIs
pub mod engine;

// Repository layer - row-fetch collaborators
pub mod repository;

// Configuration layer
pub mod config;

// SQLite connection setup
pub mod db;

// Logging
pub mod logging;

// Localization
pub mod i18n;

// Timing / SQL statement counting
pub mod perf;

// API layer - async services used by screens
pub mod api;

// ==========================================
// Re-exports
// ==========================================

pub use calc::dates::{Calendar, Clock, DateInput, FixedClock, SystemClock};
pub use calc::format::{
    format_currency, format_number, format_percentage, format_usd, format_weight_kg,
    format_weight_lb,
};
pub use calc::math::{
    calculate_avg_weight_per_bird, calculate_birds_alive, calculate_cost_per_bird,
    calculate_cost_per_lb, calculate_fcr, calculate_margin, calculate_mortality_rate,
    calculate_percentage_change, calculate_profit, calculate_roi, clamp, safe_sum,
};
pub use calc::units::{kg_to_lb, lb_to_kg, KG_TO_LB, LB_TO_KG};

pub use domain::{
    Batch, BatchKpis, BatchLogs, BatchStatus, DashboardStats, ExpenseCategory, ExpenseLog,
    FeedLog, FinancePeriod, FinanceReport, MortalityLog, SaleLog, VaccinationLog, WaterLog,
    WeightLog,
};

pub use engine::{BatchKpiEngine, ComparisonEngine, DashboardEngine, FinanceEngine};

pub use api::{ApiError, MetricsApi, RefreshCoordinator};

pub use config::{ConfigManager, MetricsConfig};

pub use i18n::Locale;

// ==========================================
// Constants
// ==========================================

// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
