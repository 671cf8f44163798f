// ==========================================
// Poultry Metrics - KPI result types
// ==========================================
// Produced by the engines, rendered by screens / reports.
// All numbers are finite; "no data" reads as 0 (see calc::math).
// ==========================================

use crate::domain::types::{ExpenseCategory, FinancePeriod};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

// ==========================================
// Batch detail
// ==========================================

/// Feed to buy for the current production week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedRecommendation {
    pub week: u32,
    pub feed_name: String,
    pub days: String,         // "0-7", "8-14", ...
    pub lb_per_bird: f64,     // per week
    pub birds_alive: f64,
    pub weekly_lb: f64,
    pub daily_lb: f64,
    pub sacks_weekly: f64,    // 100 lb sacks
}

/// Small line chart: labels D1..Dn, chronological
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchKpis {
    pub batch_id: String,
    pub batch_name: String,
    pub days_active: i64,
    pub current_week: u32,

    // ===== flock =====
    pub initial_quantity: f64,
    pub total_deaths: f64,
    pub birds_sold: f64,
    pub birds_alive: f64,
    pub mortality_rate: f64,

    // ===== feed & weight =====
    pub total_feed_kg: f64,
    pub total_feed_lb: f64,
    pub avg_weight_kg: f64,
    pub avg_weight_lb: f64,
    pub total_live_weight_kg: f64,
    pub fcr: f64,

    // ===== money =====
    pub total_expenses: f64,
    pub total_sales: f64,
    pub profit: f64,

    pub feed_recommendation: Option<FeedRecommendation>,
    pub weight_chart: Option<ChartSeries>,
    pub feed_chart: Option<ChartSeries>,
}

/// Estimated-profit calculator rejection
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EstimateError {
    #[error("Ingresa un precio válido por libra")]
    InvalidPrice,

    #[error("No hay aves vivas registradas")]
    NoBirdsAlive,

    #[error("Registra el peso promedio de las aves primero")]
    NoWeightRecorded,
}

/// "What if I sold everything today at this price"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfitEstimate {
    pub price_per_lb: f64,
    pub birds: f64,
    pub avg_weight_lb: f64,
    pub revenue: f64,
    pub expenses: f64,
    pub profit: f64,
}

// ==========================================
// Dashboard
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub batches: usize,  // active batches
    pub birds: f64,      // birds alive
    pub feed_lb: f64,    // feed delivered
    pub mortality: f64,  // % of birds placed
    pub profit: f64,     // revenue - expenses
}

// ==========================================
// Comparison
// ==========================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComparisonMetrics {
    pub batch_id: String,
    pub batch_name: String,
    pub total_feed_lb: f64,
    pub avg_weight_lb: f64,
    pub fcr: f64,
    pub mortality_rate: f64,
    pub birds_alive: f64,
    pub total_expenses: f64,
    pub total_revenue: f64,
    pub profit: f64,
    pub days_active: i64,
}

/// Metric rows of the comparison table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonMetric {
    Fcr,
    AvgWeightLb,
    MortalityRate,
    TotalFeedLb,
    Profit,
    DaysActive,
}

impl ComparisonMetric {
    pub const ALL: [ComparisonMetric; 6] = [
        ComparisonMetric::Fcr,
        ComparisonMetric::AvgWeightLb,
        ComparisonMetric::MortalityRate,
        ComparisonMetric::TotalFeedLb,
        ComparisonMetric::Profit,
        ComparisonMetric::DaysActive,
    ];

    pub fn higher_is_better(&self) -> bool {
        matches!(self, ComparisonMetric::AvgWeightLb | ComparisonMetric::Profit)
    }

    pub fn value(&self, m: &ComparisonMetrics) -> f64 {
        match self {
            ComparisonMetric::Fcr => m.fcr,
            ComparisonMetric::AvgWeightLb => m.avg_weight_lb,
            ComparisonMetric::MortalityRate => m.mortality_rate,
            ComparisonMetric::TotalFeedLb => m.total_feed_lb,
            ComparisonMetric::Profit => m.profit,
            ComparisonMetric::DaysActive => m.days_active as f64,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            ComparisonMetric::Fcr => "fcr",
            ComparisonMetric::AvgWeightLb => "avg_weight_lb",
            ComparisonMetric::MortalityRate => "mortality_rate",
            ComparisonMetric::TotalFeedLb => "total_feed_lb",
            ComparisonMetric::Profit => "profit",
            ComparisonMetric::DaysActive => "days_active",
        }
    }

    pub fn label_key(&self) -> String {
        format!("metric.{}", self.key())
    }
}

/// Batch ids picked for side-by-side comparison, in pick order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonSelection {
    ids: Vec<String>,
    max_selected: usize,
}

impl ComparisonSelection {
    pub fn new(max_selected: usize) -> Self {
        Self {
            ids: Vec::new(),
            max_selected,
        }
    }

    /// Select / deselect `batch_id`
    ///
    /// Returns `false` when the id could not be added because the
    /// selection is full.
    pub fn toggle(&mut self, batch_id: &str) -> bool {
        if let Some(pos) = self.ids.iter().position(|id| id == batch_id) {
            self.ids.remove(pos);
            return true;
        }
        if self.ids.len() >= self.max_selected {
            return false;
        }
        self.ids.push(batch_id.to_string());
        true
    }

    pub fn contains(&self, batch_id: &str) -> bool {
        self.ids.iter().any(|id| id == batch_id)
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn max_selected(&self) -> usize {
        self.max_selected
    }
}

// ==========================================
// Finance
// ==========================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchFinanceStats {
    pub batch_id: String,
    pub batch_name: String,
    pub revenue: f64,
    pub expenses: f64,
    pub chick_cost: f64,
    pub feed_cost: f64,
    pub other_cost: f64,
    pub profit: f64,
    pub margin: f64,
    pub roi: f64,
    pub cost_per_bird: f64,
    pub cost_per_lb: f64,
    pub birds_produced: f64,
    pub birds_sold: f64,
    pub weight_lb: f64,
}

/// Category share of total expenses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryShare {
    pub category: ExpenseCategory,
    pub amount: f64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinanceReport {
    pub period: FinancePeriod,
    pub total_revenue: f64,
    pub total_expenses: f64,
    pub profit: f64,
    pub margin: f64,
    pub roi: f64,
    pub batch_stats: Vec<BatchFinanceStats>, // profit, descending
    pub expenses_by_category: BTreeMap<ExpenseCategory, f64>,
}

impl FinanceReport {
    /// Non-zero categories with their share of the category total
    pub fn expense_breakdown(&self) -> Vec<CategoryShare> {
        let total: f64 = self.expenses_by_category.values().sum();
        if total <= 0.0 || !total.is_finite() {
            return Vec::new();
        }
        ExpenseCategory::ALL
            .iter()
            .filter_map(|category| {
                let amount = self.expenses_by_category.get(category).copied()?;
                (amount > 0.0).then(|| CategoryShare {
                    category: *category,
                    amount,
                    percentage: amount / total * 100.0,
                })
            })
            .collect()
    }
}
