// ==========================================
// Flock totals - shared row reduction
// ==========================================
// Input: one batch + its log rows
// Output: plain sums every engine starts from
// ==========================================

use crate::calc::math::{calculate_birds_alive, safe_sum, safe_sum_by};
use crate::domain::{Batch, BatchLogs, ExpenseCategory};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlockTotals {
    pub initial_quantity: f64,
    pub deaths: f64,
    pub birds_sold: f64,
    pub birds_alive: f64,
    pub feed_kg: f64,
    pub feed_log_cost: f64,
    pub expenses: f64, // expense rows only
    pub revenue: f64,
    pub sale_weight_kg: f64,
    pub latest_weight_kg: f64,
}

impl FlockTotals {
    pub fn from_logs(batch: &Batch, logs: &BatchLogs) -> Self {
        let deaths = safe_sum_by(&logs.mortality, |m| m.count);
        let birds_sold = safe_sum(logs.sale.iter().map(|s| s.birds()));
        let latest_weight_kg = logs
            .latest_weight()
            .map(|w| w.avg_weight_kg)
            .filter(|w| w.is_finite())
            .unwrap_or(0.0);

        Self {
            initial_quantity: batch.initial_quantity,
            deaths,
            birds_sold,
            birds_alive: calculate_birds_alive(batch.initial_quantity, deaths, birds_sold),
            feed_kg: safe_sum_by(&logs.feed, |f| f.quantity_kg),
            feed_log_cost: safe_sum_by(&logs.feed, |f| f.cost),
            expenses: safe_sum_by(&logs.expense, |e| e.amount),
            revenue: safe_sum(logs.sale.iter().map(|s| s.revenue())),
            sale_weight_kg: safe_sum_by(&logs.sale, |s| s.total_weight_kg),
            latest_weight_kg,
        }
    }

    /// Σ expense rows of one category
    pub fn expenses_in(logs: &BatchLogs, category: ExpenseCategory) -> f64 {
        safe_sum(
            logs.expense
                .iter()
                .filter(|e| e.category == category)
                .map(|e| e.amount),
        )
    }
}
