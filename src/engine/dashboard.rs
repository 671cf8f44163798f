// ==========================================
// Poultry Metrics - dashboard engine
// ==========================================
// Input: active batches with their logs
// Output: DashboardStats (batches, birds alive, feed lb, mortality %, profit)
// ==========================================

use crate::calc::math::{calculate_mortality_rate, calculate_profit};
use crate::calc::units::kg_to_lb;
use crate::domain::{Batch, BatchLogs, DashboardStats};
use crate::engine::totals::FlockTotals;
use tracing::instrument;

#[derive(Default)]
pub struct DashboardEngine {}

impl DashboardEngine {
    pub fn new() -> Self {
        Self {}
    }

    /// Aggregate the summary cards
    ///
    /// Mortality is pooled: Σ deaths / Σ birds placed.
    #[instrument(skip(self, batches), fields(count = batches.len()))]
    pub fn summarize(&self, batches: &[(Batch, BatchLogs)]) -> DashboardStats {
        let mut total_initial = 0.0;
        let mut total_deaths = 0.0;
        let mut total_birds = 0.0;
        let mut total_feed_kg = 0.0;
        let mut total_revenue = 0.0;
        let mut total_expenses = 0.0;

        for (batch, logs) in batches {
            let totals = FlockTotals::from_logs(batch, logs);
            if batch.initial_quantity.is_finite() && batch.initial_quantity > 0.0 {
                total_initial += batch.initial_quantity;
            }
            total_deaths += totals.deaths;
            total_birds += totals.birds_alive;
            total_feed_kg += totals.feed_kg;
            total_revenue += totals.revenue;
            total_expenses += totals.expenses;
        }

        let stats = DashboardStats {
            batches: batches.len(),
            birds: total_birds,
            feed_lb: kg_to_lb(total_feed_kg),
            mortality: calculate_mortality_rate(total_deaths, total_initial),
            profit: calculate_profit(total_revenue, total_expenses),
        };
        tracing::debug!(?stats, "dashboard summarized");
        stats
    }
}
