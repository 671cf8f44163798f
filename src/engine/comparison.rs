// ==========================================
// Poultry Metrics - batch comparison engine
// ==========================================
// Input: batches with their logs (a failed fetch arrives as None)
// Output: ComparisonMetrics per batch, best value per metric,
//         best-FCR / best-profit insights
// ==========================================

use crate::calc::dates::{Calendar, Clock};
use crate::calc::math::{calculate_fcr, calculate_mortality_rate, calculate_profit};
use crate::calc::units::kg_to_lb;
use crate::domain::{Batch, BatchLogs, ComparisonMetric, ComparisonMetrics};
use crate::engine::totals::FlockTotals;
use chrono::TimeZone;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::instrument;

/// Winner of one headline metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricLeader {
    pub batch_id: String,
    pub batch_name: String,
    pub value: f64,
}

/// Headline insights over the selection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComparisonInsights {
    pub best_fcr: Option<MetricLeader>,
    pub best_profit: Option<MetricLeader>,
}

#[derive(Default)]
pub struct ComparisonEngine {}

impl ComparisonEngine {
    pub fn new() -> Self {
        Self {}
    }

    /// Metrics of one batch; `None` logs (failed fetch) yield zeros
    pub fn metrics_for<Tz: TimeZone, C: Clock>(
        &self,
        calendar: &Calendar<Tz, C>,
        batch: &Batch,
        logs: Option<&BatchLogs>,
    ) -> ComparisonMetrics {
        let Some(logs) = logs else {
            return ComparisonMetrics {
                batch_id: batch.id.clone(),
                batch_name: batch.name.clone(),
                ..Default::default()
            };
        };

        let totals = FlockTotals::from_logs(batch, logs);
        let total_weight_kg = totals.latest_weight_kg * totals.birds_alive;
        let days_active = match batch.end_date {
            Some(end) => calendar.days_between(batch.start_date, end),
            None => calendar.days_since(batch.start_date),
        };

        ComparisonMetrics {
            batch_id: batch.id.clone(),
            batch_name: batch.name.clone(),
            total_feed_lb: kg_to_lb(totals.feed_kg),
            avg_weight_lb: kg_to_lb(totals.latest_weight_kg),
            fcr: calculate_fcr(totals.feed_kg, total_weight_kg),
            mortality_rate: calculate_mortality_rate(totals.deaths, totals.initial_quantity),
            birds_alive: totals.birds_alive,
            total_expenses: totals.expenses,
            total_revenue: totals.revenue,
            profit: calculate_profit(totals.revenue, totals.expenses),
            days_active,
        }
    }

    /// Metrics keyed by batch id
    #[instrument(skip(self, calendar, batches), fields(count = batches.len()))]
    pub fn compare<Tz: TimeZone, C: Clock>(
        &self,
        calendar: &Calendar<Tz, C>,
        batches: &[(Batch, Option<BatchLogs>)],
    ) -> HashMap<String, ComparisonMetrics> {
        let map: HashMap<String, ComparisonMetrics> = batches
            .iter()
            .map(|(batch, logs)| {
                (
                    batch.id.clone(),
                    self.metrics_for(calendar, batch, logs.as_ref()),
                )
            })
            .collect();
        tracing::debug!(batches = map.len(), "comparison computed");
        map
    }

    /// Best value of `metric` over the selected ids
    ///
    /// Max or min by the metric's direction; an id without metrics counts
    /// as 0. `None` for an empty selection.
    pub fn best_value(
        &self,
        data: &HashMap<String, ComparisonMetrics>,
        selected: &[String],
        metric: ComparisonMetric,
    ) -> Option<f64> {
        let values = selected
            .iter()
            .map(|id| data.get(id).map(|m| metric.value(m)).unwrap_or(0.0));
        if metric.higher_is_better() {
            values.reduce(f64::max)
        } else {
            values.reduce(f64::min)
        }
    }

    /// Highlight only when more than one batch is selected
    pub fn is_best(
        &self,
        data: &HashMap<String, ComparisonMetrics>,
        selected: &[String],
        metric: ComparisonMetric,
        batch_id: &str,
    ) -> bool {
        if selected.len() < 2 {
            return false;
        }
        let value = data.get(batch_id).map(|m| metric.value(m)).unwrap_or(0.0);
        self.best_value(data, selected, metric) == Some(value)
    }

    /// Lowest non-zero FCR and highest profit in the selection
    ///
    /// A zero FCR means "no data" and never wins. Ties keep the first
    /// selected batch.
    pub fn insights(
        &self,
        data: &HashMap<String, ComparisonMetrics>,
        selected: &[String],
    ) -> ComparisonInsights {
        let leader = |m: &ComparisonMetrics, value: f64| MetricLeader {
            batch_id: m.batch_id.clone(),
            batch_name: m.batch_name.clone(),
            value,
        };
        let rows: Vec<&ComparisonMetrics> =
            selected.iter().filter_map(|id| data.get(id)).collect();

        let best_fcr = rows
            .iter()
            .filter(|m| m.fcr > 0.0)
            .fold(None::<&&ComparisonMetrics>, |best, m| match best {
                Some(b) if b.fcr <= m.fcr => Some(b),
                _ => Some(m),
            })
            .map(|m| leader(m, m.fcr));

        let best_profit = rows
            .iter()
            .fold(None::<&&ComparisonMetrics>, |best, m| match best {
                Some(b) if b.profit >= m.profit => Some(b),
                _ => Some(m),
            })
            .map(|m| leader(m, m.profit));

        ComparisonInsights {
            best_fcr,
            best_profit,
        }
    }
}
