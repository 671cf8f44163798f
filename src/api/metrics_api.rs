// ==========================================
// Poultry Metrics - metrics API
// ==========================================
// Role: fetch rows through BatchLogSource, run the engines
// Reads: per-screen reads are issued concurrently
// Partial failure: a failing category read is logged and replaced by
//                  an empty collection; sibling reads are unaffected
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::calc::dates::{Calendar, Clock, SystemClock};
use crate::config::MetricsConfig;
use crate::domain::{
    Batch, BatchKpis, BatchLogs, ComparisonMetric, ComparisonMetrics, ComparisonSelection,
    DashboardStats, FinancePeriod, FinanceReport, LogCategory,
};
use crate::engine::{
    BatchKpiEngine, ComparisonEngine, ComparisonInsights, DashboardEngine, FinanceEngine,
};
use crate::perf::PerfGuard;
use crate::repository::{BatchLogSource, RepositoryResult};
use chrono::{Local, TimeZone};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::instrument;

// ==========================================
// BatchComparison - comparison screen data
// ==========================================

/// Metrics of the most recent batches, in list order (newest first)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchComparison {
    pub batches: Vec<Batch>,
    pub metrics: HashMap<String, ComparisonMetrics>,
}

impl BatchComparison {
    pub fn get(&self, batch_id: &str) -> Option<&ComparisonMetrics> {
        self.metrics.get(batch_id)
    }

    /// Rows in list order
    pub fn rows(&self) -> Vec<&ComparisonMetrics> {
        self.batches
            .iter()
            .filter_map(|b| self.metrics.get(&b.id))
            .collect()
    }

    pub fn best_value(
        &self,
        selection: &ComparisonSelection,
        metric: ComparisonMetric,
    ) -> Option<f64> {
        ComparisonEngine::new().best_value(&self.metrics, selection.ids(), metric)
    }

    pub fn is_best(
        &self,
        selection: &ComparisonSelection,
        metric: ComparisonMetric,
        batch_id: &str,
    ) -> bool {
        ComparisonEngine::new().is_best(&self.metrics, selection.ids(), metric, batch_id)
    }

    pub fn insights(&self, selection: &ComparisonSelection) -> ComparisonInsights {
        ComparisonEngine::new().insights(&self.metrics, selection.ids())
    }
}

// ==========================================
// MetricsApi
// ==========================================
pub struct MetricsApi<Tz: TimeZone = Local, C: Clock = SystemClock> {
    source: Arc<dyn BatchLogSource>,
    config: MetricsConfig,
    calendar: Calendar<Tz, C>,
    kpi_engine: BatchKpiEngine,
    dashboard_engine: DashboardEngine,
    comparison_engine: ComparisonEngine,
    finance_engine: FinanceEngine,
}

impl MetricsApi<Local, SystemClock> {
    /// Host timezone, wall clock
    pub fn new(source: Arc<dyn BatchLogSource>, config: MetricsConfig) -> Self {
        Self::with_calendar(source, config, Calendar::local())
    }
}

impl<Tz: TimeZone, C: Clock> MetricsApi<Tz, C> {
    pub fn with_calendar(
        source: Arc<dyn BatchLogSource>,
        config: MetricsConfig,
        calendar: Calendar<Tz, C>,
    ) -> Self {
        let kpi_engine = BatchKpiEngine::new(config.feed_plan.clone());
        Self {
            source,
            config,
            calendar,
            kpi_engine,
            dashboard_engine: DashboardEngine::new(),
            comparison_engine: ComparisonEngine::new(),
            finance_engine: FinanceEngine::new(),
        }
    }

    pub fn config(&self) -> &MetricsConfig {
        &self.config
    }

    pub fn calendar(&self) -> &Calendar<Tz, C> {
        &self.calendar
    }

    /// Empty selection capped at `comparison_max_selected`
    pub fn new_selection(&self) -> ComparisonSelection {
        ComparisonSelection::new(self.config.comparison_max_selected)
    }

    // ==========================================
    // Screens
    // ==========================================

    /// Summary cards over the organization's active batches
    #[instrument(skip(self))]
    pub async fn dashboard_summary(&self, org_id: &str) -> ApiResult<DashboardStats> {
        let _perf = PerfGuard::new("dashboard_summary");
        let org_id = require_id("org_id", org_id)?;

        let batches = self.source.list_active_batches(org_id).await?;
        let rows = self.read_batches(batches).await;
        Ok(self.dashboard_engine.summarize(&rows))
    }

    /// Detail KPIs of one batch
    #[instrument(skip(self))]
    pub async fn batch_detail(&self, batch_id: &str) -> ApiResult<BatchKpis> {
        let _perf = PerfGuard::new("batch_detail");
        let batch_id = require_id("batch_id", batch_id)?;

        let batch = self
            .source
            .get_batch(batch_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("batch (id={})", batch_id)))?;
        let logs = self.read_logs(batch_id).await;
        Ok(self.kpi_engine.compute(&self.calendar, &batch, &logs))
    }

    /// Comparison metrics of the most recent batches
    ///
    /// A batch whose reads fail contributes all-zero metrics.
    #[instrument(skip(self))]
    pub async fn compare_batches(&self, org_id: &str) -> ApiResult<BatchComparison> {
        let _perf = PerfGuard::new("compare_batches");
        let org_id = require_id("org_id", org_id)?;

        let mut batches = self.source.list_batches(org_id).await?;
        batches.truncate(self.config.comparison_batch_limit);

        let loads = batches.iter().map(|batch| async move {
            match self.source.load_all_logs(&batch.id).await {
                Ok(logs) => Some(logs),
                Err(e) => {
                    tracing::warn!(batch_id = %batch.id, error = %e, "comparison read failed, using zeros");
                    None
                }
            }
        });
        let logs = join_all(loads).await;

        let rows: Vec<(Batch, Option<BatchLogs>)> = batches.iter().cloned().zip(logs).collect();
        let metrics = self.comparison_engine.compare(&self.calendar, &rows);
        Ok(BatchComparison { batches, metrics })
    }

    /// Finance report of every batch of the organization
    #[instrument(skip(self, period), fields(period = period.as_str()))]
    pub async fn finance_report(
        &self,
        org_id: &str,
        period: FinancePeriod,
    ) -> ApiResult<FinanceReport> {
        let _perf = PerfGuard::new("finance_report");
        let org_id = require_id("org_id", org_id)?;

        let batches = self.source.list_batches(org_id).await?;
        let rows = self.read_batches(batches).await;
        Ok(self.finance_engine.report(&self.calendar, period, &rows))
    }

    /// Raw log rows of one batch
    #[instrument(skip(self))]
    pub async fn batch_logs(&self, batch_id: &str) -> ApiResult<BatchLogs> {
        let _perf = PerfGuard::new("batch_logs");
        let batch_id = require_id("batch_id", batch_id)?;
        Ok(self.read_logs(batch_id).await)
    }

    // ==========================================
    // Tolerant reads
    // ==========================================

    async fn read_batches(&self, batches: Vec<Batch>) -> Vec<(Batch, BatchLogs)> {
        let logs = join_all(batches.iter().map(|b| self.read_logs(&b.id))).await;
        batches.into_iter().zip(logs).collect()
    }

    /// All seven categories, concurrently; a failing category reads as empty
    async fn read_logs(&self, batch_id: &str) -> BatchLogs {
        let source = &self.source;
        let (feed, weight, mortality, water, vaccination, expense, sale) = futures::join!(
            source.feed_logs(batch_id),
            source.weight_logs(batch_id),
            source.mortality_logs(batch_id),
            source.water_logs(batch_id),
            source.vaccination_logs(batch_id),
            source.expense_logs(batch_id),
            source.sale_logs(batch_id),
        );

        BatchLogs {
            feed: or_empty(batch_id, LogCategory::Feed, feed),
            weight: or_empty(batch_id, LogCategory::Weight, weight),
            mortality: or_empty(batch_id, LogCategory::Mortality, mortality),
            water: or_empty(batch_id, LogCategory::Water, water),
            vaccination: or_empty(batch_id, LogCategory::Vaccination, vaccination),
            expense: or_empty(batch_id, LogCategory::Expense, expense),
            sale: or_empty(batch_id, LogCategory::Sale, sale),
        }
    }
}

fn or_empty<T>(batch_id: &str, category: LogCategory, result: RepositoryResult<Vec<T>>) -> Vec<T> {
    match result {
        Ok(rows) => rows,
        Err(e) => {
            tracing::warn!(batch_id, %category, error = %e, "log read failed, using empty set");
            Vec::new()
        }
    }
}

fn require_id<'a>(field: &str, value: &'a str) -> ApiResult<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ApiError::InvalidInput(format!("{} is empty", field)));
    }
    Ok(value)
}
