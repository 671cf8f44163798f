// ==========================================
// Poultry Metrics - batch detail KPI engine
// ==========================================
// Input: batch + all of its log rows + calendar
// Output: BatchKpis (age, week, flock, FCR, mortality, money,
//         feed recommendation, chart series)
// ==========================================

use crate::calc::dates::{Calendar, Clock};
use crate::calc::math::{calculate_fcr, calculate_mortality_rate, calculate_profit};
use crate::calc::units::kg_to_lb;
use crate::config::FeedPlan;
use crate::domain::{
    Batch, BatchKpis, BatchLogs, ChartSeries, EstimateError, FeedRecommendation, ProfitEstimate,
};
use crate::engine::totals::FlockTotals;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use tracing::instrument;

/// Entries shown in the detail charts
pub const CHART_POINTS: usize = 7;

/// Feed sack size (lb)
pub const SACK_LB: f64 = 100.0;

// ==========================================
// BatchKpiEngine
// ==========================================
pub struct BatchKpiEngine {
    feed_plan: FeedPlan,
}

impl Default for BatchKpiEngine {
    fn default() -> Self {
        Self::new(FeedPlan::default())
    }
}

impl BatchKpiEngine {
    pub fn new(feed_plan: FeedPlan) -> Self {
        Self { feed_plan }
    }

    /// Compute every detail KPI of one batch
    #[instrument(skip(self, calendar, batch, logs), fields(batch_id = %batch.id))]
    pub fn compute<Tz: TimeZone, C: Clock>(
        &self,
        calendar: &Calendar<Tz, C>,
        batch: &Batch,
        logs: &BatchLogs,
    ) -> BatchKpis {
        let totals = FlockTotals::from_logs(batch, logs);

        let days_active = match batch.end_date {
            Some(end) => calendar.days_between(batch.start_date, end),
            None => calendar.days_since(batch.start_date),
        };
        let current_week = calendar.current_week(batch.start_date);

        let avg_weight_kg = totals.latest_weight_kg;
        let total_live_weight_kg = avg_weight_kg * totals.birds_alive;

        let kpis = BatchKpis {
            batch_id: batch.id.clone(),
            batch_name: batch.name.clone(),
            days_active,
            current_week,
            initial_quantity: totals.initial_quantity,
            total_deaths: totals.deaths,
            birds_sold: totals.birds_sold,
            birds_alive: totals.birds_alive,
            mortality_rate: calculate_mortality_rate(totals.deaths, totals.initial_quantity),
            total_feed_kg: totals.feed_kg,
            total_feed_lb: kg_to_lb(totals.feed_kg),
            avg_weight_kg,
            avg_weight_lb: kg_to_lb(avg_weight_kg),
            total_live_weight_kg,
            fcr: calculate_fcr(totals.feed_kg, total_live_weight_kg),
            total_expenses: totals.expenses,
            total_sales: totals.revenue,
            profit: calculate_profit(totals.revenue, totals.expenses),
            feed_recommendation: self.feed_recommendation(current_week, totals.birds_alive),
            weight_chart: Self::weight_chart(logs),
            feed_chart: Self::feed_chart(logs),
        };

        tracing::debug!(
            days_active = kpis.days_active,
            week = kpis.current_week,
            birds_alive = kpis.birds_alive,
            fcr = kpis.fcr,
            "batch kpis computed"
        );
        kpis
    }

    /// Feed to buy this week; `None` without live birds
    pub fn feed_recommendation(&self, week: u32, birds_alive: f64) -> Option<FeedRecommendation> {
        if week == 0 || !birds_alive.is_finite() || birds_alive <= 0.0 {
            return None;
        }
        let tier = self.feed_plan.tier_for_week(week)?;
        let weekly_lb = tier.lb_per_bird * birds_alive;

        Some(FeedRecommendation {
            week: tier.week,
            feed_name: tier.name.clone(),
            days: tier.days.clone(),
            lb_per_bird: tier.lb_per_bird,
            birds_alive,
            weekly_lb,
            daily_lb: weekly_lb / 7.0,
            sacks_weekly: weekly_lb / SACK_LB,
        })
    }

    /// Last entries in chronological order, labelled D1..Dn
    ///
    /// `None` when there is nothing to plot.
    fn chart<R>(
        rows: &[R],
        key: impl Fn(&R) -> (NaiveDate, DateTime<Utc>),
        value: impl Fn(&R) -> f64,
    ) -> Option<ChartSeries> {
        let mut ordered: Vec<&R> = rows.iter().collect();
        ordered.sort_by_key(|r| key(*r));
        let start = ordered.len().saturating_sub(CHART_POINTS);
        let recent = &ordered[start..];

        let values: Vec<f64> = recent
            .iter()
            .map(|r| value(*r))
            .map(|v| if v.is_finite() { v } else { 0.0 })
            .collect();
        if values.iter().all(|v| *v == 0.0) {
            return None;
        }

        Some(ChartSeries {
            labels: (1..=values.len()).map(|i| format!("D{}", i)).collect(),
            values,
        })
    }

    /// Average weight (lb) per sample
    pub fn weight_chart(logs: &BatchLogs) -> Option<ChartSeries> {
        Self::chart(
            &logs.weight,
            |w| (w.date, w.created_at),
            |w| kg_to_lb(w.avg_weight_kg),
        )
    }

    /// Feed (lb) per delivery
    pub fn feed_chart(logs: &BatchLogs) -> Option<ChartSeries> {
        Self::chart(
            &logs.feed,
            |f| (f.date, f.created_at),
            |f| kg_to_lb(f.quantity_kg),
        )
    }

    /// Revenue if every live bird sold today at `price_per_lb`
    pub fn estimate_profit(
        &self,
        kpis: &BatchKpis,
        price_per_lb: f64,
    ) -> Result<ProfitEstimate, EstimateError> {
        if !price_per_lb.is_finite() || price_per_lb <= 0.0 {
            return Err(EstimateError::InvalidPrice);
        }
        if kpis.birds_alive <= 0.0 {
            return Err(EstimateError::NoBirdsAlive);
        }
        if kpis.avg_weight_lb <= 0.0 {
            return Err(EstimateError::NoWeightRecorded);
        }

        let revenue = kpis.birds_alive * kpis.avg_weight_lb * price_per_lb;
        Ok(ProfitEstimate {
            price_per_lb,
            birds: kpis.birds_alive,
            avg_weight_lb: kpis.avg_weight_lb,
            revenue,
            expenses: kpis.total_expenses,
            profit: calculate_profit(revenue, kpis.total_expenses),
        })
    }
}
