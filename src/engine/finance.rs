// ==========================================
// Poultry Metrics - finance report engine
// ==========================================
// Input: period + batches with their logs + calendar
// Output: FinanceReport (totals, per-batch economics, expenses by category)
// Filter: expense / sale / feed rows by created_at >= period cutoff;
//         mortality rows are never filtered
// ==========================================

use crate::calc::dates::{Calendar, Clock};
use crate::calc::math::{
    calculate_cost_per_bird, calculate_cost_per_lb, calculate_margin, calculate_profit,
    calculate_roi, safe_sum_by,
};
use crate::calc::units::kg_to_lb;
use crate::domain::{
    Batch, BatchFinanceStats, BatchLogs, ExpenseCategory, FinancePeriod, FinanceReport,
};
use crate::engine::totals::FlockTotals;
use chrono::{DateTime, Datelike, Months, TimeZone, Utc};
use std::collections::BTreeMap;
use tracing::instrument;

#[derive(Default)]
pub struct FinanceEngine {}

impl FinanceEngine {
    pub fn new() -> Self {
        Self {}
    }

    /// Start of `period` at local midnight; `None` for `All`
    pub fn cutoff<Tz: TimeZone, C: Clock>(
        &self,
        calendar: &Calendar<Tz, C>,
        period: FinancePeriod,
    ) -> Option<DateTime<Tz>> {
        let today = calendar.today();
        let first_of_month = today.with_day(1)?;
        let start = match period {
            FinancePeriod::Month => first_of_month,
            FinancePeriod::ThreeMonths => first_of_month.checked_sub_months(Months::new(2))?,
            FinancePeriod::Year => first_of_month.with_month(1)?,
            FinancePeriod::All => return None,
        };
        calendar.midnight(start)
    }

    /// Keep only the rows the period covers
    pub fn filter_logs(logs: &BatchLogs, cutoff: Option<DateTime<Utc>>) -> BatchLogs {
        let Some(cutoff) = cutoff else {
            return logs.clone();
        };
        BatchLogs {
            feed: logs
                .feed
                .iter()
                .filter(|r| r.created_at >= cutoff)
                .cloned()
                .collect(),
            expense: logs
                .expense
                .iter()
                .filter(|r| r.created_at >= cutoff)
                .cloned()
                .collect(),
            sale: logs
                .sale
                .iter()
                .filter(|r| r.created_at >= cutoff)
                .cloned()
                .collect(),
            ..logs.clone()
        }
    }

    /// Economics of one batch over already-filtered rows
    pub fn batch_stats(&self, batch: &Batch, logs: &BatchLogs) -> BatchFinanceStats {
        let totals = FlockTotals::from_logs(batch, logs);

        let chick_cost = FlockTotals::expenses_in(logs, ExpenseCategory::Chicks);
        let feed_cost =
            totals.feed_log_cost + FlockTotals::expenses_in(logs, ExpenseCategory::Feed);
        let expenses = totals.expenses + totals.feed_log_cost;
        let other_cost = expenses - chick_cost - feed_cost;

        let revenue = totals.revenue;
        let profit = calculate_profit(revenue, expenses);
        let birds_produced = (totals.initial_quantity - totals.deaths).max(0.0);
        let weight_lb = kg_to_lb(totals.sale_weight_kg);

        BatchFinanceStats {
            batch_id: batch.id.clone(),
            batch_name: batch.name.clone(),
            revenue,
            expenses,
            chick_cost,
            feed_cost,
            other_cost,
            profit,
            margin: calculate_margin(profit, revenue),
            roi: calculate_roi(profit, expenses),
            cost_per_bird: calculate_cost_per_bird(expenses, birds_produced),
            cost_per_lb: calculate_cost_per_lb(expenses, weight_lb),
            birds_produced,
            birds_sold: totals.birds_sold,
            weight_lb,
        }
    }

    /// Build the finance report of `period`
    #[instrument(skip(self, calendar, batches), fields(period = period.as_str(), count = batches.len()))]
    pub fn report<Tz: TimeZone, C: Clock>(
        &self,
        calendar: &Calendar<Tz, C>,
        period: FinancePeriod,
        batches: &[(Batch, BatchLogs)],
    ) -> FinanceReport {
        let cutoff = self.cutoff(calendar, period).map(|c| c.with_timezone(&Utc));

        let mut expenses_by_category: BTreeMap<ExpenseCategory, f64> =
            ExpenseCategory::ALL.iter().map(|c| (*c, 0.0)).collect();
        let mut batch_stats = Vec::new();

        for (batch, logs) in batches {
            let logs = Self::filter_logs(logs, cutoff);

            for expense in &logs.expense {
                if expense.amount.is_finite() {
                    *expenses_by_category.entry(expense.category).or_insert(0.0) +=
                        expense.amount;
                }
            }
            let feed_log_cost = safe_sum_by(&logs.feed, |f| f.cost);
            if feed_log_cost > 0.0 {
                *expenses_by_category
                    .entry(ExpenseCategory::Feed)
                    .or_insert(0.0) += feed_log_cost;
            }

            let stats = self.batch_stats(batch, &logs);
            if stats.revenue > 0.0 || stats.expenses > 0.0 {
                batch_stats.push(stats);
            }
        }

        batch_stats.sort_by(|a, b| b.profit.total_cmp(&a.profit));

        let total_revenue: f64 = batch_stats.iter().map(|s| s.revenue).sum();
        let total_expenses: f64 = batch_stats.iter().map(|s| s.expenses).sum();
        let profit = calculate_profit(total_revenue, total_expenses);

        tracing::debug!(
            batches = batch_stats.len(),
            total_revenue,
            total_expenses,
            "finance report built"
        );

        FinanceReport {
            period,
            total_revenue,
            total_expenses,
            profit,
            margin: calculate_margin(profit, total_revenue),
            roi: calculate_roi(profit, total_expenses),
            batch_stats,
            expenses_by_category,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calc::dates::FixedClock;
    use crate::domain::{BatchStatus, ExpenseLog, FeedLog, MortalityLog, SaleLog};
    use chrono::{FixedOffset, NaiveDate};

    fn calendar() -> Calendar<FixedOffset, FixedClock> {
        // 2025-05-15 08:00 at UTC-6
        let now = Utc.with_ymd_and_hms(2025, 5, 15, 14, 0, 0).unwrap();
        Calendar::new(FixedOffset::west_opt(6 * 3600).unwrap(), FixedClock(now))
    }

    fn at(month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, month, day, 12, 0, 0).unwrap()
    }

    fn batch(id: &str) -> Batch {
        Batch {
            id: id.to_string(),
            org_id: "org".to_string(),
            name: id.to_string(),
            initial_quantity: 100.0,
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            end_date: None,
            status: BatchStatus::Active,
            created_at: at(1, 1),
        }
    }

    fn expense(category: ExpenseCategory, amount: f64, created_at: DateTime<Utc>) -> ExpenseLog {
        ExpenseLog {
            id: format!("e-{}", amount),
            batch_id: "a".to_string(),
            date: None,
            category,
            amount,
            description: None,
            notes: None,
            created_at,
        }
    }

    fn sale(revenue: f64, weight_kg: f64, created_at: DateTime<Utc>) -> SaleLog {
        SaleLog {
            id: format!("s-{}", revenue),
            batch_id: "a".to_string(),
            date: created_at.date_naive(),
            quantity_birds: Some(50.0),
            quantity: None,
            total_weight_kg: Some(weight_kg),
            price_per_kg: None,
            total_revenue: Some(revenue),
            total_amount: None,
            buyer: None,
            notes: None,
            created_at,
        }
    }

    fn feed_with_cost(cost: f64, created_at: DateTime<Utc>) -> FeedLog {
        FeedLog {
            id: format!("f-{}", cost),
            batch_id: "a".to_string(),
            date: created_at.date_naive(),
            feed_type: "Engordina".to_string(),
            quantity_kg: 50.0,
            cost: Some(cost),
            notes: None,
            created_at,
        }
    }

    #[test]
    fn test_cutoffs() {
        let engine = FinanceEngine::new();
        let cal = calendar();
        let local = |m: u32, d: u32| cal.midnight(NaiveDate::from_ymd_opt(2025, m, d).unwrap());

        assert_eq!(engine.cutoff(&cal, FinancePeriod::Month), local(5, 1));
        assert_eq!(engine.cutoff(&cal, FinancePeriod::ThreeMonths), local(3, 1));
        assert_eq!(engine.cutoff(&cal, FinancePeriod::Year), local(1, 1));
        assert_eq!(engine.cutoff(&cal, FinancePeriod::All), None);
    }

    #[test]
    fn test_batch_stats_cost_split() {
        let logs = BatchLogs {
            feed: vec![feed_with_cost(100.0, at(5, 2))],
            expense: vec![
                expense(ExpenseCategory::Chicks, 300.0, at(5, 2)),
                expense(ExpenseCategory::Feed, 200.0, at(5, 3)),
                expense(ExpenseCategory::Labor, 50.0, at(5, 4)),
            ],
            sale: vec![sale(900.0, 100.0, at(5, 10))],
            mortality: vec![MortalityLog {
                id: "m".to_string(),
                batch_id: "a".to_string(),
                date: NaiveDate::from_ymd_opt(2025, 1, 3).unwrap(),
                count: 10.0,
                cause: None,
                notes: None,
                created_at: at(1, 3),
            }],
            ..Default::default()
        };
        let stats = FinanceEngine::new().batch_stats(&batch("a"), &logs);

        assert_eq!(stats.expenses, 650.0);
        assert_eq!(stats.chick_cost, 300.0);
        assert_eq!(stats.feed_cost, 300.0);
        assert_eq!(stats.other_cost, 50.0);
        assert_eq!(stats.profit, 250.0);
        assert_eq!(stats.birds_produced, 90.0);
        assert_eq!(stats.birds_sold, 50.0);
        assert_eq!(stats.cost_per_bird, 650.0 / 90.0);
        assert!((stats.weight_lb - 220.462).abs() < 1e-9);
    }

    #[test]
    fn test_report_filters_and_sorts() {
        let a = (
            batch("a"),
            BatchLogs {
                expense: vec![
                    expense(ExpenseCategory::Chicks, 300.0, at(5, 2)),
                    // before the month cutoff
                    expense(ExpenseCategory::Medicine, 999.0, at(4, 20)),
                ],
                sale: vec![sale(500.0, 50.0, at(5, 10))],
                feed: vec![feed_with_cost(40.0, at(5, 3))],
                ..Default::default()
            },
        );
        let b = (
            batch("b"),
            BatchLogs {
                sale: vec![sale(1000.0, 90.0, at(5, 11))],
                ..Default::default()
            },
        );
        let idle = (
            batch("idle"),
            BatchLogs {
                sale: vec![sale(700.0, 60.0, at(2, 1))],
                ..Default::default()
            },
        );

        let report = FinanceEngine::new().report(&calendar(), FinancePeriod::Month, &[a, b, idle]);

        let ids: Vec<&str> = report.batch_stats.iter().map(|s| s.batch_id.as_str()).collect();
        assert_eq!(ids, ["b", "a"]);
        assert_eq!(report.total_revenue, 1500.0);
        assert_eq!(report.total_expenses, 340.0);
        assert_eq!(report.profit, 1160.0);
        assert_eq!(report.expenses_by_category[&ExpenseCategory::Medicine], 0.0);
        assert_eq!(report.expenses_by_category[&ExpenseCategory::Feed], 40.0);
        assert_eq!(report.expenses_by_category.len(), ExpenseCategory::ALL.len());

        let shares = report.expense_breakdown();
        assert_eq!(shares.len(), 2);
        assert_eq!(shares[0].category, ExpenseCategory::Chicks);
    }

    #[test]
    fn test_report_all_time_empty() {
        let report = FinanceEngine::new().report(&calendar(), FinancePeriod::All, &[]);
        assert_eq!(report.total_revenue, 0.0);
        assert_eq!(report.margin, 0.0);
        assert!(report.batch_stats.is_empty());
        assert!(report.expense_breakdown().is_empty());
    }
}
