// ==========================================
// Poultry Metrics - command line report
// ==========================================
// Usage: poultry-metrics [db_path] [org_id]
// Prints the dashboard summary, the batch comparison table and the
// all-time finance report in the configured locale
// ==========================================

use anyhow::Context;
use poultry_metrics::api::BatchComparison;
use poultry_metrics::calc::format::{format_currency_in, format_number_in, format_percentage};
use poultry_metrics::db::{check_schema_version, default_db_path, open_sqlite_connection};
use poultry_metrics::domain::{ComparisonMetric, DashboardStats, FinancePeriod, FinanceReport};
use poultry_metrics::i18n::{t, Locale};
use poultry_metrics::repository::{CachedLogSource, SqliteLogRepository};
use poultry_metrics::{logging, ConfigManager, MetricsApi, MetricsConfig};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const DEFAULT_ORG_ID: &str = "default";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let mut args = std::env::args().skip(1);
    let db_path = args.next().unwrap_or_else(default_db_path);
    let org_id = args.next().unwrap_or_else(|| DEFAULT_ORG_ID.to_string());

    tracing::info!(version = poultry_metrics::VERSION, db_path = %db_path, org_id = %org_id, "starting");

    let conn = open_sqlite_connection(&db_path)
        .with_context(|| format!("cannot open database {}", db_path))?;
    check_schema_version(&conn)?;
    let conn = Arc::new(Mutex::new(conn));

    let config = ConfigManager::from_connection(conn.clone())?.load()?;
    let repo = SqliteLogRepository::from_connection(conn)?;
    let source = CachedLogSource::new(repo, Duration::from_secs(config.cache_ttl_secs));
    let api = MetricsApi::new(Arc::new(source), config.clone());

    let (dashboard, comparison, finance) = tokio::join!(
        api.dashboard_summary(&org_id),
        api.compare_batches(&org_id),
        api.finance_report(&org_id, FinancePeriod::All),
    );

    print_dashboard(&config, &dashboard?);
    print_comparison(&config, &comparison?);
    print_finance(&config, &finance?);
    Ok(())
}

fn money(config: &MetricsConfig, value: f64) -> String {
    format_currency_in(config.locale, value, &config.currency_symbol)
}

fn heading(locale: Locale, key: &str) {
    println!();
    println!("== {} ==", t(locale, key));
}

fn print_dashboard(config: &MetricsConfig, stats: &DashboardStats) {
    let locale = config.locale;
    heading(locale, "report.dashboard_title");
    println!("{:<16} {}", t(locale, "report.batches"), stats.batches);
    println!("{:<16} {}", t(locale, "report.birds"), format_number_in(locale, stats.birds, 0));
    println!(
        "{:<16} {} lb",
        t(locale, "report.feed"),
        format_number_in(locale, stats.feed_lb, 0)
    );
    println!(
        "{:<16} {}",
        t(locale, "report.mortality"),
        format_percentage(stats.mortality, 1)
    );
    println!("{:<16} {}", t(locale, "report.profit"), money(config, stats.profit));
}

fn print_comparison(config: &MetricsConfig, comparison: &BatchComparison) {
    let locale = config.locale;
    heading(locale, "report.comparison_title");

    let rows = comparison.rows();
    if rows.is_empty() {
        println!("{}", t(locale, "report.no_batches"));
        return;
    }

    print!("{:<20}", "");
    for metric in ComparisonMetric::ALL {
        print!(" {:>16}", t(locale, &metric.label_key()));
    }
    println!();

    for row in rows {
        print!("{:<20}", row.batch_name);
        for metric in ComparisonMetric::ALL {
            let value = metric.value(row);
            let cell = match metric {
                ComparisonMetric::Fcr => format_number_in(locale, value, 2),
                ComparisonMetric::AvgWeightLb => format_number_in(locale, value, 2),
                ComparisonMetric::MortalityRate => format_percentage(value, 1),
                ComparisonMetric::Profit => money(config, value),
                ComparisonMetric::TotalFeedLb | ComparisonMetric::DaysActive => {
                    format_number_in(locale, value, 0)
                }
            };
            print!(" {:>16}", cell);
        }
        println!();
    }
}

fn print_finance(config: &MetricsConfig, report: &FinanceReport) {
    let locale = config.locale;
    heading(locale, "report.finance_title");
    println!("{}", t(locale, &report.period.label_key()));
    println!("{:<16} {}", t(locale, "report.revenue"), money(config, report.total_revenue));
    println!("{:<16} {}", t(locale, "report.expenses"), money(config, report.total_expenses));
    println!("{:<16} {}", t(locale, "report.profit"), money(config, report.profit));
    println!("{:<16} {}", t(locale, "report.margin"), format_percentage(report.margin, 1));
    println!("{:<16} {}", t(locale, "report.roi"), format_percentage(report.roi, 1));

    for share in report.expense_breakdown() {
        println!(
            "  {:<14} {:>12} {:>7}",
            t(locale, &share.category.label_key()),
            money(config, share.amount),
            format_percentage(share.percentage, 1)
        );
    }

    for stats in &report.batch_stats {
        println!(
            "  {:<20} {:>12} {:>12} {:>12} {:>7}",
            stats.batch_name,
            money(config, stats.revenue),
            money(config, stats.expenses),
            money(config, stats.profit),
            format_percentage(stats.margin, 1)
        );
    }
}
