// ==========================================
// MetricsApi integration tests
// ==========================================
// Scope:
// 1. dashboard / detail / comparison / finance over a real SQLite file
// 2. input errors: empty id, unknown batch
// 3. partial failure: failing category reads become empty sets
// 4. refresh coordination over real API calls
// ==========================================

mod helpers;

use helpers::builders::*;
use helpers::test_env::{TestEnv, ORG_ID};
use poultry_metrics::domain::{
    Batch, ComparisonMetric, ExpenseCategory, FinancePeriod, LogCategory,
};
use poultry_metrics::{ApiError, MetricsConfig, RefreshCoordinator};

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

struct Farm {
    env: TestEnv,
    a: Batch, // active, deaths + chick expense
    b: Batch, // active, one sale
    c: Batch, // closed, feed cost + sale
}

fn farm() -> Farm {
    let env = TestEnv::new();
    let repo = &env.repo;

    let a = repo
        .create_batch(&batch_entry(ORG_ID, "Lote A", 500.0, env.day(30)))
        .unwrap();
    repo.add_mortality(&a.id, &deaths(env.day(20), 10.0)).unwrap();
    repo.add_expense(&a.id, &expense(ExpenseCategory::Chicks, 200.0)).unwrap();
    repo.add_feed(&a.id, &feed(env.day(25), 100.0, None)).unwrap();
    repo.add_weight(&a.id, &weight_lb(env.day(2), 4.0)).unwrap();

    let b = repo
        .create_batch(&batch_entry(ORG_ID, "Lote B", 300.0, env.day(45)))
        .unwrap();
    repo.add_sale(&b.id, &sale(env.day(1), 100.0, 800.0)).unwrap();

    let c = repo
        .create_batch(&batch_entry(ORG_ID, "Lote C", 200.0, env.day(90)))
        .unwrap();
    repo.add_feed(&c.id, &feed(env.day(80), 300.0, Some(50.0))).unwrap();
    repo.add_sale(&c.id, &sale(env.day(45), 200.0, 1000.0)).unwrap();
    repo.close_batch(&c.id, env.day(45)).unwrap();

    Farm { env, a, b, c }
}

// ==========================================
// Dashboard
// ==========================================

#[tokio::test]
async fn test_dashboard_summary_over_active_batches() {
    let farm = farm();
    let stats = farm.env.api().dashboard_summary(ORG_ID).await.unwrap();

    assert_eq!(stats.batches, 2);
    assert_eq!(stats.birds, 490.0 + 200.0);
    assert!(approx(stats.mortality, 1.25));
    assert_eq!(stats.profit, 600.0);
    assert!(approx(stats.feed_lb, 220.462));
}

#[tokio::test]
async fn test_dashboard_rejects_empty_org() {
    let farm = farm();
    let err = farm.env.api().dashboard_summary("  ").await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));
}

#[tokio::test]
async fn test_dashboard_for_unknown_org_is_zero() {
    let farm = farm();
    let stats = farm.env.api().dashboard_summary("nobody").await.unwrap();
    assert_eq!(stats.batches, 0);
    assert_eq!(stats.mortality, 0.0);
}

// ==========================================
// Batch detail
// ==========================================

#[tokio::test]
async fn test_batch_detail_kpis() {
    let farm = farm();
    let kpis = farm.env.api().batch_detail(&farm.a.id).await.unwrap();

    assert_eq!(kpis.batch_name, "Lote A");
    assert_eq!(kpis.total_deaths, 10.0);
    assert_eq!(kpis.birds_alive, 490.0);
    assert!(approx(kpis.mortality_rate, 2.0));
    assert!((kpis.avg_weight_lb - 4.0).abs() < 1e-3);
    assert!((30..=31).contains(&kpis.days_active));
    assert_eq!(kpis.total_expenses, 200.0);
    assert_eq!(kpis.profit, -200.0);
    assert!(kpis.feed_recommendation.is_some());

    let closed = farm.env.api().batch_detail(&farm.c.id).await.unwrap();
    assert_eq!(closed.days_active, 45);
}

#[tokio::test]
async fn test_batch_detail_errors() {
    let farm = farm();
    let api = farm.env.api();

    assert!(matches!(
        api.batch_detail("").await,
        Err(ApiError::InvalidInput(_))
    ));
    assert!(matches!(
        api.batch_detail("missing").await,
        Err(ApiError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_failing_category_reads_as_empty() {
    let farm = farm();
    farm.env.source.fail(&farm.a.id, LogCategory::Feed);

    let kpis = farm.env.api().batch_detail(&farm.a.id).await.unwrap();
    assert_eq!(kpis.total_feed_kg, 0.0);
    assert_eq!(kpis.fcr, 0.0);
    // sibling reads unaffected
    assert_eq!(kpis.total_deaths, 10.0);
    assert_eq!(kpis.total_expenses, 200.0);

    let logs = farm.env.api().batch_logs(&farm.a.id).await.unwrap();
    assert!(logs.feed.is_empty());
    assert_eq!(logs.mortality.len(), 1);
}

// ==========================================
// Comparison
// ==========================================

#[tokio::test]
async fn test_compare_batches_with_failed_batch() {
    let farm = farm();
    farm.env.source.fail(&farm.b.id, LogCategory::Sale);

    let api = farm.env.api();
    let comparison = api.compare_batches(ORG_ID).await.unwrap();
    assert_eq!(comparison.batches.len(), 3);

    let b = comparison.get(&farm.b.id).unwrap();
    assert_eq!(b.batch_name, "Lote B");
    assert_eq!(b.total_revenue, 0.0);
    assert_eq!(b.birds_alive, 0.0);
    assert_eq!(b.days_active, 0);

    let a = comparison.get(&farm.a.id).unwrap();
    assert_eq!(a.birds_alive, 490.0);

    let mut selection = api.new_selection();
    assert!(selection.toggle(&farm.a.id));
    assert!(selection.toggle(&farm.c.id));
    assert_eq!(
        comparison.best_value(&selection, ComparisonMetric::Profit),
        Some(1000.0)
    );
    assert!(comparison.is_best(&selection, ComparisonMetric::Profit, &farm.c.id));

    let insights = comparison.insights(&selection);
    assert_eq!(insights.best_profit.unwrap().batch_id, farm.c.id);
}

#[tokio::test]
async fn test_compare_batches_honours_limit() {
    let farm = farm();
    let config = MetricsConfig {
        comparison_batch_limit: 2,
        ..Default::default()
    };

    let comparison = farm.env.api_with(config).compare_batches(ORG_ID).await.unwrap();
    let names: Vec<&str> = comparison.rows().iter().map(|m| m.batch_name.as_str()).collect();
    assert_eq!(names, ["Lote C", "Lote B"]);
}

// ==========================================
// Finance
// ==========================================

#[tokio::test]
async fn test_finance_report_all_time() {
    let farm = farm();
    let report = farm
        .env
        .api()
        .finance_report(ORG_ID, FinancePeriod::All)
        .await
        .unwrap();

    let names: Vec<&str> = report
        .batch_stats
        .iter()
        .map(|s| s.batch_name.as_str())
        .collect();
    assert_eq!(names, ["Lote C", "Lote B", "Lote A"]);
    assert_eq!(report.total_revenue, 1800.0);
    assert_eq!(report.total_expenses, 250.0);
    assert_eq!(report.profit, 1550.0);
    assert!(approx(report.margin, 1550.0 / 1800.0 * 100.0));
    assert!(approx(report.roi, 1550.0 / 250.0 * 100.0));
    assert_eq!(report.expenses_by_category[&ExpenseCategory::Feed], 50.0);
    assert_eq!(report.expenses_by_category[&ExpenseCategory::Chicks], 200.0);

    let c = &report.batch_stats[0];
    assert_eq!(c.feed_cost, 50.0);
    assert_eq!(c.birds_sold, 200.0);
}

#[tokio::test]
async fn test_finance_report_month_keeps_fresh_rows() {
    let farm = farm();
    // every row was written just now, so the current month sees all of them
    let report = farm
        .env
        .api()
        .finance_report(ORG_ID, FinancePeriod::Month)
        .await
        .unwrap();
    assert_eq!(report.period, FinancePeriod::Month);
    assert_eq!(report.total_revenue, 1800.0);
}

// ==========================================
// Refresh coordination
// ==========================================

#[tokio::test]
async fn test_stale_dashboard_refresh_is_dropped() {
    let farm = farm();
    let api = farm.env.api();
    let coordinator = RefreshCoordinator::new();

    let slow = coordinator.begin();
    let stale = api.dashboard_summary(ORG_ID).await.unwrap();

    farm.env
        .repo
        .add_mortality(&farm.a.id, &deaths(farm.env.day(0), 40.0))
        .unwrap();
    let fast = coordinator.begin();
    let fresh = api.dashboard_summary(ORG_ID).await.unwrap();

    assert!(coordinator.publish(fast, fresh.clone()));
    assert!(!coordinator.publish(slow, stale));
    assert_eq!(coordinator.latest(), Some(fresh));
    assert_eq!(coordinator.latest().unwrap().birds, 450.0 + 200.0);
}
