// ==========================================
// Timezone behaviour of batch metrics
// ==========================================
// Stored start / end dates are calendar dates; elapsed days and the
// production week follow the local day of the calendar doing the math.
// Clock pinned at 2025-03-15 03:00 UTC:
//   UTC    → 15 Mar 03:00
//   UTC-6  → 14 Mar 21:00
//   UTC+9  → 15 Mar 12:00
// ==========================================

mod helpers;

use chrono::{FixedOffset, NaiveDate, TimeZone, Utc};
use helpers::builders::*;
use helpers::test_env::{TestEnv, ORG_ID};
use poultry_metrics::calc::dates::{Calendar, FixedClock};
use poultry_metrics::{MetricsApi, MetricsConfig};

fn calendar(offset_hours: i32) -> Calendar<FixedOffset, FixedClock> {
    let now = Utc.with_ymd_and_hms(2025, 3, 15, 3, 0, 0).unwrap();
    Calendar::new(
        FixedOffset::east_opt(offset_hours * 3600).unwrap(),
        FixedClock(now),
    )
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn api(env: &TestEnv, offset_hours: i32) -> MetricsApi<FixedOffset, FixedClock> {
    MetricsApi::with_calendar(
        env.source.clone(),
        MetricsConfig::default(),
        calendar(offset_hours),
    )
}

#[tokio::test]
async fn test_open_batch_age_follows_local_day() {
    let env = TestEnv::new();
    let batch = env
        .repo
        .create_batch(&batch_entry(ORG_ID, "Lote Marzo", 100.0, date(2025, 3, 1)))
        .unwrap();

    for (offset, days, week) in [(0, 15, 3), (-6, 14, 2), (9, 15, 3)] {
        let kpis = api(&env, offset).batch_detail(&batch.id).await.unwrap();
        assert_eq!(kpis.days_active, days, "offset {}", offset);
        assert_eq!(kpis.current_week, week, "offset {}", offset);
    }
}

#[tokio::test]
async fn test_closed_batch_length_is_timezone_free() {
    let env = TestEnv::new();
    let batch = env
        .repo
        .create_batch(&batch_entry(ORG_ID, "Lote Enero", 100.0, date(2025, 1, 1)))
        .unwrap();
    env.repo.close_batch(&batch.id, date(2025, 2, 15)).unwrap();

    for offset in [0, -6, 9, 14, -11] {
        let kpis = api(&env, offset).batch_detail(&batch.id).await.unwrap();
        assert_eq!(kpis.days_active, 45, "offset {}", offset);
    }
}

#[tokio::test]
async fn test_stored_dates_read_back_unshifted() {
    let env = TestEnv::new();
    let batch = env
        .repo
        .create_batch(&batch_entry(ORG_ID, "Lote", 100.0, date(2025, 1, 15)))
        .unwrap();

    for offset in [0, -6, 9] {
        let cal = calendar(offset);
        let logs = api(&env, offset).batch_logs(&batch.id).await.unwrap();
        assert!(logs.is_empty());
        assert_eq!(
            cal.iso_date(batch.start_date).as_deref(),
            Some("2025-01-15"),
            "offset {}",
            offset
        );
    }
}
