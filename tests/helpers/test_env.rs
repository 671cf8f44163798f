// ==========================================
// Test environment - temp SQLite file + repository + API
// ==========================================

use super::flaky_source::FlakySource;
use chrono::{Duration, FixedOffset, NaiveDate, Utc};
use poultry_metrics::calc::dates::{Calendar, FixedClock};
use poultry_metrics::repository::SqliteLogRepository;
use poultry_metrics::{MetricsApi, MetricsConfig};
use std::sync::Arc;
use tempfile::NamedTempFile;

pub const ORG_ID: &str = "org-test";

/// UTC-6, clock pinned at test start
pub fn calendar() -> Calendar<FixedOffset, FixedClock> {
    Calendar::new(
        FixedOffset::west_opt(6 * 3600).unwrap(),
        FixedClock(Utc::now()),
    )
}

pub fn days_ago(calendar: &Calendar<FixedOffset, FixedClock>, days: i64) -> NaiveDate {
    calendar.today() - Duration::days(days)
}

pub struct TestEnv {
    pub db_path: String,
    pub repo: Arc<SqliteLogRepository>,
    pub source: Arc<FlakySource<SqliteLogRepository>>,
    pub calendar: Calendar<FixedOffset, FixedClock>,
    _temp_file: NamedTempFile,
}

impl TestEnv {
    pub fn new() -> Self {
        poultry_metrics::logging::init_test();

        let temp_file = NamedTempFile::new().unwrap();
        let db_path = temp_file.path().to_str().unwrap().to_string();
        let repo = Arc::new(SqliteLogRepository::new(&db_path).unwrap());
        let source = Arc::new(FlakySource::new(repo.clone()));

        Self {
            db_path,
            repo,
            source,
            calendar: calendar(),
            _temp_file: temp_file,
        }
    }

    pub fn day(&self, days_ago: i64) -> NaiveDate {
        self::days_ago(&self.calendar, days_ago)
    }

    /// API over the flaky source
    pub fn api(&self) -> MetricsApi<FixedOffset, FixedClock> {
        self.api_with(MetricsConfig::default())
    }

    pub fn api_with(&self, config: MetricsConfig) -> MetricsApi<FixedOffset, FixedClock> {
        MetricsApi::with_calendar(self.source.clone(), config, self.calendar.clone())
    }
}
