// ==========================================
// Operation timing + SQL statement counting
// ==========================================
// Counters are process-wide: API operations are async and may resume
// on another worker thread between reads.
// ==========================================

use rusqlite::Connection;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Enables statement counting / slow-SQL logging
pub const ENV_PERF_SQL: &str = "POULTRY_METRICS_PERF_SQL";

/// Slow-SQL threshold in milliseconds
pub const ENV_SLOW_SQL_MS: &str = "POULTRY_METRICS_SLOW_SQL_MS";

static PERF_SQL_ENABLED: AtomicBool = AtomicBool::new(false);
static SLOW_SQL_THRESHOLD_MS: AtomicU64 = AtomicU64::new(0);
static ACTIVE_GUARDS: AtomicU32 = AtomicU32::new(0);
static SQL_COUNT: AtomicU64 = AtomicU64::new(0);
static SLOW_SQL_COUNT: AtomicU64 = AtomicU64::new(0);

fn is_true(v: &str) -> bool {
    matches!(
        v.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "y" | "on"
    )
}

fn truncate_sql(sql: &str, max_len: usize) -> String {
    let s = sql.trim().replace('\n', " ");
    match s.char_indices().nth(max_len) {
        Some((cut, _)) => format!("{}…", &s[..cut]),
        None => s,
    }
}

/// Install SQLite trace / profile hooks on a connection
///
/// - On by default in debug builds, off in release
/// - `POULTRY_METRICS_PERF_SQL=1` forces it on (`0` forces it off)
/// - `POULTRY_METRICS_SLOW_SQL_MS=50` sets the slow-SQL threshold
pub fn install_sqlite_tracing(conn: &mut Connection) {
    let enabled = match std::env::var(ENV_PERF_SQL) {
        Ok(v) => is_true(&v),
        Err(_) => cfg!(debug_assertions),
    };

    PERF_SQL_ENABLED.store(enabled, Ordering::Relaxed);

    if !enabled {
        conn.trace(None);
        conn.profile(None);
        return;
    }

    let slow_ms = std::env::var(ENV_SLOW_SQL_MS)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(if cfg!(debug_assertions) { 50 } else { 200 });
    SLOW_SQL_THRESHOLD_MS.store(slow_ms, Ordering::Relaxed);

    conn.trace(Some(sql_trace_callback));
    conn.profile(Some(sql_profile_callback));
}

fn guards_active() -> bool {
    ACTIVE_GUARDS.load(Ordering::Relaxed) > 0
}

fn sql_trace_callback(_sql: &str) {
    if PERF_SQL_ENABLED.load(Ordering::Relaxed) && guards_active() {
        SQL_COUNT.fetch_add(1, Ordering::Relaxed);
    }
}

fn sql_profile_callback(sql: &str, duration: Duration) {
    if !PERF_SQL_ENABLED.load(Ordering::Relaxed) {
        return;
    }

    let ms = duration.as_millis() as u64;
    let threshold = SLOW_SQL_THRESHOLD_MS.load(Ordering::Relaxed);
    if threshold > 0 && ms >= threshold {
        tracing::warn!(
            target: "slow_sql",
            duration_ms = ms,
            sql = %truncate_sql(sql, 420),
            "slow sql"
        );
        if guards_active() {
            SLOW_SQL_COUNT.fetch_add(1, Ordering::Relaxed);
        }
    }
}

/// Logs elapsed time, SQL statements and slow statements of one operation
///
/// ```ignore
/// let _perf = poultry_metrics::perf::PerfGuard::new("dashboard_summary");
/// // do work...
/// ```
///
/// Overlapping guards share the counters, so concurrent operations
/// report the statements of their neighbours too.
pub struct PerfGuard {
    op: &'static str,
    start: Instant,
    sql_start: u64,
    slow_sql_start: u64,
}

impl PerfGuard {
    pub fn new(op: &'static str) -> Self {
        ACTIVE_GUARDS.fetch_add(1, Ordering::Relaxed);
        Self {
            op,
            start: Instant::now(),
            sql_start: SQL_COUNT.load(Ordering::Relaxed),
            slow_sql_start: SLOW_SQL_COUNT.load(Ordering::Relaxed),
        }
    }
}

impl Drop for PerfGuard {
    fn drop(&mut self) {
        let elapsed_ms = self.start.elapsed().as_millis() as u64;
        let sql_count = SQL_COUNT
            .load(Ordering::Relaxed)
            .saturating_sub(self.sql_start);
        let slow_sql_count = SLOW_SQL_COUNT
            .load(Ordering::Relaxed)
            .saturating_sub(self.slow_sql_start);

        tracing::info!(
            target: "perf",
            op = self.op,
            elapsed_ms,
            sql_count,
            slow_sql_count,
            "done"
        );

        ACTIVE_GUARDS.fetch_sub(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_true() {
        assert!(is_true("1"));
        assert!(is_true(" On "));
        assert!(!is_true("0"));
        assert!(!is_true("off"));
    }

    #[test]
    fn test_truncate_sql() {
        assert_eq!(truncate_sql("SELECT 1", 420), "SELECT 1");
        assert_eq!(truncate_sql("SELECT\n*", 420), "SELECT *");
        assert_eq!(truncate_sql("SELECT * FROM batches", 6), "SELECT…");
    }
}
