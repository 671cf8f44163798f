// ==========================================
// SQLite connection setup + schema
// ==========================================
// Every Connection::open in the crate goes through here so PRAGMAs
// are applied uniformly; init_schema is idempotent.
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::path::PathBuf;
use std::time::Duration;

/// Overrides the default database location
pub const ENV_DB_PATH: &str = "POULTRY_METRICS_DB_PATH";

/// Default busy_timeout (ms)
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Schema version written by [`init_schema`]
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version     INTEGER PRIMARY KEY,
    applied_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS config_kv (
    key         TEXT PRIMARY KEY,
    value       TEXT NOT NULL,
    updated_at  TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS batches (
    id                TEXT PRIMARY KEY,
    org_id            TEXT NOT NULL,
    name              TEXT NOT NULL,
    initial_quantity  REAL NOT NULL,
    start_date        TEXT NOT NULL,
    end_date          TEXT,
    status            TEXT NOT NULL DEFAULT 'active',
    created_at        TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_batches_org ON batches(org_id, created_at);

CREATE TABLE IF NOT EXISTS feed_logs (
    id           TEXT PRIMARY KEY,
    batch_id     TEXT NOT NULL REFERENCES batches(id) ON DELETE CASCADE,
    date         TEXT NOT NULL,
    feed_type    TEXT NOT NULL,
    quantity_kg  REAL NOT NULL,
    cost         REAL,
    notes        TEXT,
    created_at   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS weight_logs (
    id             TEXT PRIMARY KEY,
    batch_id       TEXT NOT NULL REFERENCES batches(id) ON DELETE CASCADE,
    date           TEXT NOT NULL,
    avg_weight_kg  REAL NOT NULL,
    sample_size    INTEGER,
    notes          TEXT,
    created_at     TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS mortality_logs (
    id          TEXT PRIMARY KEY,
    batch_id    TEXT NOT NULL REFERENCES batches(id) ON DELETE CASCADE,
    date        TEXT NOT NULL,
    quantity    REAL NOT NULL,
    cause       TEXT,
    notes       TEXT,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS water_logs (
    id          TEXT PRIMARY KEY,
    batch_id    TEXT NOT NULL REFERENCES batches(id) ON DELETE CASCADE,
    date        TEXT NOT NULL,
    liters      REAL NOT NULL,
    notes       TEXT,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS vaccination_logs (
    id            TEXT PRIMARY KEY,
    batch_id      TEXT NOT NULL REFERENCES batches(id) ON DELETE CASCADE,
    date          TEXT NOT NULL,
    vaccine_name  TEXT NOT NULL,
    dosage        TEXT,
    notes         TEXT,
    created_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS expense_logs (
    id           TEXT PRIMARY KEY,
    batch_id     TEXT NOT NULL REFERENCES batches(id) ON DELETE CASCADE,
    date         TEXT,
    category     TEXT NOT NULL,
    amount       REAL NOT NULL,
    description  TEXT,
    notes        TEXT,
    created_at   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS sales_logs (
    id               TEXT PRIMARY KEY,
    batch_id         TEXT NOT NULL REFERENCES batches(id) ON DELETE CASCADE,
    date             TEXT NOT NULL,
    quantity_birds   REAL,
    quantity         REAL,
    total_weight_kg  REAL,
    price_per_kg     REAL,
    total_revenue    REAL,
    total_amount     REAL,
    buyer            TEXT,
    notes            TEXT,
    created_at       TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_feed_logs_batch ON feed_logs(batch_id, date);
CREATE INDEX IF NOT EXISTS idx_weight_logs_batch ON weight_logs(batch_id, date);
CREATE INDEX IF NOT EXISTS idx_mortality_logs_batch ON mortality_logs(batch_id, date);
CREATE INDEX IF NOT EXISTS idx_water_logs_batch ON water_logs(batch_id, date);
CREATE INDEX IF NOT EXISTS idx_vaccination_logs_batch ON vaccination_logs(batch_id, date);
CREATE INDEX IF NOT EXISTS idx_expense_logs_batch ON expense_logs(batch_id, date);
CREATE INDEX IF NOT EXISTS idx_sales_logs_batch ON sales_logs(batch_id, date);
"#;

/// `$POULTRY_METRICS_DB_PATH`, else `<data_dir>/poultry-metrics/poultry.db`
///
/// Falls back to `./poultry.db` when the platform has no data directory.
pub fn default_db_path() -> String {
    if let Ok(path) = std::env::var(ENV_DB_PATH) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./poultry.db");
    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("poultry-metrics");
        if let Err(e) = std::fs::create_dir_all(&dir) {
            tracing::warn!(dir = %dir.display(), error = %e, "cannot create data directory");
        }
        path = dir.join("poultry.db");
    }
    path.to_string_lossy().to_string()
}

/// Per-connection PRAGMAs
///
/// foreign_keys and busy_timeout do not persist in the file; every
/// connection needs them.
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// Open a connection with the crate-wide PRAGMAs and SQL tracing hooks
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let mut conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    crate::perf::install_sqlite_tracing(&mut conn);
    Ok(conn)
}

/// Create all tables if absent and stamp the schema version
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version, applied_at) VALUES (?1, datetime('now'))",
        [CURRENT_SCHEMA_VERSION],
    )?;
    Ok(())
}

/// schema_version, or `None` when the table does not exist yet
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

/// Warn when the file was created by a different schema version
pub fn check_schema_version(conn: &Connection) -> rusqlite::Result<()> {
    match read_schema_version(conn)? {
        Some(v) if v != CURRENT_SCHEMA_VERSION => {
            tracing::warn!(
                found = v,
                expected = CURRENT_SCHEMA_VERSION,
                "database schema version mismatch"
            );
        }
        None => tracing::warn!("database has no schema_version table"),
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        assert_eq!(read_schema_version(&conn).unwrap(), None);

        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap();
        assert_eq!(read_schema_version(&conn).unwrap(), Some(CURRENT_SCHEMA_VERSION));

        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name LIKE '%_logs'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 7);
    }
}
