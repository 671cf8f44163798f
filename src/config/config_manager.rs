// ==========================================
// Poultry Metrics - configuration manager
// ==========================================
// Storage: config_kv (key -> value); a missing or malformed value falls
// back to its built-in default with a warning
// ==========================================

use crate::calc::format::DEFAULT_CURRENCY_SYMBOL;
use crate::config::feed_plan::FeedPlan;
use crate::db::{configure_sqlite_connection, init_schema, open_sqlite_connection};
use crate::i18n::Locale;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};

// ==========================================
// Config keys
// ==========================================
pub mod config_keys {
    // display
    pub const CURRENCY_SYMBOL: &str = "currency_symbol";
    pub const LOCALE: &str = "locale";

    // row cache
    pub const CACHE_TTL_SECS: &str = "cache_ttl_secs";

    // comparison screen
    pub const COMPARISON_BATCH_LIMIT: &str = "comparison_batch_limit";
    pub const COMPARISON_MAX_SELECTED: &str = "comparison_max_selected";

    // feed recommendation (JSON array of tiers)
    pub const FEED_PLAN: &str = "feed_plan";
}

pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;
pub const DEFAULT_COMPARISON_BATCH_LIMIT: usize = 10;
pub const DEFAULT_COMPARISON_MAX_SELECTED: usize = 3;

// ==========================================
// MetricsConfig - typed snapshot
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsConfig {
    pub currency_symbol: String,
    pub locale: Locale,
    pub cache_ttl_secs: u64,
    pub comparison_batch_limit: usize,
    pub comparison_max_selected: usize,
    pub feed_plan: FeedPlan,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            currency_symbol: DEFAULT_CURRENCY_SYMBOL.to_string(),
            locale: Locale::default(),
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            comparison_batch_limit: DEFAULT_COMPARISON_BATCH_LIMIT,
            comparison_max_selected: DEFAULT_COMPARISON_MAX_SELECTED,
            feed_plan: FeedPlan::default(),
        }
    }
}

// ==========================================
// ConfigManager
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// Open (and if needed create) the database at `db_path`
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Share an existing connection
    ///
    /// PRAGMAs are re-applied (idempotent) and the schema is created if absent.
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            configure_sqlite_connection(&guard)?;
            init_schema(&guard)?;
        }
        Ok(Self { conn })
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// Raw value of `key`
    pub fn get_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// Insert or overwrite `key`
    pub fn set_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO config_kv (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
             ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        tracing::debug!(key, value, "config updated");
        Ok(())
    }

    /// Every stored key/value, sorted by key
    pub fn snapshot(&self) -> RepositoryResult<BTreeMap<String, String>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT key, value FROM config_kv ORDER BY key")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut map = BTreeMap::new();
        for row in rows {
            let (key, value) = row?;
            map.insert(key, value);
        }
        Ok(map)
    }

    /// Parse `key` with `FromStr`, falling back to `default`
    fn get_parsed<T: FromStr>(&self, key: &str, default: T) -> RepositoryResult<T> {
        let Some(raw) = self.get_value(key)? else {
            return Ok(default);
        };
        match raw.trim().parse::<T>() {
            Ok(v) => Ok(v),
            Err(_) => {
                tracing::warn!(config_key = key, raw_value = %raw, "malformed config value, using default");
                Ok(default)
            }
        }
    }

    /// Typed configuration with defaults for missing keys
    pub fn load(&self) -> RepositoryResult<MetricsConfig> {
        let defaults = MetricsConfig::default();

        let currency_symbol = self
            .get_value(config_keys::CURRENCY_SYMBOL)?
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.currency_symbol);

        let locale = match self.get_value(config_keys::LOCALE)? {
            Some(raw) => Locale::from_code(&raw).unwrap_or_else(|| {
                tracing::warn!(config_key = config_keys::LOCALE, raw_value = %raw, "unknown locale, using default");
                defaults.locale
            }),
            None => defaults.locale,
        };

        let feed_plan = match self.get_value(config_keys::FEED_PLAN)? {
            Some(raw) => FeedPlan::from_json(&raw).unwrap_or_else(|| {
                tracing::warn!(config_key = config_keys::FEED_PLAN, "malformed feed plan, using default");
                defaults.feed_plan.clone()
            }),
            None => defaults.feed_plan.clone(),
        };

        let comparison_max_selected = self
            .get_parsed(
                config_keys::COMPARISON_MAX_SELECTED,
                defaults.comparison_max_selected,
            )?
            .max(1);

        Ok(MetricsConfig {
            currency_symbol,
            locale,
            cache_ttl_secs: self.get_parsed(config_keys::CACHE_TTL_SECS, defaults.cache_ttl_secs)?,
            comparison_batch_limit: self.get_parsed(
                config_keys::COMPARISON_BATCH_LIMIT,
                defaults.comparison_batch_limit,
            )?,
            comparison_max_selected,
            feed_plan,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn))).unwrap()
    }

    #[test]
    fn test_load_defaults() {
        let cfg = manager().load().unwrap();
        assert_eq!(cfg, MetricsConfig::default());
        assert_eq!(cfg.currency_symbol, "C$");
        assert_eq!(cfg.cache_ttl_secs, 300);
        assert_eq!(cfg.comparison_max_selected, 3);
    }

    #[test]
    fn test_load_overrides() {
        let mgr = manager();
        mgr.set_value(config_keys::LOCALE, "en-US").unwrap();
        mgr.set_value(config_keys::CURRENCY_SYMBOL, "$").unwrap();
        mgr.set_value(config_keys::CACHE_TTL_SECS, "60").unwrap();
        mgr.set_value(config_keys::COMPARISON_BATCH_LIMIT, "5").unwrap();

        let cfg = mgr.load().unwrap();
        assert_eq!(cfg.locale, Locale::En);
        assert_eq!(cfg.currency_symbol, "$");
        assert_eq!(cfg.cache_ttl_secs, 60);
        assert_eq!(cfg.comparison_batch_limit, 5);
    }

    #[test]
    fn test_malformed_values_fall_back() {
        let mgr = manager();
        mgr.set_value(config_keys::CACHE_TTL_SECS, "soon").unwrap();
        mgr.set_value(config_keys::LOCALE, "fr").unwrap();
        mgr.set_value(config_keys::FEED_PLAN, "{").unwrap();
        mgr.set_value(config_keys::COMPARISON_MAX_SELECTED, "0").unwrap();

        let cfg = mgr.load().unwrap();
        assert_eq!(cfg.cache_ttl_secs, DEFAULT_CACHE_TTL_SECS);
        assert_eq!(cfg.locale, Locale::Es);
        assert_eq!(cfg.feed_plan, FeedPlan::default());
        assert_eq!(cfg.comparison_max_selected, 1);
    }

    #[test]
    fn test_set_value_overwrites_and_snapshot() {
        let mgr = manager();
        mgr.set_value("a", "1").unwrap();
        mgr.set_value("a", "2").unwrap();
        assert_eq!(mgr.get_value("a").unwrap().as_deref(), Some("2"));
        assert_eq!(mgr.snapshot().unwrap().len(), 1);
        assert_eq!(mgr.get_value("missing").unwrap(), None);
    }
}
