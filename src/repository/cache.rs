// ==========================================
// Poultry Metrics - time-boxed read cache
// ==========================================
// Wraps any BatchLogSource; memoizes successful reads per key for a TTL
// Storage: in-memory serde_json::Value, nothing persisted
// Failed reads are never cached
// ==========================================

use crate::domain::{
    Batch, ExpenseLog, FeedLog, LogCategory, MortalityLog, SaleLog, VaccinationLog, WaterLog,
    WeightLog,
};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::log_source::BatchLogSource;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

struct CacheEntry {
    stored_at: Instant,
    value: serde_json::Value,
}

pub struct CachedLogSource<S> {
    inner: S,
    ttl: Duration,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl<S: BatchLogSource> CachedLogSource<S> {
    pub fn new(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Cache key of a batch-list read
    pub fn batches_key(org_id: &str, active_only: bool) -> String {
        if active_only {
            format!("batches:active:{}", org_id)
        } else {
            format!("batches:all:{}", org_id)
        }
    }

    /// Cache key of a single-batch read
    pub fn batch_key(batch_id: &str) -> String {
        format!("batch:{}", batch_id)
    }

    /// Cache key of one log-category read
    pub fn logs_key(category: LogCategory, batch_id: &str) -> String {
        format!("logs:{}:{}", category, batch_id)
    }

    fn entries(&self) -> RepositoryResult<MutexGuard<'_, HashMap<String, CacheEntry>>> {
        self.entries
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// Drop one key
    pub fn invalidate(&self, key: &str) -> RepositoryResult<bool> {
        Ok(self.entries()?.remove(key).is_some())
    }

    /// Drop every key that mentions `batch_id` (after a write to that batch)
    pub fn invalidate_batch(&self, batch_id: &str) -> RepositoryResult<usize> {
        let suffix = format!(":{}", batch_id);
        let mut entries = self.entries()?;
        let before = entries.len();
        entries.retain(|key, _| !key.ends_with(&suffix));
        Ok(before - entries.len())
    }

    pub fn clear(&self) -> RepositoryResult<()> {
        self.entries()?.clear();
        Ok(())
    }

    /// Live (non-expired) entries
    pub fn len(&self) -> RepositoryResult<usize> {
        let ttl = self.ttl;
        Ok(self
            .entries()?
            .values()
            .filter(|e| e.stored_at.elapsed() < ttl)
            .count())
    }

    pub fn is_empty(&self) -> RepositoryResult<bool> {
        Ok(self.len()? == 0)
    }

    fn lookup<T: DeserializeOwned>(&self, key: &str) -> RepositoryResult<Option<T>> {
        let mut entries = self.entries()?;
        let Some(entry) = entries.get(key) else {
            return Ok(None);
        };

        if entry.stored_at.elapsed() >= self.ttl {
            entries.remove(key);
            tracing::debug!(key, "cache entry expired");
            return Ok(None);
        }

        match serde_json::from_value(entry.value.clone()) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                entries.remove(key);
                tracing::warn!(key, error = %e, "discarding undecodable cache entry");
                Ok(None)
            }
        }
    }

    fn store<T: Serialize>(&self, key: String, value: &T) -> RepositoryResult<()> {
        let value = serde_json::to_value(value)?;
        self.entries()?.insert(
            key,
            CacheEntry {
                stored_at: Instant::now(),
                value,
            },
        );
        Ok(())
    }

    async fn cached<T, F>(&self, key: String, fetch: F) -> RepositoryResult<T>
    where
        T: Serialize + DeserializeOwned + Send,
        F: Future<Output = RepositoryResult<T>> + Send,
    {
        if let Some(hit) = self.lookup::<T>(&key)? {
            tracing::trace!(key = %key, "cache hit");
            return Ok(hit);
        }

        let value = fetch.await?;
        self.store(key, &value)?;
        Ok(value)
    }
}

#[async_trait]
impl<S: BatchLogSource> BatchLogSource for CachedLogSource<S> {
    async fn list_batches(&self, org_id: &str) -> RepositoryResult<Vec<Batch>> {
        self.cached(
            Self::batches_key(org_id, false),
            self.inner.list_batches(org_id),
        )
        .await
    }

    async fn list_active_batches(&self, org_id: &str) -> RepositoryResult<Vec<Batch>> {
        self.cached(
            Self::batches_key(org_id, true),
            self.inner.list_active_batches(org_id),
        )
        .await
    }

    async fn get_batch(&self, batch_id: &str) -> RepositoryResult<Option<Batch>> {
        self.cached(Self::batch_key(batch_id), self.inner.get_batch(batch_id))
            .await
    }

    async fn feed_logs(&self, batch_id: &str) -> RepositoryResult<Vec<FeedLog>> {
        self.cached(
            Self::logs_key(LogCategory::Feed, batch_id),
            self.inner.feed_logs(batch_id),
        )
        .await
    }

    async fn weight_logs(&self, batch_id: &str) -> RepositoryResult<Vec<WeightLog>> {
        self.cached(
            Self::logs_key(LogCategory::Weight, batch_id),
            self.inner.weight_logs(batch_id),
        )
        .await
    }

    async fn mortality_logs(&self, batch_id: &str) -> RepositoryResult<Vec<MortalityLog>> {
        self.cached(
            Self::logs_key(LogCategory::Mortality, batch_id),
            self.inner.mortality_logs(batch_id),
        )
        .await
    }

    async fn water_logs(&self, batch_id: &str) -> RepositoryResult<Vec<WaterLog>> {
        self.cached(
            Self::logs_key(LogCategory::Water, batch_id),
            self.inner.water_logs(batch_id),
        )
        .await
    }

    async fn vaccination_logs(&self, batch_id: &str) -> RepositoryResult<Vec<VaccinationLog>> {
        self.cached(
            Self::logs_key(LogCategory::Vaccination, batch_id),
            self.inner.vaccination_logs(batch_id),
        )
        .await
    }

    async fn expense_logs(&self, batch_id: &str) -> RepositoryResult<Vec<ExpenseLog>> {
        self.cached(
            Self::logs_key(LogCategory::Expense, batch_id),
            self.inner.expense_logs(batch_id),
        )
        .await
    }

    async fn sale_logs(&self, batch_id: &str) -> RepositoryResult<Vec<SaleLog>> {
        self.cached(
            Self::logs_key(LogCategory::Sale, batch_id),
            self.inner.sale_logs(batch_id),
        )
        .await
    }
}
