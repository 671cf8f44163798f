// ==========================================
// FlakySource - BatchLogSource with injected failures + call counting
// ==========================================

use async_trait::async_trait;
use poultry_metrics::domain::{
    Batch, ExpenseLog, FeedLog, LogCategory, MortalityLog, SaleLog, VaccinationLog, WaterLog,
    WeightLog,
};
use poultry_metrics::repository::{BatchLogSource, RepositoryError, RepositoryResult};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub struct FlakySource<S> {
    inner: Arc<S>,
    failing: Mutex<HashSet<(String, LogCategory)>>,
    calls: AtomicUsize,
}

impl<S: BatchLogSource> FlakySource<S> {
    pub fn new(inner: Arc<S>) -> Self {
        Self {
            inner,
            failing: Mutex::new(HashSet::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Make one category read of one batch fail
    pub fn fail(&self, batch_id: &str, category: LogCategory) {
        self.failing
            .lock()
            .unwrap()
            .insert((batch_id.to_string(), category));
    }

    /// Make every category read of one batch fail
    pub fn fail_batch(&self, batch_id: &str) {
        for category in LogCategory::ALL {
            self.fail(batch_id, category);
        }
    }

    pub fn heal(&self) {
        self.failing.lock().unwrap().clear();
    }

    /// Reads that reached this source
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn check(&self, batch_id: &str, category: LogCategory) -> RepositoryResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let failing = self.failing.lock().unwrap();
        if failing.contains(&(batch_id.to_string(), category)) {
            return Err(RepositoryError::DatabaseQueryError(format!(
                "injected failure: {} / {}",
                batch_id, category
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl<S: BatchLogSource> BatchLogSource for FlakySource<S> {
    async fn list_batches(&self, org_id: &str) -> RepositoryResult<Vec<Batch>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.list_batches(org_id).await
    }

    async fn list_active_batches(&self, org_id: &str) -> RepositoryResult<Vec<Batch>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.list_active_batches(org_id).await
    }

    async fn get_batch(&self, batch_id: &str) -> RepositoryResult<Option<Batch>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.get_batch(batch_id).await
    }

    async fn feed_logs(&self, batch_id: &str) -> RepositoryResult<Vec<FeedLog>> {
        self.check(batch_id, LogCategory::Feed)?;
        self.inner.feed_logs(batch_id).await
    }

    async fn weight_logs(&self, batch_id: &str) -> RepositoryResult<Vec<WeightLog>> {
        self.check(batch_id, LogCategory::Weight)?;
        self.inner.weight_logs(batch_id).await
    }

    async fn mortality_logs(&self, batch_id: &str) -> RepositoryResult<Vec<MortalityLog>> {
        self.check(batch_id, LogCategory::Mortality)?;
        self.inner.mortality_logs(batch_id).await
    }

    async fn water_logs(&self, batch_id: &str) -> RepositoryResult<Vec<WaterLog>> {
        self.check(batch_id, LogCategory::Water)?;
        self.inner.water_logs(batch_id).await
    }

    async fn vaccination_logs(&self, batch_id: &str) -> RepositoryResult<Vec<VaccinationLog>> {
        self.check(batch_id, LogCategory::Vaccination)?;
        self.inner.vaccination_logs(batch_id).await
    }

    async fn expense_logs(&self, batch_id: &str) -> RepositoryResult<Vec<ExpenseLog>> {
        self.check(batch_id, LogCategory::Expense)?;
        self.inner.expense_logs(batch_id).await
    }

    async fn sale_logs(&self, batch_id: &str) -> RepositoryResult<Vec<SaleLog>> {
        self.check(batch_id, LogCategory::Sale)?;
        self.inner.sale_logs(batch_id).await
    }
}
