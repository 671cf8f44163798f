// ==========================================
// Poultry Metrics - row-fetch contract
// ==========================================
// Implementors: SqliteLogRepository, CachedLogSource
// Rule: sources return raw rows only; no aggregation
// ==========================================

use crate::domain::{
    Batch, BatchLogs, ExpenseLog, FeedLog, MortalityLog, SaleLog, VaccinationLog, WaterLog,
    WeightLog,
};
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

#[async_trait]
pub trait BatchLogSource: Send + Sync {
    // ===== batches =====

    /// All batches of an organization, newest first
    async fn list_batches(&self, org_id: &str) -> RepositoryResult<Vec<Batch>>;

    /// Active batches of an organization, newest first
    async fn list_active_batches(&self, org_id: &str) -> RepositoryResult<Vec<Batch>>;

    /// One batch; `Ok(None)` when the id is unknown
    async fn get_batch(&self, batch_id: &str) -> RepositoryResult<Option<Batch>>;

    // ===== logs (one read per category) =====

    async fn feed_logs(&self, batch_id: &str) -> RepositoryResult<Vec<FeedLog>>;

    async fn weight_logs(&self, batch_id: &str) -> RepositoryResult<Vec<WeightLog>>;

    async fn mortality_logs(&self, batch_id: &str) -> RepositoryResult<Vec<MortalityLog>>;

    async fn water_logs(&self, batch_id: &str) -> RepositoryResult<Vec<WaterLog>>;

    async fn vaccination_logs(&self, batch_id: &str) -> RepositoryResult<Vec<VaccinationLog>>;

    async fn expense_logs(&self, batch_id: &str) -> RepositoryResult<Vec<ExpenseLog>>;

    async fn sale_logs(&self, batch_id: &str) -> RepositoryResult<Vec<SaleLog>>;

    /// All seven categories, read concurrently
    ///
    /// Fails on the first failing category. Callers that must survive a
    /// partial failure read the categories themselves.
    async fn load_all_logs(&self, batch_id: &str) -> RepositoryResult<BatchLogs> {
        let (feed, weight, mortality, water, vaccination, expense, sale) = futures::join!(
            self.feed_logs(batch_id),
            self.weight_logs(batch_id),
            self.mortality_logs(batch_id),
            self.water_logs(batch_id),
            self.vaccination_logs(batch_id),
            self.expense_logs(batch_id),
            self.sale_logs(batch_id),
        );

        Ok(BatchLogs {
            feed: feed?,
            weight: weight?,
            mortality: mortality?,
            water: water?,
            vaccination: vaccination?,
            expense: expense?,
            sale: sale?,
        })
    }
}
