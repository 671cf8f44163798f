// ==========================================
// Poultry Metrics - SQLite batch/log repository
// ==========================================
// Tables: batches + the seven *_logs tables (see db::SCHEMA_SQL)
// Dates: YYYY-MM-DD text; created_at: RFC 3339 text
// Rule: entries are validated before insert; no aggregation here
// ==========================================

use crate::db::{configure_sqlite_connection, init_schema, open_sqlite_connection};
use crate::domain::{
    Batch, BatchEntry, BatchStatus, ExpenseCategory, ExpenseEntry, ExpenseLog, FeedEntry,
    FeedLog, MortalityEntry, MortalityLog, SaleEntry, SaleLog, VaccinationEntry, VaccinationLog,
    WaterEntry, WaterLog, WeightEntry, WeightLog,
};
use crate::domain::entry::non_blank;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::log_source::BatchLogSource;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

const BATCH_COLUMNS: &str =
    "id, org_id, name, initial_quantity, start_date, end_date, status, created_at";

// ==========================================
// SqliteLogRepository
// ==========================================
pub struct SqliteLogRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteLogRepository {
    /// Open (or create) the database file
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Share an existing connection; tables are created if absent
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

    // ===== batches =====

    pub fn create_batch(&self, entry: &BatchEntry) -> RepositoryResult<Batch> {
        entry.validate()?;
        let batch = Batch {
            id: Uuid::new_v4().to_string(),
            org_id: entry.org_id.clone(),
            name: entry.name.trim().to_string(),
            initial_quantity: entry.initial_quantity,
            start_date: entry.start_date,
            end_date: None,
            status: BatchStatus::Active,
            created_at: Utc::now(),
        };

        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO batches (id, org_id, name, initial_quantity, start_date, end_date, status, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, NULL, ?6, ?7)
            "#,
            params![
                batch.id,
                batch.org_id,
                batch.name,
                batch.initial_quantity,
                batch.start_date.to_string(),
                batch.status.as_str(),
                timestamp(&batch.created_at),
            ],
        )?;
        tracing::debug!(batch_id = %batch.id, org_id = %batch.org_id, "batch created");
        Ok(batch)
    }

    /// Mark a batch completed as of `end_date`
    pub fn close_batch(&self, batch_id: &str, end_date: NaiveDate) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let changed = conn.execute(
            "UPDATE batches SET status = ?1, end_date = ?2 WHERE id = ?3",
            params![BatchStatus::Completed.as_str(), end_date.to_string(), batch_id],
        )?;
        if changed == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Batch".to_string(),
                id: batch_id.to_string(),
            });
        }
        Ok(())
    }

    pub fn find_batches(&self, org_id: &str, active_only: bool) -> RepositoryResult<Vec<Batch>> {
        let conn = self.get_conn()?;
        let sql = if active_only {
            format!(
                "SELECT {} FROM batches WHERE org_id = ?1 AND status = 'active' ORDER BY created_at DESC, rowid DESC",
                BATCH_COLUMNS
            )
        } else {
            format!(
                "SELECT {} FROM batches WHERE org_id = ?1 ORDER BY created_at DESC, rowid DESC",
                BATCH_COLUMNS
            )
        };
        let mut stmt = conn.prepare(&sql)?;
        let batches = stmt
            .query_map(params![org_id], map_batch)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(batches)
    }

    pub fn find_batch(&self, batch_id: &str) -> RepositoryResult<Option<Batch>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM batches WHERE id = ?1", BATCH_COLUMNS);
        let batch = conn
            .query_row(&sql, params![batch_id], map_batch)
            .optional()?;
        Ok(batch)
    }

    // ===== log inserts =====

    pub fn add_feed(&self, batch_id: &str, entry: &FeedEntry) -> RepositoryResult<FeedLog> {
        entry.validate()?;
        let log = FeedLog {
            id: Uuid::new_v4().to_string(),
            batch_id: batch_id.to_string(),
            date: entry.date,
            feed_type: entry.feed_type.trim().to_string(),
            quantity_kg: entry.quantity_kg,
            cost: entry.cost.filter(|c| c.is_finite()),
            notes: non_blank(&entry.notes),
            created_at: Utc::now(),
        };
        self.get_conn()?.execute(
            r#"
            INSERT INTO feed_logs (id, batch_id, date, feed_type, quantity_kg, cost, notes, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                log.id,
                log.batch_id,
                log.date.to_string(),
                log.feed_type,
                log.quantity_kg,
                log.cost,
                log.notes,
                timestamp(&log.created_at),
            ],
        )?;
        Ok(log)
    }

    pub fn add_weight(&self, batch_id: &str, entry: &WeightEntry) -> RepositoryResult<WeightLog> {
        entry.validate()?;
        let log = WeightLog {
            id: Uuid::new_v4().to_string(),
            batch_id: batch_id.to_string(),
            date: entry.date,
            avg_weight_kg: entry.avg_weight_kg(),
            sample_size: Some(entry.sample_size_or_default()),
            notes: non_blank(&entry.notes),
            created_at: Utc::now(),
        };
        self.get_conn()?.execute(
            r#"
            INSERT INTO weight_logs (id, batch_id, date, avg_weight_kg, sample_size, notes, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                log.id,
                log.batch_id,
                log.date.to_string(),
                log.avg_weight_kg,
                log.sample_size,
                log.notes,
                timestamp(&log.created_at),
            ],
        )?;
        Ok(log)
    }

    pub fn add_mortality(
        &self,
        batch_id: &str,
        entry: &MortalityEntry,
    ) -> RepositoryResult<MortalityLog> {
        entry.validate()?;
        let log = MortalityLog {
            id: Uuid::new_v4().to_string(),
            batch_id: batch_id.to_string(),
            date: entry.date,
            count: entry.count,
            cause: non_blank(&entry.cause),
            notes: non_blank(&entry.notes),
            created_at: Utc::now(),
        };
        self.get_conn()?.execute(
            r#"
            INSERT INTO mortality_logs (id, batch_id, date, quantity, cause, notes, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                log.id,
                log.batch_id,
                log.date.to_string(),
                log.count,
                log.cause,
                log.notes,
                timestamp(&log.created_at),
            ],
        )?;
        Ok(log)
    }

    pub fn add_water(&self, batch_id: &str, entry: &WaterEntry) -> RepositoryResult<WaterLog> {
        entry.validate()?;
        let log = WaterLog {
            id: Uuid::new_v4().to_string(),
            batch_id: batch_id.to_string(),
            date: entry.date,
            liters: entry.liters,
            notes: non_blank(&entry.notes),
            created_at: Utc::now(),
        };
        self.get_conn()?.execute(
            r#"
            INSERT INTO water_logs (id, batch_id, date, liters, notes, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                log.id,
                log.batch_id,
                log.date.to_string(),
                log.liters,
                log.notes,
                timestamp(&log.created_at),
            ],
        )?;
        Ok(log)
    }

    pub fn add_vaccination(
        &self,
        batch_id: &str,
        entry: &VaccinationEntry,
    ) -> RepositoryResult<VaccinationLog> {
        entry.validate()?;
        let log = VaccinationLog {
            id: Uuid::new_v4().to_string(),
            batch_id: batch_id.to_string(),
            date: entry.date,
            vaccine_name: entry.vaccine_name.trim().to_string(),
            dosage: non_blank(&entry.dosage),
            notes: non_blank(&entry.notes),
            created_at: Utc::now(),
        };
        self.get_conn()?.execute(
            r#"
            INSERT INTO vaccination_logs (id, batch_id, date, vaccine_name, dosage, notes, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                log.id,
                log.batch_id,
                log.date.to_string(),
                log.vaccine_name,
                log.dosage,
                log.notes,
                timestamp(&log.created_at),
            ],
        )?;
        Ok(log)
    }

    pub fn add_expense(&self, batch_id: &str, entry: &ExpenseEntry) -> RepositoryResult<ExpenseLog> {
        entry.validate()?;
        let log = ExpenseLog {
            id: Uuid::new_v4().to_string(),
            batch_id: batch_id.to_string(),
            date: entry.date,
            category: entry.category.unwrap_or(ExpenseCategory::Other),
            amount: entry.amount,
            description: non_blank(&entry.description),
            notes: non_blank(&entry.notes),
            created_at: Utc::now(),
        };
        self.get_conn()?.execute(
            r#"
            INSERT INTO expense_logs (id, batch_id, date, category, amount, description, notes, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                log.id,
                log.batch_id,
                log.date.map(|d| d.to_string()),
                log.category.as_str(),
                log.amount,
                log.description,
                log.notes,
                timestamp(&log.created_at),
            ],
        )?;
        Ok(log)
    }

    pub fn add_sale(&self, batch_id: &str, entry: &SaleEntry) -> RepositoryResult<SaleLog> {
        entry.validate()?;
        let log = SaleLog {
            id: Uuid::new_v4().to_string(),
            batch_id: batch_id.to_string(),
            date: entry.date,
            quantity_birds: Some(entry.quantity_birds),
            quantity: None,
            total_weight_kg: entry.total_weight_kg(),
            price_per_kg: entry.price_per_kg(),
            total_revenue: entry.revenue(),
            total_amount: None,
            buyer: non_blank(&entry.buyer),
            notes: non_blank(&entry.notes),
            created_at: Utc::now(),
        };
        self.get_conn()?.execute(
            r#"
            INSERT INTO sales_logs (
                id, batch_id, date, quantity_birds, quantity, total_weight_kg,
                price_per_kg, total_revenue, total_amount, buyer, notes, created_at
            ) VALUES (?1, ?2, ?3, ?4, NULL, ?5, ?6, ?7, NULL, ?8, ?9, ?10)
            "#,
            params![
                log.id,
                log.batch_id,
                log.date.to_string(),
                log.quantity_birds,
                log.total_weight_kg,
                log.price_per_kg,
                log.total_revenue,
                log.buyer,
                log.notes,
                timestamp(&log.created_at),
            ],
        )?;
        Ok(log)
    }

    // ===== log reads =====

    fn query_logs<T, F>(&self, sql: &str, batch_id: &str, map: F) -> RepositoryResult<Vec<T>>
    where
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
            .query_map(params![batch_id], map)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn find_feed_logs(&self, batch_id: &str) -> RepositoryResult<Vec<FeedLog>> {
        self.query_logs(
            r#"
            SELECT id, batch_id, date, feed_type, quantity_kg, cost, notes, created_at
            FROM feed_logs WHERE batch_id = ?1 ORDER BY date, created_at
            "#,
            batch_id,
            |row| {
                Ok(FeedLog {
                    id: row.get(0)?,
                    batch_id: row.get(1)?,
                    date: row.get(2)?,
                    feed_type: row.get(3)?,
                    quantity_kg: row.get(4)?,
                    cost: row.get(5)?,
                    notes: row.get(6)?,
                    created_at: row.get(7)?,
                })
            },
        )
    }

    pub fn find_weight_logs(&self, batch_id: &str) -> RepositoryResult<Vec<WeightLog>> {
        self.query_logs(
            r#"
            SELECT id, batch_id, date, avg_weight_kg, sample_size, notes, created_at
            FROM weight_logs WHERE batch_id = ?1 ORDER BY date, created_at
            "#,
            batch_id,
            |row| {
                Ok(WeightLog {
                    id: row.get(0)?,
                    batch_id: row.get(1)?,
                    date: row.get(2)?,
                    avg_weight_kg: row.get(3)?,
                    sample_size: row.get(4)?,
                    notes: row.get(5)?,
                    created_at: row.get(6)?,
                })
            },
        )
    }

    pub fn find_mortality_logs(&self, batch_id: &str) -> RepositoryResult<Vec<MortalityLog>> {
        self.query_logs(
            r#"
            SELECT id, batch_id, date, quantity, cause, notes, created_at
            FROM mortality_logs WHERE batch_id = ?1 ORDER BY date, created_at
            "#,
            batch_id,
            |row| {
                Ok(MortalityLog {
                    id: row.get(0)?,
                    batch_id: row.get(1)?,
                    date: row.get(2)?,
                    count: row.get(3)?,
                    cause: row.get(4)?,
                    notes: row.get(5)?,
                    created_at: row.get(6)?,
                })
            },
        )
    }

    pub fn find_water_logs(&self, batch_id: &str) -> RepositoryResult<Vec<WaterLog>> {
        self.query_logs(
            r#"
            SELECT id, batch_id, date, liters, notes, created_at
            FROM water_logs WHERE batch_id = ?1 ORDER BY date, created_at
            "#,
            batch_id,
            |row| {
                Ok(WaterLog {
                    id: row.get(0)?,
                    batch_id: row.get(1)?,
                    date: row.get(2)?,
                    liters: row.get(3)?,
                    notes: row.get(4)?,
                    created_at: row.get(5)?,
                })
            },
        )
    }

    pub fn find_vaccination_logs(&self, batch_id: &str) -> RepositoryResult<Vec<VaccinationLog>> {
        self.query_logs(
            r#"
            SELECT id, batch_id, date, vaccine_name, dosage, notes, created_at
            FROM vaccination_logs WHERE batch_id = ?1 ORDER BY date, created_at
            "#,
            batch_id,
            |row| {
                Ok(VaccinationLog {
                    id: row.get(0)?,
                    batch_id: row.get(1)?,
                    date: row.get(2)?,
                    vaccine_name: row.get(3)?,
                    dosage: row.get(4)?,
                    notes: row.get(5)?,
                    created_at: row.get(6)?,
                })
            },
        )
    }

    pub fn find_expense_logs(&self, batch_id: &str) -> RepositoryResult<Vec<ExpenseLog>> {
        self.query_logs(
            r#"
            SELECT id, batch_id, date, category, amount, description, notes, created_at
            FROM expense_logs WHERE batch_id = ?1 ORDER BY date, created_at
            "#,
            batch_id,
            |row| {
                Ok(ExpenseLog {
                    id: row.get(0)?,
                    batch_id: row.get(1)?,
                    date: row.get(2)?,
                    category: ExpenseCategory::parse(&row.get::<_, String>(3)?),
                    amount: row.get(4)?,
                    description: row.get(5)?,
                    notes: row.get(6)?,
                    created_at: row.get(7)?,
                })
            },
        )
    }

    pub fn find_sale_logs(&self, batch_id: &str) -> RepositoryResult<Vec<SaleLog>> {
        self.query_logs(
            r#"
            SELECT id, batch_id, date, quantity_birds, quantity, total_weight_kg,
                   price_per_kg, total_revenue, total_amount, buyer, notes, created_at
            FROM sales_logs WHERE batch_id = ?1 ORDER BY date, created_at
            "#,
            batch_id,
            |row| {
                Ok(SaleLog {
                    id: row.get(0)?,
                    batch_id: row.get(1)?,
                    date: row.get(2)?,
                    quantity_birds: row.get(3)?,
                    quantity: row.get(4)?,
                    total_weight_kg: row.get(5)?,
                    price_per_kg: row.get(6)?,
                    total_revenue: row.get(7)?,
                    total_amount: row.get(8)?,
                    buyer: row.get(9)?,
                    notes: row.get(10)?,
                    created_at: row.get(11)?,
                })
            },
        )
    }
}

/// Fixed-width RFC 3339 so text order is time order
fn timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Nanos, false)
}

fn map_batch(row: &Row<'_>) -> rusqlite::Result<Batch> {
    Ok(Batch {
        id: row.get(0)?,
        org_id: row.get(1)?,
        name: row.get(2)?,
        initial_quantity: row.get(3)?,
        start_date: row.get(4)?,
        end_date: row.get(5)?,
        status: BatchStatus::parse(&row.get::<_, String>(6)?),
        created_at: row.get(7)?,
    })
}

#[async_trait]
impl BatchLogSource for SqliteLogRepository {
    async fn list_batches(&self, org_id: &str) -> RepositoryResult<Vec<Batch>> {
        self.find_batches(org_id, false)
    }

    async fn list_active_batches(&self, org_id: &str) -> RepositoryResult<Vec<Batch>> {
        self.find_batches(org_id, true)
    }

    async fn get_batch(&self, batch_id: &str) -> RepositoryResult<Option<Batch>> {
        self.find_batch(batch_id)
    }

    async fn feed_logs(&self, batch_id: &str) -> RepositoryResult<Vec<FeedLog>> {
        self.find_feed_logs(batch_id)
    }

    async fn weight_logs(&self, batch_id: &str) -> RepositoryResult<Vec<WeightLog>> {
        self.find_weight_logs(batch_id)
    }

    async fn mortality_logs(&self, batch_id: &str) -> RepositoryResult<Vec<MortalityLog>> {
        self.find_mortality_logs(batch_id)
    }

    async fn water_logs(&self, batch_id: &str) -> RepositoryResult<Vec<WaterLog>> {
        self.find_water_logs(batch_id)
    }

    async fn vaccination_logs(&self, batch_id: &str) -> RepositoryResult<Vec<VaccinationLog>> {
        self.find_vaccination_logs(batch_id)
    }

    async fn expense_logs(&self, batch_id: &str) -> RepositoryResult<Vec<ExpenseLog>> {
        self.find_expense_logs(batch_id)
    }

    async fn sale_logs(&self, batch_id: &str) -> RepositoryResult<Vec<SaleLog>> {
        self.find_sale_logs(batch_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EntryError;

    fn repo() -> SqliteLogRepository {
        let conn = Connection::open_in_memory().unwrap();
        SqliteLogRepository::from_connection(Arc::new(Mutex::new(conn))).unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    fn new_batch(repo: &SqliteLogRepository, name: &str) -> Batch {
        repo.create_batch(&BatchEntry {
            org_id: "org-1".to_string(),
            name: name.to_string(),
            initial_quantity: 500.0,
            start_date: day(1),
        })
        .unwrap()
    }

    #[test]
    fn test_create_and_find_batch() {
        let repo = repo();
        let batch = new_batch(&repo, "  Lote 1 ");
        assert_eq!(batch.name, "Lote 1");

        let found = repo.find_batch(&batch.id).unwrap().unwrap();
        assert_eq!(found.start_date, day(1));
        assert_eq!(found.status, BatchStatus::Active);
        assert!(repo.find_batch("missing").unwrap().is_none());
    }

    #[test]
    fn test_close_batch_leaves_active_list() {
        let repo = repo();
        let a = new_batch(&repo, "A");
        let _b = new_batch(&repo, "B");

        repo.close_batch(&a.id, day(30)).unwrap();
        let active = repo.find_batches("org-1", true).unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].name, "B");

        let closed = repo.find_batch(&a.id).unwrap().unwrap();
        assert_eq!(closed.end_date, Some(day(30)));
        assert_eq!(closed.status, BatchStatus::Completed);

        assert!(matches!(
            repo.close_batch("missing", day(30)),
            Err(RepositoryError::NotFound { .. })
        ));
    }

    #[test]
    fn test_invalid_entry_is_rejected() {
        let repo = repo();
        let batch = new_batch(&repo, "A");
        let err = repo
            .add_mortality(
                &batch.id,
                &MortalityEntry {
                    date: day(2),
                    count: 0.0,
                    cause: None,
                    notes: None,
                },
            )
            .unwrap_err();
        assert!(matches!(
            err,
            RepositoryError::Validation(EntryError::InvalidQuantity)
        ));
        assert!(repo.find_mortality_logs(&batch.id).unwrap().is_empty());
    }

    #[test]
    fn test_weight_and_sale_store_kg() {
        let repo = repo();
        let batch = new_batch(&repo, "A");
        repo.add_weight(
            &batch.id,
            &WeightEntry {
                date: day(7),
                avg_weight_lb: 2.0,
                sample_size: None,
                notes: Some("  ".to_string()),
            },
        )
        .unwrap();
        repo.add_sale(
            &batch.id,
            &SaleEntry {
                date: day(31),
                quantity_birds: 100.0,
                total_weight_lb: Some(500.0),
                price_per_lb: Some(1.5),
                total_revenue: None,
                buyer: Some("Mercado".to_string()),
                notes: None,
            },
        )
        .unwrap();

        let weights = repo.find_weight_logs(&batch.id).unwrap();
        assert!((weights[0].avg_weight_kg - 0.907184).abs() < 1e-9);
        assert_eq!(weights[0].sample_size, Some(10));
        assert_eq!(weights[0].notes, None);

        let sales = repo.find_sale_logs(&batch.id).unwrap();
        assert_eq!(sales[0].revenue(), 750.0);
        assert_eq!(sales[0].birds(), 100.0);
        assert_eq!(sales[0].buyer.as_deref(), Some("Mercado"));
    }

    #[test]
    fn test_unknown_expense_category_reads_as_other() {
        let repo = repo();
        let batch = new_batch(&repo, "A");
        repo.get_conn()
            .unwrap()
            .execute(
                "INSERT INTO expense_logs (id, batch_id, category, amount, created_at) VALUES ('e1', ?1, 'gas', 12.5, ?2)",
                params![batch.id, Utc::now().to_rfc3339()],
            )
            .unwrap();

        let rows = repo.find_expense_logs(&batch.id).unwrap();
        assert_eq!(rows[0].category, ExpenseCategory::Other);
        assert_eq!(rows[0].date, None);
    }

    #[test]
    fn test_log_for_unknown_batch_violates_foreign_key() {
        let repo = repo();
        let err = repo
            .add_water(
                "missing",
                &WaterEntry {
                    date: day(3),
                    liters: 40.0,
                    notes: None,
                },
            )
            .unwrap_err();
        assert!(matches!(err, RepositoryError::ForeignKeyViolation(_)));
    }
}
