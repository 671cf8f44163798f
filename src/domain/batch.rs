// ==========================================
// Poultry Metrics - batch (flock)
// ==========================================

use crate::domain::types::BatchStatus;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// Batch - one flock raised together
// ==========================================
// Mirrors the `batches` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    pub id: String,
    pub org_id: String,
    pub name: String,
    pub initial_quantity: f64,       // birds placed
    pub start_date: NaiveDate,       // placement day
    pub end_date: Option<NaiveDate>, // set when completed
    pub status: BatchStatus,
    pub created_at: DateTime<Utc>,
}

impl Batch {
    pub fn is_active(&self) -> bool {
        self.status == BatchStatus::Active
    }
}
