// ==========================================
// Poultry Metrics - log records
// ==========================================
// One struct per log table. Every row carries batch_id, a calendar
// date and created_at; quantities are stored in metric units.
// ==========================================

use crate::domain::types::ExpenseCategory;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Feed delivered to the house
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedLog {
    pub id: String,
    pub batch_id: String,
    pub date: NaiveDate,
    pub feed_type: String,
    pub quantity_kg: f64,
    pub cost: Option<f64>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Sampled average bird weight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightLog {
    pub id: String,
    pub batch_id: String,
    pub date: NaiveDate,
    pub avg_weight_kg: f64,
    pub sample_size: Option<u32>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Deaths recorded on a day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MortalityLog {
    pub id: String,
    pub batch_id: String,
    pub date: NaiveDate,
    #[serde(alias = "quantity")]
    pub count: f64,
    pub cause: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterLog {
    pub id: String,
    pub batch_id: String,
    pub date: NaiveDate,
    pub liters: f64,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VaccinationLog {
    pub id: String,
    pub batch_id: String,
    pub date: NaiveDate,
    pub vaccine_name: String,
    pub dosage: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Money spent on the batch; the date is optional on older rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseLog {
    pub id: String,
    pub batch_id: String,
    pub date: Option<NaiveDate>,
    pub category: ExpenseCategory,
    pub amount: f64,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Birds sold
///
/// Older rows carry `quantity` / `total_amount` instead of
/// `quantity_birds` / `total_revenue`; read them through
/// [`SaleLog::birds`] and [`SaleLog::revenue`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleLog {
    pub id: String,
    pub batch_id: String,
    pub date: NaiveDate,
    pub quantity_birds: Option<f64>,
    pub quantity: Option<f64>,
    pub total_weight_kg: Option<f64>,
    pub price_per_kg: Option<f64>,
    pub total_revenue: Option<f64>,
    pub total_amount: Option<f64>,
    pub buyer: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl SaleLog {
    /// total_revenue → total_amount → 0
    pub fn revenue(&self) -> f64 {
        self.total_revenue.or(self.total_amount).unwrap_or(0.0)
    }

    /// quantity_birds → quantity → 0
    pub fn birds(&self) -> f64 {
        self.quantity_birds.or(self.quantity).unwrap_or(0.0)
    }
}

// ==========================================
// BatchLogs - everything logged for one batch
// ==========================================
// Each collection is always present; a missing category is empty
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchLogs {
    pub feed: Vec<FeedLog>,
    pub weight: Vec<WeightLog>,
    pub mortality: Vec<MortalityLog>,
    pub water: Vec<WaterLog>,
    pub vaccination: Vec<VaccinationLog>,
    pub expense: Vec<ExpenseLog>,
    pub sale: Vec<SaleLog>,
}

impl BatchLogs {
    pub fn is_empty(&self) -> bool {
        self.feed.is_empty()
            && self.weight.is_empty()
            && self.mortality.is_empty()
            && self.water.is_empty()
            && self.vaccination.is_empty()
            && self.expense.is_empty()
            && self.sale.is_empty()
    }

    /// Most recent weight sample: greatest (date, created_at)
    pub fn latest_weight(&self) -> Option<&WeightLog> {
        self.weight
            .iter()
            .max_by(|a, b| (a.date, a.created_at).cmp(&(b.date, b.created_at)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sale(total_revenue: Option<f64>, total_amount: Option<f64>) -> SaleLog {
        SaleLog {
            id: "s1".to_string(),
            batch_id: "b1".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
            quantity_birds: None,
            quantity: Some(40.0),
            total_weight_kg: None,
            price_per_kg: None,
            total_revenue,
            total_amount,
            buyer: None,
            notes: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_sale_revenue_fallback() {
        assert_eq!(sale(Some(100.0), Some(50.0)).revenue(), 100.0);
        assert_eq!(sale(None, Some(50.0)).revenue(), 50.0);
        assert_eq!(sale(None, None).revenue(), 0.0);
        assert_eq!(sale(None, None).birds(), 40.0);
    }

    #[test]
    fn test_latest_weight_orders_by_date_then_created_at() {
        let w = |id: &str, day: u32, hour: u32| WeightLog {
            id: id.to_string(),
            batch_id: "b1".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 1, day).unwrap(),
            avg_weight_kg: 1.0,
            sample_size: None,
            notes: None,
            created_at: Utc.with_ymd_and_hms(2025, 1, 20, hour, 0, 0).unwrap(),
        };
        let logs = BatchLogs {
            weight: vec![w("a", 10, 9), w("b", 12, 8), w("c", 12, 7)],
            ..Default::default()
        };
        assert_eq!(logs.latest_weight().map(|l| l.id.as_str()), Some("b"));
        assert!(BatchLogs::default().latest_weight().is_none());
    }

    #[test]
    fn test_mortality_quantity_alias() {
        let json = r#"{"id":"m1","batch_id":"b1","date":"2025-01-15","quantity":3,
            "cause":null,"notes":null,"created_at":"2025-01-15T10:00:00Z"}"#;
        let log: MortalityLog = serde_json::from_str(json).unwrap();
        assert_eq!(log.count, 3.0);
    }
}
