// ==========================================
// Poultry Metrics - entry forms
// ==========================================
// Values typed into the log screens, before persistence.
// validate() rejects what the screens reject; the repository stores
// only validated entries. Messages are user-facing (Spanish).
// ==========================================

use crate::calc::units::LB_TO_KG;
use crate::domain::types::ExpenseCategory;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sample size assumed when the weigher leaves it blank
pub const DEFAULT_SAMPLE_SIZE: u32 = 10;

// ==========================================
// EntryError
// ==========================================
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EntryError {
    #[error("Ingresa el nombre del lote")]
    MissingBatchName,

    #[error("Ingresa una cantidad inicial válida")]
    InvalidInitialQuantity,

    #[error("Ingresa una cantidad válida")]
    InvalidQuantity,

    #[error("Ingresa un peso promedio válido")]
    InvalidWeight,

    #[error("Ingresa una cantidad de agua válida")]
    InvalidWater,

    #[error("Ingresa el nombre de la vacuna")]
    MissingVaccineName,

    #[error("Selecciona una categoría")]
    MissingCategory,

    #[error("Ingresa un monto válido")]
    InvalidAmount,

    #[error("Ingresa la cantidad de aves vendidas")]
    MissingSaleBirds,

    #[error("Ingresa el ingreso total")]
    MissingRevenue,
}

pub type EntryResult<T> = Result<T, EntryError>;

/// Finite and strictly positive
fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

fn positive_or(value: f64, err: EntryError) -> EntryResult<()> {
    if is_positive(value) {
        Ok(())
    } else {
        Err(err)
    }
}

/// Blank optional text becomes `None`
pub fn non_blank(text: &Option<String>) -> Option<String> {
    text.as_ref()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

// ==========================================
// New batch
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchEntry {
    pub org_id: String,
    pub name: String,
    pub initial_quantity: f64,
    pub start_date: NaiveDate,
}

impl BatchEntry {
    pub fn validate(&self) -> EntryResult<()> {
        if self.name.trim().is_empty() {
            return Err(EntryError::MissingBatchName);
        }
        positive_or(self.initial_quantity, EntryError::InvalidInitialQuantity)
    }
}

// ==========================================
// Per-category log entries
// ==========================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedEntry {
    pub date: NaiveDate,
    pub feed_type: String,
    pub quantity_kg: f64,
    pub cost: Option<f64>,
    pub notes: Option<String>,
}

impl FeedEntry {
    pub fn validate(&self) -> EntryResult<()> {
        positive_or(self.quantity_kg, EntryError::InvalidQuantity)
    }
}

/// Weight is typed in pounds and stored in kilograms
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightEntry {
    pub date: NaiveDate,
    pub avg_weight_lb: f64,
    pub sample_size: Option<u32>,
    pub notes: Option<String>,
}

impl WeightEntry {
    pub fn validate(&self) -> EntryResult<()> {
        positive_or(self.avg_weight_lb, EntryError::InvalidWeight)
    }

    pub fn avg_weight_kg(&self) -> f64 {
        self.avg_weight_lb * LB_TO_KG
    }

    pub fn sample_size_or_default(&self) -> u32 {
        self.sample_size
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_SAMPLE_SIZE)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MortalityEntry {
    pub date: NaiveDate,
    pub count: f64,
    pub cause: Option<String>,
    pub notes: Option<String>,
}

impl MortalityEntry {
    pub fn validate(&self) -> EntryResult<()> {
        positive_or(self.count, EntryError::InvalidQuantity)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaterEntry {
    pub date: NaiveDate,
    pub liters: f64,
    pub notes: Option<String>,
}

impl WaterEntry {
    pub fn validate(&self) -> EntryResult<()> {
        positive_or(self.liters, EntryError::InvalidWater)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaccinationEntry {
    pub date: NaiveDate,
    pub vaccine_name: String,
    pub dosage: Option<String>,
    pub notes: Option<String>,
}

impl VaccinationEntry {
    pub fn validate(&self) -> EntryResult<()> {
        if self.vaccine_name.trim().is_empty() {
            return Err(EntryError::MissingVaccineName);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseEntry {
    pub date: Option<NaiveDate>,
    pub category: Option<ExpenseCategory>,
    pub amount: f64,
    pub description: Option<String>,
    pub notes: Option<String>,
}

impl ExpenseEntry {
    pub fn validate(&self) -> EntryResult<()> {
        if self.category.is_none() {
            return Err(EntryError::MissingCategory);
        }
        positive_or(self.amount, EntryError::InvalidAmount)
    }
}

/// Sale as typed: weight in lb, price per lb
///
/// When no total is typed it is derived from weight × price, rounded to
/// cents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleEntry {
    pub date: NaiveDate,
    pub quantity_birds: f64,
    pub total_weight_lb: Option<f64>,
    pub price_per_lb: Option<f64>,
    pub total_revenue: Option<f64>,
    pub buyer: Option<String>,
    pub notes: Option<String>,
}

impl SaleEntry {
    pub fn validate(&self) -> EntryResult<()> {
        positive_or(self.quantity_birds, EntryError::MissingSaleBirds)?;
        match self.revenue() {
            Some(r) if is_positive(r) => Ok(()),
            _ => Err(EntryError::MissingRevenue),
        }
    }

    /// Typed total, else weight × price (2 decimals)
    pub fn revenue(&self) -> Option<f64> {
        if let Some(total) = self.total_revenue.filter(|v| v.is_finite()) {
            return Some(total);
        }
        match (self.total_weight_lb, self.price_per_lb) {
            (Some(w), Some(p)) if is_positive(w) && is_positive(p) => {
                Some((w * p * 100.0).round() / 100.0)
            }
            _ => None,
        }
    }

    pub fn total_weight_kg(&self) -> Option<f64> {
        self.total_weight_lb
            .filter(|w| is_positive(*w))
            .map(|w| w * LB_TO_KG)
    }

    pub fn price_per_kg(&self) -> Option<f64> {
        self.price_per_lb
            .filter(|p| is_positive(*p))
            .map(|p| p / LB_TO_KG)
    }
}
