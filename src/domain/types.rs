// ==========================================
// Poultry Metrics - domain enums
// ==========================================
// Serialized forms match the stored column values
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// Batch status
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchStatus {
    #[default]
    Active, // birds in the house
    Completed, // closed out
}

impl BatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchStatus::Active => "active",
            BatchStatus::Completed => "completed",
        }
    }

    /// Unknown values read as `Active`
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "completed" => BatchStatus::Completed,
            _ => BatchStatus::Active,
        }
    }
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// Expense category
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseCategory {
    Chicks,    // day-old chicks
    Feed,      // feed bought outside the feed log
    Medicine,  // medicine / vaccines
    Labor,     // wages
    Utilities, // power, water, gas
    #[serde(other)]
    Other,
}

impl ExpenseCategory {
    /// Display order
    pub const ALL: [ExpenseCategory; 6] = [
        ExpenseCategory::Chicks,
        ExpenseCategory::Feed,
        ExpenseCategory::Medicine,
        ExpenseCategory::Labor,
        ExpenseCategory::Utilities,
        ExpenseCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseCategory::Chicks => "chicks",
            ExpenseCategory::Feed => "feed",
            ExpenseCategory::Medicine => "medicine",
            ExpenseCategory::Labor => "labor",
            ExpenseCategory::Utilities => "utilities",
            ExpenseCategory::Other => "other",
        }
    }

    /// Unknown categories map to `Other`
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "chicks" => ExpenseCategory::Chicks,
            "feed" => ExpenseCategory::Feed,
            "medicine" => ExpenseCategory::Medicine,
            "labor" => ExpenseCategory::Labor,
            "utilities" => ExpenseCategory::Utilities,
            _ => ExpenseCategory::Other,
        }
    }

    /// i18n key of the display label
    pub fn label_key(&self) -> String {
        format!("expense_category.{}", self.as_str())
    }
}

impl fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// Log category
// ==========================================
// One per row-fetch read; also names the backing table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogCategory {
    Feed,
    Weight,
    Mortality,
    Water,
    Vaccination,
    Expense,
    Sale,
}

impl LogCategory {
    pub const ALL: [LogCategory; 7] = [
        LogCategory::Feed,
        LogCategory::Weight,
        LogCategory::Mortality,
        LogCategory::Water,
        LogCategory::Vaccination,
        LogCategory::Expense,
        LogCategory::Sale,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogCategory::Feed => "feed",
            LogCategory::Weight => "weight",
            LogCategory::Mortality => "mortality",
            LogCategory::Water => "water",
            LogCategory::Vaccination => "vaccination",
            LogCategory::Expense => "expense",
            LogCategory::Sale => "sale",
        }
    }

    pub fn table_name(&self) -> &'static str {
        match self {
            LogCategory::Feed => "feed_logs",
            LogCategory::Weight => "weight_logs",
            LogCategory::Mortality => "mortality_logs",
            LogCategory::Water => "water_logs",
            LogCategory::Vaccination => "vaccination_logs",
            LogCategory::Expense => "expense_logs",
            LogCategory::Sale => "sales_logs",
        }
    }
}

impl fmt::Display for LogCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// Finance period
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinancePeriod {
    #[default]
    Month, // since the 1st of this month
    ThreeMonths, // since the 1st of the month two months back
    Year,        // since January 1
    All,         // no cutoff
}

impl FinancePeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            FinancePeriod::Month => "month",
            FinancePeriod::ThreeMonths => "three_months",
            FinancePeriod::Year => "year",
            FinancePeriod::All => "all",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "month" => Some(FinancePeriod::Month),
            "three_months" | "3months" => Some(FinancePeriod::ThreeMonths),
            "year" => Some(FinancePeriod::Year),
            "all" => Some(FinancePeriod::All),
            _ => None,
        }
    }

    pub fn label_key(&self) -> String {
        format!("period.{}", self.as_str())
    }
}

impl fmt::Display for FinancePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
