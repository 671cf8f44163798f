// ==========================================
// Entry builders - terse valid entries for seeding test batches
// ==========================================

use chrono::NaiveDate;
use poultry_metrics::domain::{
    BatchEntry, ExpenseCategory, ExpenseEntry, FeedEntry, MortalityEntry, SaleEntry,
    VaccinationEntry, WaterEntry, WeightEntry,
};

pub fn batch_entry(org_id: &str, name: &str, birds: f64, start_date: NaiveDate) -> BatchEntry {
    BatchEntry {
        org_id: org_id.to_string(),
        name: name.to_string(),
        initial_quantity: birds,
        start_date,
    }
}

pub fn feed(date: NaiveDate, kg: f64, cost: Option<f64>) -> FeedEntry {
    FeedEntry {
        date,
        feed_type: "Iniciarina".to_string(),
        quantity_kg: kg,
        cost,
        notes: None,
    }
}

pub fn weight_lb(date: NaiveDate, lb: f64) -> WeightEntry {
    WeightEntry {
        date,
        avg_weight_lb: lb,
        sample_size: Some(20),
        notes: None,
    }
}

pub fn deaths(date: NaiveDate, count: f64) -> MortalityEntry {
    MortalityEntry {
        date,
        count,
        cause: None,
        notes: None,
    }
}

pub fn water(date: NaiveDate, liters: f64) -> WaterEntry {
    WaterEntry {
        date,
        liters,
        notes: None,
    }
}

pub fn vaccine(date: NaiveDate, name: &str) -> VaccinationEntry {
    VaccinationEntry {
        date,
        vaccine_name: name.to_string(),
        dosage: None,
        notes: None,
    }
}

pub fn expense(category: ExpenseCategory, amount: f64) -> ExpenseEntry {
    ExpenseEntry {
        date: None,
        category: Some(category),
        amount,
        description: None,
        notes: None,
    }
}

pub fn sale(date: NaiveDate, birds: f64, revenue: f64) -> SaleEntry {
    SaleEntry {
        date,
        quantity_birds: birds,
        total_weight_lb: None,
        price_per_lb: None,
        total_revenue: Some(revenue),
        buyer: None,
        notes: None,
    }
}
