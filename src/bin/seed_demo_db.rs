// ==========================================
// Demo database: two active batches and one closed batch with
// a few weeks of logs each
// ==========================================
// Usage: seed_demo_db [db_path] [org_id]
// An existing file is backed up to <db_path>.bak.<timestamp> first.
// ==========================================

use anyhow::Context;
use chrono::{Duration, Local, NaiveDate};
use poultry_metrics::db::default_db_path;
use poultry_metrics::domain::{
    BatchEntry, ExpenseCategory, ExpenseEntry, FeedEntry, LogCategory, MortalityEntry, SaleEntry,
    VaccinationEntry, WaterEntry, WeightEntry,
};
use poultry_metrics::logging;
use poultry_metrics::repository::SqliteLogRepository;
use rusqlite::Connection;
use std::fs;
use std::path::Path;

const DEFAULT_ORG_ID: &str = "default";

struct DemoBatch {
    name: &'static str,
    birds: f64,
    age_days: i64,
    closed_after: Option<i64>,
}

const DEMO_BATCHES: [DemoBatch; 3] = [
    DemoBatch {
        name: "Lote Enero",
        birds: 500.0,
        age_days: 60,
        closed_after: Some(45),
    },
    DemoBatch {
        name: "Lote Marzo",
        birds: 800.0,
        age_days: 30,
        closed_after: None,
    },
    DemoBatch {
        name: "Lote Abril",
        birds: 300.0,
        age_days: 12,
        closed_after: None,
    },
];

fn main() -> anyhow::Result<()> {
    logging::init();

    let mut args = std::env::args().skip(1);
    let db_path = args.next().unwrap_or_else(default_db_path);
    let org_id = args.next().unwrap_or_else(|| DEFAULT_ORG_ID.to_string());

    backup_and_reset_db(&db_path)?;
    let repo = SqliteLogRepository::new(&db_path)?;

    let today = Local::now().date_naive();
    for demo in &DEMO_BATCHES {
        seed_batch(&repo, &org_id, demo, today)
            .with_context(|| format!("seeding {}", demo.name))?;
    }

    print_quick_counts(&db_path)?;
    Ok(())
}

fn backup_and_reset_db(db_path: &str) -> anyhow::Result<()> {
    let path = Path::new(db_path);
    if !path.exists() {
        return Ok(());
    }

    let ts = Local::now().format("%Y%m%d_%H%M%S").to_string();
    let backup_path = format!("{}.bak.{}", db_path, ts);
    fs::copy(path, &backup_path)?;
    fs::remove_file(path)?;

    eprintln!("Backed up {} -> {}", db_path, backup_path);
    Ok(())
}

fn seed_batch(
    repo: &SqliteLogRepository,
    org_id: &str,
    demo: &DemoBatch,
    today: NaiveDate,
) -> anyhow::Result<()> {
    let start = today - Duration::days(demo.age_days);
    let batch = repo.create_batch(&BatchEntry {
        org_id: org_id.to_string(),
        name: demo.name.to_string(),
        initial_quantity: demo.birds,
        start_date: start,
    })?;
    let id = batch.id.as_str();
    let last_day = demo.closed_after.unwrap_or(demo.age_days);

    repo.add_expense(
        id,
        &ExpenseEntry {
            date: Some(start),
            category: Some(ExpenseCategory::Chicks),
            amount: demo.birds * 0.9,
            description: Some("Pollitos de un día".to_string()),
            notes: None,
        },
    )?;
    repo.add_vaccination(
        id,
        &VaccinationEntry {
            date: start + Duration::days(7),
            vaccine_name: "Newcastle".to_string(),
            dosage: Some("1 gota ocular".to_string()),
            notes: None,
        },
    )?;

    let mut week = 0;
    let mut day = 0;
    while day <= last_day {
        let date = start + Duration::days(day);
        // weekly consumption grows roughly with the standard plan
        let feed_kg = demo.birds * (0.2 + 0.15 * week as f64);
        repo.add_feed(
            id,
            &FeedEntry {
                date,
                feed_type: if week < 3 { "Iniciarina" } else { "Engordina" }.to_string(),
                quantity_kg: feed_kg,
                cost: Some((feed_kg * 0.6 * 100.0).round() / 100.0),
                notes: None,
            },
        )?;
        repo.add_water(
            id,
            &WaterEntry {
                date,
                liters: feed_kg * 1.8,
                notes: None,
            },
        )?;
        repo.add_weight(
            id,
            &WeightEntry {
                date,
                avg_weight_lb: 0.1 + 0.75 * (week + 1) as f64,
                sample_size: None,
                notes: None,
            },
        )?;
        repo.add_mortality(
            id,
            &MortalityEntry {
                date,
                count: (demo.birds * 0.005).ceil(),
                cause: Some("Natural".to_string()),
                notes: None,
            },
        )?;
        week += 1;
        day += 7;
    }

    if let Some(closed_after) = demo.closed_after {
        let end = start + Duration::days(closed_after);
        repo.add_sale(
            id,
            &SaleEntry {
                date: end,
                quantity_birds: demo.birds * 0.9,
                total_weight_lb: Some(demo.birds * 0.9 * 5.5),
                price_per_lb: Some(1.1),
                total_revenue: None,
                buyer: Some("Mercado Oriental".to_string()),
                notes: None,
            },
        )?;
        repo.close_batch(id, end)?;
    }

    eprintln!("Seeded {} ({} birds, started {})", demo.name, demo.birds, start);
    Ok(())
}

fn print_quick_counts(db_path: &str) -> anyhow::Result<()> {
    let conn = Connection::open(db_path)?;

    eprintln!("Row counts:");
    let batches: i64 = conn.query_row("SELECT COUNT(*) FROM batches", [], |row| row.get(0))?;
    eprintln!("  {:<18} {}", "batches", batches);
    for category in LogCategory::ALL {
        let sql = format!("SELECT COUNT(*) FROM {}", category.table_name());
        let n: i64 = conn.query_row(&sql, [], |row| row.get(0))?;
        eprintln!("  {:<18} {}", category.table_name(), n);
    }
    Ok(())
}
