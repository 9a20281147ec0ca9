//! # Seed Data Generator
//!
//! Populates a database with printers and a month of quotations for
//! development and report demos.
//!
//! ## Usage
//! ```bash
//! # 60 quotations over the last 30 days (default)
//! cargo run -p morfika-db --bin seed
//!
//! # Custom amount and spread
//! cargo run -p morfika-db --bin seed -- --count 200 --days 90
//!
//! # Specify database path
//! cargo run -p morfika-db --bin seed -- --db ./data/morfika.db
//! ```
//!
//! Values are derived from the quotation index, so two runs against empty
//! databases produce the same inputs.

use chrono::{Duration, Utc};
use morfika_core::{Money, PrintPiece, PrinterConfig, Quotation};
use morfika_db::{Database, DbConfig};
use rust_decimal::Decimal;
use std::env;
use uuid::Uuid;

/// (name, watts, cost per kWh, cost per minute)
const PRINTERS: &[(&str, i64, i64, i64)] = &[
    ("Ender 3 V2", 400, 907, 25),
    ("Bambu Lab P1S", 350, 907, 40),
    ("Prusa MK4", 300, 907, 35),
];

const CLIENTS: &[&str] = &[
    "Ana Pérez",
    "Taller Norte",
    "Colegio San José",
    "Martín Díaz",
    "Estudio Lumen",
    "Valentina Ríos",
    "Club de Robótica",
    "Joaquín Soto",
];

/// (piece name, material, cost per kg, grams, minutes)
const PIECES: &[(&str, &str, i64, i64, i64)] = &[
    ("Llavero", "PLA", 70_000, 12, 35),
    ("Soporte celular", "PLA", 70_000, 50, 120),
    ("Maceta", "PETG", 85_000, 180, 420),
    ("Figura articulada", "PLA", 70_000, 95, 300),
    ("Carcasa electrónica", "PETG", 85_000, 240, 510),
    ("Busto decorativo", "PLA", 70_000, 950, 1_800),
    ("Engranaje", "ABS", 90_000, 30, 80),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 60;
    let mut days: i64 = 30;
    let mut db_path = String::from("./morfika_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(60);
                    i += 1;
                }
            }
            "--days" => {
                if i + 1 < args.len() {
                    days = args[i + 1].parse().unwrap_or(30);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Morfika Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of quotations to generate (default: 60)");
                println!("      --days <N>     Spread quotations over the last N days (default: 30)");
                println!("  -d, --db <PATH>    Database file path (default: ./morfika_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Morfika Seed Data Generator");
    println!("===========================");
    println!("Database:   {}", db_path);
    println!("Quotations: {}", count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.quotations().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} quotations", existing);
        println!("  Skipping seed to avoid duplicates.");
        return Ok(());
    }

    let mut printer_ids: Vec<Uuid> = Vec::new();
    for (name, watts, kwh, minute) in PRINTERS {
        let printer = PrinterConfig::new(
            *name,
            Decimal::from(*watts),
            Money::from_units(*kwh),
            Money::from_units(*minute),
        );
        printer_ids.push(db.printers().upsert(&printer).await?);
    }
    println!("✓ {} printers", printer_ids.len());

    let now = Utc::now();
    let span_hours = days.max(1) * 24;
    let start = std::time::Instant::now();
    let mut generated = 0;

    for index in 0..count {
        let quotation = generate_quotation(index, &printer_ids);
        let hours_ago = (index as i64 * 37) % span_hours;
        let created_at = now - Duration::hours(hours_ago);

        if let Err(e) = db.quotations().create_at(&quotation, created_at).await {
            eprintln!("Failed to insert quotation {}: {}", index, e);
            continue;
        }
        generated += 1;
    }

    println!(
        "✓ {} quotations in {:.2}s",
        generated,
        start.elapsed().as_secs_f64()
    );
    Ok(())
}

/// Builds quotation `index` with one to three pieces.
fn generate_quotation(index: usize, printer_ids: &[Uuid]) -> Quotation {
    let mut quotation = Quotation::draft(CLIENTS[index % CLIENTS.len()]);
    let piece_count = 1 + index % 3;

    for offset in 0..piece_count {
        let (name, material, per_kg, grams, minutes) = PIECES[(index + offset * 3) % PIECES.len()];
        let mut piece = PrintPiece {
            name: name.to_string(),
            material: material.to_string(),
            material_cost_per_kg: Money::from_units(per_kg),
            mass_grams: Decimal::from(grams),
            print_minutes: Decimal::from(minutes),
            // Every fifth piece has no printer assigned.
            printer_id: if (index + offset) % 5 == 0 {
                None
            } else {
                printer_ids.get((index + offset) % printer_ids.len().max(1)).copied()
            },
            ..PrintPiece::draft()
        };

        if index % 4 == 0 {
            piece.primer_cost_per_200ml = Money::from_units(12_000);
            piece.primer_consumed_ml = Decimal::from(20);
            piece.sanding_paint_cost = Money::from_units(3_000);
            piece.post_processing_minutes = Decimal::from(45);
        }

        quotation.pieces.push(piece);
    }

    quotation
}
