//! # Seed Data Generator
//!
//! Populates the database with a demo grocery catalog for development.
//!
//! ## Usage
//! ```bash
//! # Seed the default database with the full demo catalog
//! cargo run -p grocery-db --bin seed
//!
//! # Only the first N products
//! cargo run -p grocery-db --bin seed -- --count 20
//!
//! # Specify database path
//! cargo run -p grocery-db --bin seed -- --db ./data/grocery.db
//! ```
//!
//! ## What Gets Created
//! - Products across aisles, code `{AISLE}-{NNN}`, prices in rupees/cents
//! - The current month's bill counter (left at its value if it exists)

use chrono::Local;
use std::env;

use grocery_core::types::Quantity;
use grocery_core::{BillPrefix, Money};
use grocery_db::migrations::migration_status;
use grocery_db::{Database, DbConfig};

/// Demo catalog: aisle code and (name, price in cents) pairs.
const AISLES: &[(&str, &[(&str, i64)])] = &[
    (
        "GRO",
        &[
            ("Basmati Rice 5kg", 2_450_00),
            ("Red Lentils 1kg", 420_00),
            ("Wheat Flour 1kg", 230_00),
            ("White Sugar 1kg", 310_00),
            ("Table Salt 400g", 95_00),
            ("Coconut Oil 750ml", 890_00),
            ("Ceylon Tea 200g", 540_00),
            ("Instant Noodles", 120_00),
        ],
    ),
    (
        "DRY",
        &[
            ("Fresh Milk 1L", 480_00),
            ("Milk Powder 400g", 1_150_00),
            ("Butter 200g", 760_00),
            ("Cheddar Cheese 200g", 1_290_00),
            ("Set Yoghurt", 110_00),
            ("Eggs x10", 550_00),
        ],
    ),
    (
        "PRD",
        &[
            ("Bananas 1kg", 260_00),
            ("Red Onions 1kg", 380_00),
            ("Potatoes 1kg", 340_00),
            ("Carrots 500g", 210_00),
            ("Tomatoes 500g", 240_00),
            ("Limes 250g", 150_00),
        ],
    ),
    (
        "BEV",
        &[
            ("Mineral Water 1.5L", 130_00),
            ("Orange Juice 1L", 690_00),
            ("Ginger Beer 400ml", 180_00),
            ("Instant Coffee 100g", 980_00),
        ],
    ),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut count: usize = usize::MAX;
    let mut db_path = String::from("./grocery.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = match parse_count(&args[i + 1]) {
                        Ok(n) => n,
                        Err(e) => {
                            eprintln!("Error: {}", e);
                            eprintln!("Run with --help for usage.");
                            std::process::exit(2);
                        }
                    };
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
                println!("Grocery POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to create (default: all)");
                println!("  -d, --db <PATH>    Database file path (default: ./grocery.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Grocery POS Seed Data Generator");
    println!("===============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    let (total, applied) = migration_status(db.pool()).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied ({}/{})", applied, total);

    // Current month's counter
    let prefix = BillPrefix::from_date(Local::now().date_naive());
    let counter = db.counters().find_or_create(&prefix).await?;
    println!(
        "✓ Bill counter {} ready (last number {})",
        counter.prefix, counter.last_number
    );

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping catalog seed to avoid duplicates.");
        return Ok(());
    }

    println!();
    println!("Creating products...");

    let mut created = 0;
    'aisles: for (aisle, products) in AISLES {
        for (idx, (name, price_cents)) in products.iter().enumerate() {
            if created >= count {
                break 'aisles;
            }

            let code = format!("{}-{:03}", aisle, idx + 1);
            let stock = Quantity::from_hundredths(((idx as i64 * 7) % 50 + 10) * 100);

            if let Err(e) = db
                .products()
                .insert(&code, name, Money::from_cents(*price_cents), stock)
                .await
            {
                eprintln!("Failed to insert {}: {}", code, e);
                continue;
            }

            created += 1;
        }
    }

    println!("✓ Created {} products", created);
    println!();
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}

/// Parses the `--count` value; anything but a whole number is an error.
fn parse_count(raw: &str) -> Result<usize, String> {
    raw.trim()
        .parse()
        .map_err(|_| format!("invalid --count value '{}', expected a whole number", raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count("20"), Ok(20));
        assert_eq!(parse_count(" 5 "), Ok(5));
        assert!(parse_count("abc").is_err());
        assert!(parse_count("-1").is_err());
        assert!(parse_count("").is_err());
    }
}
