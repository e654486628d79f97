//! # Seed Data Generator
//!
//! Fills a development database with a demo dairy tenant.
//!
//! ## Usage
//! ```bash
//! cargo run -p dairy-db --bin seed
//!
//! # Other tenant / database file
//! cargo run -p dairy-db --bin seed -- --tenant demo-farm --db ./data/dairy.db
//! ```
//!
//! ## Generated Data
//! - One product per (line, pack size): milk, curd, paneer, ghee, butter,
//!   cheese, buttermilk, lassi, cream
//! - SKU `{LINE}-{SIZE}`, opening stock booked through the inventory ledger
//! - One demo client with a default delivery address

use std::env;

use dairy_core::{AddressInput, AddressOwner, NewClient, NewProduct};
use dairy_db::{Database, DbConfig};
use tracing_subscriber::EnvFilter;

/// (sku code, name, product type, unit, base price in paise per base pack)
const LINES: &[(&str, &str, &str, &str, i64)] = &[
    ("MILK", "Toned Milk", "Milk", "ltr", 5600),
    ("A2MILK", "A2 Cow Milk", "Milk", "ltr", 9000),
    ("CURD", "Fresh Curd", "Curd", "kg", 7000),
    ("PANEER", "Malai Paneer", "Paneer", "kg", 42000),
    ("GHEE", "Cow Ghee", "Ghee", "kg", 65000),
    ("BUTTER", "Table Butter", "Butter", "kg", 52000),
    ("CHEESE", "Processed Cheese", "Cheese", "kg", 48000),
    ("CHAAS", "Spiced Buttermilk", "Beverage", "ltr", 3000),
    ("LASSI", "Sweet Lassi", "Beverage", "ltr", 8000),
    ("CREAM", "Fresh Cream", "Cream", "ltr", 24000),
];

/// (sku suffix, label, fraction of the base pack as numerator/1000)
const PACKS: &[(&str, &str, i64)] = &[
    ("200", "200 g/ml", 200),
    ("500", "500 g/ml", 500),
    ("1000", "1 kg/ltr", 1000),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args: Vec<String> = env::args().collect();
    let mut tenant_id = "demo-dairy".to_string();
    let mut db_path = "./data/dairy_dev.db".to_string();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--tenant" | "-t" => {
                if i + 1 < args.len() {
                    tenant_id = args[i + 1].clone();
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
                println!("Dairy Commerce Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -t, --tenant <ID>  Tenant to seed (default: demo-dairy)");
                println!("  -d, --db <PATH>    Database file path (default: ./data/dairy_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Dairy Commerce Seed Data Generator");
    println!("==================================");
    println!("Database: {}", db_path);
    println!("Tenant:   {}", tenant_id);
    println!();

    if let Some(parent) = std::path::Path::new(&db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected, migrations applied");

    let existing = db.catalog().count(&tenant_id).await?;
    if existing > 0 {
        println!("⚠ Tenant already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        return Ok(());
    }

    let start = std::time::Instant::now();
    let mut generated = 0usize;

    for (line_idx, (code, name, product_type, unit, base_price)) in LINES.iter().enumerate() {
        for (pack_idx, (suffix, label, per_mille)) in PACKS.iter().enumerate() {
            let seed = line_idx * PACKS.len() + pack_idx;
            let price_cents = base_price * per_mille / 1000;
            let input = NewProduct {
                name: format!("{} {}", name, label),
                sku: format!("{}-{}", code, suffix),
                price_cents,
                // 70-85% of price
                cost_price_cents: price_cents * (70 + (seed as i64 * 7) % 16) / 100,
                initial_quantity: 20 + (seed as i64 * 13) % 80,
                product_type: product_type.to_string(),
                unit: unit.to_string(),
            };

            match db.catalog().create_product(&tenant_id, &input, Some("seed")).await {
                Ok(_) => generated += 1,
                Err(e) => eprintln!("Failed to insert {}: {}", input.sku, e),
            }
        }
    }

    println!("✓ Generated {} products in {:?}", generated, start.elapsed());

    let client = db
        .clients()
        .create_client(
            &tenant_id,
            &NewClient {
                name: "Asha Patel".to_string(),
                email: Some("asha@example.com".to_string()),
                phone: Some("+91 98765 43210".to_string()),
            },
        )
        .await?;

    db.addresses()
        .create(
            &tenant_id,
            &AddressOwner::Client(client.id.clone()),
            &AddressInput {
                label: Some("Home".to_string()),
                name: client.name.clone(),
                phone: client.phone.clone(),
                line1: "12 Dairy Road".to_string(),
                line2: Some("Near Amul Circle".to_string()),
                city: "Anand".to_string(),
                state: Some("Gujarat".to_string()),
                postal_code: Some("388001".to_string()),
                country: Some("IN".to_string()),
                is_default: true,
            },
        )
        .await?;

    println!("✓ Demo client {} ({})", client.name, client.id);
    println!();
    println!("✓ Seed complete!");

    Ok(())
}
