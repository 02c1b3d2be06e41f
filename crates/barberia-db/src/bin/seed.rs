//! # Seed Data Generator
//!
//! Populates the database with a small barbershop for development.
//!
//! ## Usage
//! ```bash
//! cargo run -p barberia-db --bin seed
//!
//! # Specify database path
//! cargo run -p barberia-db --bin seed -- --db ./data/barberia.db
//! ```
//!
//! ## Generated Data
//! - Clients with and without a document number
//! - Over-the-counter products with stock in the sellable pool
//! - Sales mixing products and services, some inside their warranty
//!   window and some already expired

use barberia_core::{
    Client, LineKind, Money, PaymentMethod, Product, Sale, SaleLine, SaleStatus, StockLevels,
};
use barberia_db::{Database, DbConfig};
use chrono::{Duration, Utc};
use std::env;

/// (id, name, document)
const CLIENTS: &[(i64, &str, Option<&str>)] = &[
    (1, "Andrés Restrepo", Some("1017223344")),
    (2, "Camila Ortiz", Some("43876512")),
    (3, "Julián Cárdenas", None),
    (4, "Mateo Giraldo", Some("1020304050")),
    (5, "Valentina Ríos", None),
];

/// (id, name, price in pesos, sellable stock)
const PRODUCTS: &[(i64, &str, i64, i64)] = &[
    (7, "Cera", 25_000, 12),
    (8, "Shampoo anticaspa", 32_000, 8),
    (9, "Aceite para barba", 38_000, 6),
    (10, "Gel fijador", 18_000, 15),
    (11, "Navaja desechable x5", 9_000, 30),
    (12, "Bálsamo after shave", 27_000, 5),
];

/// (id, name, price in pesos)
const SERVICES: &[(i64, &str, i64)] = &[
    (1, "Corte clásico", 18_000),
    (2, "Arreglo de barba", 12_000),
    (3, "Corte + barba", 26_000),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./barberia_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Barbería Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./barberia_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Barbería Seed Data Generator");
    println!("==============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.sales().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} sales", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    for (id, name, document) in CLIENTS {
        db.clients()
            .insert(&Client {
                id: *id,
                name: name.to_string(),
                document: document.map(str::to_string),
            })
            .await?;
    }
    println!("✓ {} clients", CLIENTS.len());

    for (id, name, pesos, stock) in PRODUCTS {
        db.products()
            .insert(&Product {
                id: *id,
                name: name.to_string(),
                price_cents: Money::from_pesos(*pesos).cents(),
                stock: StockLevels {
                    sellable: *stock,
                    supplies: 0,
                },
                is_active: true,
            })
            .await?;
    }
    println!("✓ {} products", PRODUCTS.len());

    let sales = demo_sales();
    for sale in &sales {
        db.sales().insert(sale).await?;
    }
    println!("✓ {} sales", sales.len());

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

fn product_line(product_id: i64, quantity: i64) -> SaleLine {
    let (id, name, pesos, _) = PRODUCTS
        .iter()
        .copied()
        .find(|(id, ..)| *id == product_id)
        .unwrap_or(PRODUCTS[0]);
    SaleLine {
        kind: LineKind::Product,
        item_id: Some(id),
        name: name.to_string(),
        unit_price_cents: Money::from_pesos(pesos).cents(),
        quantity,
    }
}

fn service_line(service_id: i64) -> SaleLine {
    let (id, name, pesos) = SERVICES
        .iter()
        .copied()
        .find(|(id, ..)| *id == service_id)
        .unwrap_or(SERVICES[0]);
    SaleLine {
        kind: LineKind::Service,
        item_id: Some(id),
        name: name.to_string(),
        unit_price_cents: Money::from_pesos(pesos).cents(),
        quantity: 1,
    }
}

/// Builds a sale; `discount_percent` applies to the subtotal, tax is zero.
fn sale(
    id: i64,
    client_id: i64,
    days_ago: i64,
    warranty_months: u32,
    discount_percent: u32,
    payment_method: PaymentMethod,
    lines: Vec<SaleLine>,
) -> Sale {
    let subtotal: Money = lines.iter().map(SaleLine::line_total).sum();
    let discount = subtotal.percentage_of(discount_percent * 100);
    Sale {
        id,
        sale_number: format!("V-{id:04}"),
        client_id,
        document: None,
        date: Utc::now() - Duration::days(days_ago),
        payment_method,
        warranty_months,
        discount_percent,
        subtotal_cents: subtotal.cents(),
        tax_cents: 0,
        discount_cents: discount.cents(),
        total_cents: (subtotal - discount).cents(),
        status: SaleStatus::Completed,
        lines,
    }
}

fn demo_sales() -> Vec<Sale> {
    vec![
        sale(1, 4, 3, 1, 0, PaymentMethod::Cash, vec![product_line(7, 1)]),
        sale(
            2,
            1,
            10,
            3,
            10,
            PaymentMethod::Card,
            vec![product_line(8, 2), product_line(10, 1), service_line(3)],
        ),
        sale(
            3,
            2,
            20,
            1,
            0,
            PaymentMethod::Transfer,
            vec![product_line(9, 1), service_line(2)],
        ),
        // warranty already over
        sale(4, 3, 75, 1, 0, PaymentMethod::Cash, vec![product_line(12, 1), service_line(1)]),
        // services only, nothing to return
        sale(5, 5, 1, 0, 0, PaymentMethod::Cash, vec![service_line(1)]),
        sale(6, 4, 5, 2, 5, PaymentMethod::Card, vec![product_line(11, 3), product_line(7, 2)]),
    ]
}
