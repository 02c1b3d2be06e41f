//! # Repository Module
//!
//! Database repository implementations for the console.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ReturnService                                                         │
//! │       │                                                                 │
//! │       │  db.returns().insert(&new_return)                              │
//! │       ▼                                                                 │
//! │  ReturnRepository                                                      │
//! │  ├── list(&self)                                                       │
//! │  ├── get_by_id(&self, id)                                              │
//! │  ├── insert(&self, new_return)                                         │
//! │  └── mark_voided(&self, id)                                            │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rows are mapped by hand from `SqliteRow`; status and reason columns are
//! parsed back through the domain types so a bad code surfaces as
//! [`DbError::InvalidValue`](crate::DbError::InvalidValue).
//!
//! ## Available Repositories
//!
//! - [`ClientRepository`](client::ClientRepository) - Clients
//! - [`ProductRepository`](product::ProductRepository) - Products and the two stock pools
//! - [`SaleRepository`](sale::SaleRepository) - Sales with their line items
//! - [`ReturnRepository`](returns::ReturnRepository) - The returns ledger

pub mod client;
pub mod product;
pub mod returns;
pub mod sale;

#[cfg(test)]
pub(crate) mod fixtures {
    use barberia_core::{LineKind, PaymentMethod, Sale, SaleLine, SaleStatus};
    use chrono::{TimeZone, Utc};

    use crate::{Database, DbConfig};

    pub async fn memory_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    /// Sale #1 from the front desk: one Cera and a haircut.
    pub fn cera_sale(id: i64) -> Sale {
        Sale {
            id,
            sale_number: format!("V-{id:04}"),
            client_id: 4,
            document: Some("1020304050".to_string()),
            date: Utc.with_ymd_and_hms(2026, 9, 1, 16, 0, 0).unwrap(),
            payment_method: PaymentMethod::Cash,
            warranty_months: 1,
            discount_percent: 0,
            subtotal_cents: 4_300_000,
            tax_cents: 0,
            discount_cents: 0,
            total_cents: 4_300_000,
            status: SaleStatus::Completed,
            lines: vec![
                SaleLine {
                    kind: LineKind::Product,
                    item_id: Some(7),
                    name: "Cera".to_string(),
                    unit_price_cents: 2_500_000,
                    quantity: 1,
                },
                SaleLine {
                    kind: LineKind::Service,
                    item_id: Some(3),
                    name: "Corte clásico".to_string(),
                    unit_price_cents: 1_800_000,
                    quantity: 1,
                },
            ],
        }
    }
}
