//! # Commands Module
//!
//! Handlers behind each CLI subcommand. Handlers take the loaded
//! [`ReturnService`] and return the text to print, so they can be tested
//! without a terminal.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs      ◄─── You are here (shared table helpers)
//! ├── sales.rs    ◄─── Sale listing, adjusted view, sale void
//! ├── returns.rs  ◄─── Return listing, propose/confirm, return void
//! ├── credit.rs   ◄─── Store credit per client, balances
//! ├── import.rs   ◄─── JSON import through the wire boundary
//! └── status.rs   ◄─── Database and snapshot summary
//! ```

pub mod credit;
pub mod import;
pub mod returns;
pub mod sales;
pub mod status;

use barberia_db::Database;
use tabled::builder::Builder;
use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Style, Theme};

use crate::service::ReturnService;

/// The service as the binary runs it: one database playing both roles.
pub type ConsoleService = ReturnService<Database, Database>;

/// Builds a rounded table from a header and rows, right-aligning the
/// given columns (amounts and quantities).
pub(crate) fn render_table<I, R>(header: &[&str], rows: I, numeric_columns: &[usize]) -> String
where
    I: IntoIterator<Item = R>,
    R: IntoIterator<Item = String>,
{
    let mut builder = Builder::default();
    builder.push_record(header.iter().map(|h| h.to_string()));
    for row in rows {
        builder.push_record(row);
    }

    let mut table = builder.build();
    table.with(Theme::from(Style::modern_rounded()));
    for &column in numeric_columns {
        table.modify(Columns::new(column..column + 1), Alignment::right());
    }
    table.to_string()
}

/// Printed after a change that went through when the views could not be
/// refreshed.
pub(crate) const STALE_WARNING: &str =
    "WARNING: the change was saved but the data could not be reloaded. Run the command again before acting on what is shown.\n";

/// Text for an optional value.
pub(crate) fn or_dash(value: Option<impl ToString>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
pub(crate) mod test_support {
    use barberia_core::returns::QuantityPolicy;
    use barberia_core::{
        Client, LineKind, NewReturn, PaymentMethod, Product, ReturnReason, Sale, SaleLine,
        SaleStatus, StockLevels,
    };
    use barberia_db::{Database, DbConfig};
    use chrono::{TimeZone, Utc};

    use super::ConsoleService;

    /// Sale #1 (one Cera, one month of warranty) already returned as
    /// defective by client 4.
    pub(crate) async fn console_service() -> ConsoleService {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.clients()
            .insert(&Client {
                id: 4,
                name: "Mateo Giraldo".to_string(),
                document: Some("1020304050".to_string()),
            })
            .await
            .unwrap();
        db.products()
            .insert(&Product {
                id: 7,
                name: "Cera".to_string(),
                price_cents: 2_500_000,
                stock: StockLevels { sellable: 5, supplies: 1 },
                is_active: true,
            })
            .await
            .unwrap();
        db.sales()
            .insert(&Sale {
                id: 1,
                sale_number: "V-0001".to_string(),
                client_id: 4,
                document: None,
                date: Utc.with_ymd_and_hms(2026, 9, 1, 16, 0, 0).unwrap(),
                payment_method: PaymentMethod::Cash,
                warranty_months: 1,
                discount_percent: 0,
                subtotal_cents: 2_500_000,
                tax_cents: 0,
                discount_cents: 0,
                total_cents: 2_500_000,
                status: SaleStatus::Completed,
                lines: vec![SaleLine {
                    kind: LineKind::Product,
                    item_id: Some(7),
                    name: "Cera".to_string(),
                    unit_price_cents: 2_500_000,
                    quantity: 1,
                }],
            })
            .await
            .unwrap();
        db.returns()
            .insert(&NewReturn {
                sale_id: 1,
                client_id: 4,
                product_id: 7,
                product_name: "Cera".to_string(),
                quantity: 1,
                amount_cents: 2_500_000,
                credit_cents: 2_500_000,
                reason: ReturnReason::Defective,
                reason_detail: Some("envase roto".to_string()),
                observations: None,
                user_id: Some(2),
                date: Utc.with_ymd_and_hms(2026, 9, 10, 9, 0, 0).unwrap(),
            })
            .await
            .unwrap();

        ConsoleService::load(db.clone(), db, QuantityPolicy::Outstanding)
            .await
            .unwrap()
    }
}
