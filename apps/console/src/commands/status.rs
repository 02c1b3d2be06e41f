//! # Status Command

use barberia_core::credit::balances_by_client;
use barberia_core::returns::QuantityPolicy;
use barberia_core::{Money, ReturnStatus, SaleStatus};
use barberia_db::migrations::migration_status;
use barberia_db::Database;

use super::{render_table, ConsoleService};
use crate::error::ApiResult;
use crate::state::ConsoleConfig;

/// Database health, migrations and snapshot totals.
pub async fn show_status(
    db: &Database,
    service: &ConsoleService,
    config: &ConsoleConfig,
) -> ApiResult<String> {
    let healthy = db.health_check().await;
    let (total, applied) = migration_status(db.pool()).await?;
    let snapshot = service.snapshot();

    let count_sales = |status: SaleStatus| snapshot.sales.iter().filter(|s| s.status == status).count();
    let count_returns =
        |status: ReturnStatus| snapshot.returns.iter().filter(|r| r.status == status).count();
    let outstanding: Money = balances_by_client(&snapshot.returns).into_values().sum();

    let rows = vec![
        vec!["Database".to_string(), config.database_path.display().to_string()],
        vec!["Health".to_string(), if healthy { "ok" } else { "unreachable" }.to_string()],
        vec!["Migrations".to_string(), format!("{applied}/{total} applied")],
        vec![
            "Sales".to_string(),
            format!(
                "{} completed, {} voided",
                count_sales(SaleStatus::Completed),
                count_sales(SaleStatus::Voided)
            ),
        ],
        vec![
            "Returns".to_string(),
            format!(
                "{} completed, {} voided, {} pending, {} processed",
                count_returns(ReturnStatus::Completed),
                count_returns(ReturnStatus::Voided),
                count_returns(ReturnStatus::Pending),
                count_returns(ReturnStatus::Processed)
            ),
        ],
        vec!["Clients".to_string(), snapshot.clients.len().to_string()],
        vec!["Products".to_string(), snapshot.products.len().to_string()],
        vec![
            "Store credit".to_string(),
            config.format_currency(outstanding.cents()),
        ],
        vec![
            "Quantity check".to_string(),
            match service.policy() {
                QuantityPolicy::Outstanding => "outstanding units",
                QuantityPolicy::SoldQuantity => "sold quantity",
            }
            .to_string(),
        ],
    ];

    Ok(render_table(&["", ""], rows, &[]))
}
