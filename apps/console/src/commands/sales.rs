//! # Sale Commands

use barberia_core::reconcile::{active_returns_for, reconcile};
use barberia_core::Money;
use tracing::debug;

use super::{or_dash, render_table, ConsoleService, STALE_WARNING};
use crate::error::ApiResult;
use crate::state::ConsoleConfig;

/// Sales table, newest first, with the adjusted total next to the original.
pub fn list_sales(service: &ConsoleService, config: &ConsoleConfig, client: Option<i64>) -> String {
    let snapshot = service.snapshot();
    let rows: Vec<Vec<String>> = snapshot
        .sales
        .iter()
        .filter(|s| client.map_or(true, |id| s.client_id == id))
        .map(|sale| {
            let view = reconcile(sale, &snapshot.returns);
            vec![
                sale.id.to_string(),
                sale.sale_number.clone(),
                sale.date.format("%Y-%m-%d").to_string(),
                snapshot.client_name(sale.client_id),
                config.format_currency(sale.total_cents),
                config.format_currency(view.adjusted_total_cents),
                active_returns_for(sale, &snapshot.returns).count().to_string(),
                or_dash(sale.warranty_expires_at().map(|d| d.format("%Y-%m-%d"))),
                sale.status.to_string(),
            ]
        })
        .collect();

    debug!(rows = rows.len(), "Rendering sales");
    if rows.is_empty() {
        return "No sales found.".to_string();
    }

    render_table(
        &[
            "ID", "Number", "Date", "Client", "Total", "Adjusted", "Returns", "Warranty", "Status",
        ],
        rows,
        &[4, 5, 6],
    )
}

/// One sale, line by line, as it stands after its returns.
pub fn show_sale(service: &ConsoleService, config: &ConsoleConfig, sale_id: i64) -> ApiResult<String> {
    let snapshot = service.snapshot();
    let view = service.reconcile_sale(sale_id)?;
    let Some(sale) = snapshot.sales.iter().find(|s| s.id == sale_id) else {
        return Ok(String::new());
    };

    let lines = view.lines.iter().map(|l| {
        vec![
            l.line.name.clone(),
            l.line.kind.code().to_string(),
            l.line.quantity.to_string(),
            l.returned_quantity.to_string(),
            l.adjusted_quantity.to_string(),
            config.format_currency(l.line.unit_price_cents),
            config.format_currency(l.adjusted_total_cents),
        ]
    });

    let mut out = format!(
        "Sale {} ({}) · {} · {}\nClient: {}\nWarranty: {}\n\n",
        sale.sale_number,
        sale.id,
        sale.date.format("%Y-%m-%d %H:%M"),
        sale.status,
        snapshot.client_name(sale.client_id),
        match sale.warranty_expires_at() {
            Some(expires) => format!("until {}", expires.format("%Y-%m-%d %H:%M")),
            None => "none".to_string(),
        },
    );
    out.push_str(&render_table(
        &["Item", "Kind", "Sold", "Returned", "Kept", "Unit price", "Adjusted"],
        lines,
        &[2, 3, 4, 5, 6],
    ));

    let discount = sale.discount();
    out.push_str(&format!(
        "\nSubtotal  {} → {}\nDiscount  {}\nTotal     {} → {}\n",
        config.format_currency(sale.subtotal_cents),
        config.format_currency(view.adjusted_subtotal_cents),
        config.format_currency(discount.cents()),
        config.format_currency(sale.total_cents),
        config.format_currency(view.adjusted_total_cents),
    ));
    if view.has_returns {
        let credited: Money = active_returns_for(sale, &snapshot.returns)
            .filter(|r| r.status.generates_credit())
            .map(|r| r.credit())
            .sum();
        out.push_str(&format!("Credited  {}\n", config.format_currency(credited.cents())));
    }

    Ok(out)
}

/// Voids a sale and reports it.
pub async fn void_sale(service: &mut ConsoleService, sale_id: i64) -> ApiResult<String> {
    let outcome = service.void_sale(sale_id).await?;
    let mut out = format!("Sale {} voided.\n", outcome.sale_id);
    if outcome.snapshot_stale {
        out.push_str(STALE_WARNING);
    }
    Ok(out)
}
