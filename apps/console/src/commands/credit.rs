//! # Store Credit Commands

use barberia_core::Money;

use super::{render_table, ConsoleService};
use crate::state::ConsoleConfig;

/// One client's saldo a favor, and how much of it a sale could use.
pub fn show_credit(
    service: &ConsoleService,
    config: &ConsoleConfig,
    client_id: i64,
    sale_total: Option<Money>,
) -> String {
    let summary = service.client_credit(client_id, sale_total);

    let mut out = format!(
        "{} (client {})\nStore credit: {}\n",
        summary.client_name,
        summary.client_id,
        config.format_currency(summary.balance.cents()),
    );
    match (summary.applicable, sale_total) {
        (Some(applicable), Some(total)) if summary.offers_credit => out.push_str(&format!(
            "Usable on a {} sale: {}\n",
            config.format_currency(total.cents()),
            config.format_currency(applicable.cents()),
        )),
        _ if !summary.offers_credit => out.push_str("No store credit to offer at checkout.\n"),
        _ => {}
    }
    out
}

/// Every client holding store credit.
pub fn list_balances(service: &ConsoleService, config: &ConsoleConfig) -> String {
    let balances = service.client_balances();
    if balances.is_empty() {
        return "No client holds store credit.".to_string();
    }

    let total: Money = balances.iter().map(|b| b.balance).sum();
    let table = render_table(
        &["Client", "Name", "Store credit"],
        balances.iter().map(|b| {
            vec![
                b.client_id.to_string(),
                b.client_name.clone(),
                config.format_currency(b.balance.cents()),
            ]
        }),
        &[2],
    );
    format!("{table}\nOutstanding store credit: {}\n", config.format_currency(total.cents()))
}
