//! # Configuration State
//!
//! Console configuration loaded at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Command line flags (`--db`, `--sold-quantity-ceiling`)
//! 2. Environment variables (`BARBERIA_*`)
//! 3. Defaults (this file)
//!
//! Configuration is read-only after startup.

use barberia_core::returns::QuantityPolicy;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const DB_FILE_NAME: &str = "barberia.db";

/// Console configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsoleConfig {
    /// SQLite database file.
    pub database_path: PathBuf,

    /// Currency symbol (for display)
    pub currency_symbol: String,

    /// Decimal places shown for amounts (0 to 2). Amounts are always
    /// stored in cents.
    pub currency_decimals: u8,

    /// Thousands separator (for display)
    pub thousands_separator: char,

    /// Gate return quantities against what is still outstanding on the
    /// sale instead of the original sold quantity.
    pub cumulative_return_check: bool,
}

impl Default for ConsoleConfig {
    /// Returns default configuration.
    ///
    /// ## Default Values
    /// - Database: `barberia.db` in the platform data directory
    /// - Currency: `$` with no decimals and `.` thousands (`$25.000`)
    /// - Cumulative return check: on
    fn default() -> Self {
        ConsoleConfig {
            database_path: default_database_path(),
            currency_symbol: "$".to_string(),
            currency_decimals: 0,
            thousands_separator: '.',
            cumulative_return_check: true,
        }
    }
}

impl ConsoleConfig {
    /// Creates a new ConsoleConfig from environment variables and defaults.
    ///
    /// ## Environment Variables
    /// - `BARBERIA_DB_PATH`: Database file
    /// - `BARBERIA_CURRENCY_SYMBOL`: Currency symbol
    /// - `BARBERIA_CURRENCY_DECIMALS`: Decimal places (0-2)
    /// - `BARBERIA_CUMULATIVE_RETURN_CHECK`: `true`/`false`
    ///
    /// Unparseable values are ignored and the default kept.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = ConsoleConfig::default();

        if let Some(path) = lookup("BARBERIA_DB_PATH") {
            config.database_path = PathBuf::from(path);
        }

        if let Some(symbol) = lookup("BARBERIA_CURRENCY_SYMBOL") {
            config.currency_symbol = symbol;
        }

        if let Some(decimals) = lookup("BARBERIA_CURRENCY_DECIMALS") {
            if let Ok(decimals) = decimals.trim().parse::<u8>() {
                config.currency_decimals = decimals.min(2);
            }
        }

        if let Some(flag) = lookup("BARBERIA_CUMULATIVE_RETURN_CHECK") {
            match flag.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => config.cumulative_return_check = true,
                "0" | "false" | "no" | "off" => config.cumulative_return_check = false,
                _ => {}
            }
        }

        config
    }

    /// Quantity ceiling policy for the return gates.
    pub fn quantity_policy(&self) -> QuantityPolicy {
        if self.cumulative_return_check {
            QuantityPolicy::Outstanding
        } else {
            QuantityPolicy::SoldQuantity
        }
    }

    /// Formats a cent amount as a currency string.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let config = ConsoleConfig::default();
    /// assert_eq!(config.format_currency(2_500_000), "$25.000");
    /// ```
    pub fn format_currency(&self, cents: i64) -> String {
        let decimals = u32::from(self.currency_decimals.min(2));
        let unit = 10_i64.pow(2 - decimals);
        // round half away from zero to the displayed precision
        let scaled = (cents.abs() + unit / 2) / unit;
        let divisor = 10_i64.pow(decimals);
        let whole = group_thousands(scaled / divisor, self.thousands_separator);
        let decimal_mark = if self.thousands_separator == '.' { ',' } else { '.' };

        format!(
            "{}{}{}",
            if cents < 0 && scaled != 0 { "-" } else { "" },
            self.currency_symbol,
            if decimals > 0 {
                format!(
                    "{}{}{:0width$}",
                    whole,
                    decimal_mark,
                    scaled % divisor,
                    width = decimals as usize
                )
            } else {
                whole
            }
        )
    }
}

fn group_thousands(value: i64, separator: char) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(separator);
        }
        grouped.push(ch);
    }
    grouped
}

/// Determines the database file path based on the platform.
///
/// ## Platform-Specific Paths
/// - **macOS**: `~/Library/Application Support/co.barberia.console/barberia.db`
/// - **Windows**: `%APPDATA%\barberia\console\data\barberia.db`
/// - **Linux**: `~/.local/share/console/barberia.db`
///
/// Falls back to the working directory when no home directory is known.
fn default_database_path() -> PathBuf {
    ProjectDirs::from("co", "barberia", "console")
        .map(|dirs| dirs.data_dir().join(DB_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(DB_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> ConsoleConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ConsoleConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_format_currency_pesos() {
        let config = ConsoleConfig::default();
        assert_eq!(config.format_currency(2_500_000), "$25.000");
        assert_eq!(config.format_currency(0), "$0");
        assert_eq!(config.format_currency(123_456_789), "$1.234.568");
        assert_eq!(config.format_currency(99_900), "$999");
    }

    #[test]
    fn test_format_currency_with_decimals() {
        let config = ConsoleConfig {
            currency_decimals: 2,
            thousands_separator: ',',
            ..ConsoleConfig::default()
        };
        assert_eq!(config.format_currency(1234), "$12.34");
        assert_eq!(config.format_currency(123_456_701), "$1,234,567.01");
        assert_eq!(config.format_currency(1), "$0.01");
    }

    #[test]
    fn test_format_currency_negative() {
        let config = ConsoleConfig::default();
        assert_eq!(config.format_currency(-2_500_000), "-$25.000");
    }

    #[test]
    fn test_env_overrides() {
        let config = config_from(&[
            ("BARBERIA_DB_PATH", "/tmp/b.db"),
            ("BARBERIA_CURRENCY_SYMBOL", "COP "),
            ("BARBERIA_CURRENCY_DECIMALS", "7"),
            ("BARBERIA_CUMULATIVE_RETURN_CHECK", "off"),
        ]);
        assert_eq!(config.database_path, PathBuf::from("/tmp/b.db"));
        assert_eq!(config.currency_symbol, "COP ");
        assert_eq!(config.currency_decimals, 2);
        assert_eq!(config.quantity_policy(), QuantityPolicy::SoldQuantity);
    }

    #[test]
    fn test_bad_values_keep_defaults() {
        let config = config_from(&[
            ("BARBERIA_CURRENCY_DECIMALS", "dos"),
            ("BARBERIA_CUMULATIVE_RETURN_CHECK", "maybe"),
        ]);
        assert_eq!(config.currency_decimals, 0);
        assert_eq!(config.quantity_policy(), QuantityPolicy::Outstanding);
    }
}
