//! # Command Line
//!
//! `barberia` subcommands and their dispatch.
//!
//! ```text
//! barberia status
//! barberia sales list [--client ID]
//! barberia sales show ID
//! barberia sales void ID [--yes]
//! barberia returns list [--client ID] [--sale ID]
//! barberia returns create --sale 1 --client 4 --product 7 --quantity 1 --reason producto_defectuoso
//! barberia returns void ID [--yes]
//! barberia returns reasons
//! barberia credit CLIENT_ID [--sale-total PESOS]
//! barberia balances
//! barberia import [--sales FILE] [--returns FILE]
//! ```

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Result;
use barberia_core::validation::ReturnForm;
use barberia_core::Money;
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use crate::commands::{self, ConsoleService};
use crate::error::{ApiError, ErrorCode};
use crate::open_database;
use crate::state::ConsoleConfig;

/// Back-office console for barbershop returns and store credit
#[derive(Debug, Parser)]
#[command(name = "barberia", version, about, long_about = None)]
pub struct Cli {
    /// SQLite database file
    #[arg(long, global = true, env = "BARBERIA_DB_PATH")]
    db: Option<PathBuf>,

    /// Bound return quantities by the sold quantity only, ignoring earlier returns
    #[arg(long, global = true)]
    sold_quantity_ceiling: bool,

    /// Print read-only views as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database and ledger summary
    Status,

    /// Sales and their adjusted view
    #[command(subcommand)]
    Sales(SalesCommand),

    /// Returns (devoluciones)
    #[command(subcommand)]
    Returns(ReturnsCommand),

    /// Store credit of one client
    Credit(CreditArgs),

    /// Every client holding store credit
    Balances,

    /// Import JSON exports from the old backend
    Import(ImportArgs),
}

#[derive(Debug, Subcommand)]
enum SalesCommand {
    /// List sales, newest first
    List {
        #[arg(long)]
        client: Option<i64>,
    },

    /// Show one sale after its returns
    Show { id: i64 },

    /// Void a completed sale
    Void {
        id: i64,

        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Debug, Subcommand)]
enum ReturnsCommand {
    /// List returns
    List {
        #[arg(long)]
        client: Option<i64>,

        #[arg(long)]
        sale: Option<i64>,
    },

    /// File a return against a sale
    Create(CreateReturnArgs),

    /// Void a completed return
    Void {
        id: i64,

        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// List the accepted reason codes
    Reasons,
}

/// The return form. Values are passed through as typed so the form checks
/// can report each bad field.
#[derive(Debug, Args)]
struct CreateReturnArgs {
    /// Sale id
    #[arg(long)]
    sale: String,

    /// Client id
    #[arg(long, default_value = "")]
    client: String,

    /// Product id (as sold on the sale)
    #[arg(long, default_value = "")]
    product: String,

    /// Units returned
    #[arg(long, default_value = "")]
    quantity: String,

    /// Reason code (see `returns reasons`)
    #[arg(long, default_value = "")]
    reason: String,

    /// Free-text reason detail
    #[arg(long)]
    detail: Option<String>,

    #[arg(long)]
    observations: Option<String>,

    /// Operator user id
    #[arg(long, env = "BARBERIA_USER_ID")]
    user: Option<i64>,

    /// Record without asking for confirmation
    #[arg(long)]
    yes: bool,
}

impl CreateReturnArgs {
    fn into_form(self) -> (ReturnForm, bool) {
        let form = ReturnForm {
            sale_id: self.sale,
            client_id: self.client,
            product_id: self.product,
            quantity: self.quantity,
            reason: self.reason,
            reason_detail: self.detail,
            observations: self.observations,
            user_id: self.user,
        };
        (form, self.yes)
    }
}

#[derive(Debug, Args)]
struct CreditArgs {
    client_id: i64,

    /// Total of a sale being rung up, in pesos
    #[arg(long)]
    sale_total: Option<i64>,
}

#[derive(Debug, Args)]
struct ImportArgs {
    /// Sales export (JSON)
    #[arg(long)]
    sales: Option<PathBuf>,

    /// Returns export (JSON)
    #[arg(long)]
    returns: Option<PathBuf>,
}

impl Cli {
    /// Runs the selected subcommand.
    ///
    /// # Errors
    ///
    /// Returns the operation's `ApiError` (or a startup failure) for `main`
    /// to report.
    pub async fn run(self) -> Result<()> {
        let mut config = ConsoleConfig::from_env();
        if let Some(path) = self.db {
            config.database_path = path;
        }
        if self.sold_quantity_ceiling {
            config.cumulative_return_check = false;
        }
        let json = self.json;

        let db = open_database(&config).await?;

        if let Commands::Import(args) = &self.command {
            if args.sales.is_none() && args.returns.is_none() {
                return Err(ApiError::import("Nothing to import: pass --sales and/or --returns").into());
            }
            let summary =
                commands::import::import_files(&db, args.sales.as_deref(), args.returns.as_deref()).await?;
            emit(json, &summary, || summary.render())?;
            db.close().await;
            return Ok(());
        }

        let mut service =
            ConsoleService::load(db.clone(), db.clone(), config.quantity_policy()).await?;

        match self.command {
            Commands::Status => {
                println!("{}", commands::status::show_status(&db, &service, &config).await?);
            }
            Commands::Sales(command) => run_sales(command, &mut service, &config, json).await?,
            Commands::Returns(command) => run_returns(command, &mut service, &config, json).await?,
            Commands::Credit(args) => {
                let sale_total = args.sale_total.map(Money::from_pesos);
                emit(json, &service.client_credit(args.client_id, sale_total), || {
                    commands::credit::show_credit(&service, &config, args.client_id, sale_total)
                })?;
            }
            Commands::Balances => emit(json, &service.client_balances(), || {
                commands::credit::list_balances(&service, &config)
            })?,
            Commands::Import(_) => {}
        }

        db.close().await;
        Ok(())
    }
}

async fn run_sales(
    command: SalesCommand,
    service: &mut ConsoleService,
    config: &ConsoleConfig,
    json: bool,
) -> Result<()> {
    match command {
        SalesCommand::List { client } => {
            let service = &*service;
            let sales: Vec<_> = service
                .snapshot()
                .sales
                .iter()
                .filter(|s| client.map_or(true, |id| s.client_id == id))
                .collect();
            emit(json, &sales, || commands::sales::list_sales(service, config, client))?;
        }
        SalesCommand::Show { id } => {
            if json {
                print_json(&service.reconcile_sale(id)?)?;
            } else {
                println!("{}", commands::sales::show_sale(service, config, id)?);
            }
        }
        SalesCommand::Void { id, yes } => {
            if yes || ask(&format!("Void sale {id}? Its returns stay as they are."))? {
                print!("{}", commands::sales::void_sale(service, id).await?);
            } else {
                info!(sale_id = id, "Sale void cancelled by operator");
                println!("Cancelled.");
            }
        }
    }
    Ok(())
}

async fn run_returns(
    command: ReturnsCommand,
    service: &mut ConsoleService,
    config: &ConsoleConfig,
    json: bool,
) -> Result<()> {
    match command {
        ReturnsCommand::List { client, sale } => {
            let service = &*service;
            let returns: Vec<_> = service
                .snapshot()
                .returns
                .iter()
                .filter(|r| client.map_or(true, |id| r.client_id == id))
                .filter(|r| sale.map_or(true, |id| r.sale_id == id))
                .collect();
            emit(json, &returns, || {
                commands::returns::list_returns(service, config, client, sale)
            })?;
        }
        ReturnsCommand::Create(args) => {
            let (form, yes) = args.into_form();
            let created = commands::returns::create_return(service, config, &form, Utc::now(), |proposal| {
                print!("{proposal}");
                yes || ask("Record this return?").unwrap_or(false)
            })
            .await;
            match created {
                Ok(outcome) => println!("{}", commands::returns::render_outcome(&outcome, config)),
                Err(e) if e.code == ErrorCode::Cancelled => println!("Cancelled. Nothing was recorded."),
                Err(e) => return Err(e.into()),
            }
        }
        ReturnsCommand::Void { id, yes } => {
            if yes || ask(&format!("Void return {id}? Its store credit is withdrawn."))? {
                println!("{}", commands::returns::void_return(service, config, id).await?);
            } else {
                info!(return_id = id, "Return void cancelled by operator");
                println!("Cancelled.");
            }
        }
        ReturnsCommand::Reasons => println!("{}", commands::returns::list_reasons()),
    }
    Ok(())
}

/// Prints `value` as JSON or the text view.
fn emit<T: Serialize + ?Sized>(json: bool, value: &T, text: impl FnOnce() -> String) -> Result<()> {
    if json {
        print_json(value)
    } else {
        println!("{}", text());
        Ok(())
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Asks a yes/no question on the terminal. Anything but yes is a no.
fn ask(question: &str) -> io::Result<bool> {
    print!("{question} [y/N] ");
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(
        answer.trim().to_lowercase().as_str(),
        "y" | "yes" | "s" | "si" | "sí"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_create_args_keep_raw_values() {
        let cli = Cli::try_parse_from([
            "barberia", "returns", "create", "--sale", "1", "--client", "4", "--product", "7",
            "--quantity", "dos", "--reason", "otros",
        ])
        .unwrap();
        let Commands::Returns(ReturnsCommand::Create(args)) = cli.command else {
            panic!("expected returns create");
        };
        let (form, yes) = args.into_form();
        assert_eq!(form.quantity, "dos");
        assert_eq!(form.product_id, "7");
        assert!(!yes);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["barberia", "balances", "--json", "--sold-quantity-ceiling"]).unwrap();
        assert!(cli.json);
        assert!(cli.sold_quantity_ceiling);
        assert!(matches!(cli.command, Commands::Balances));
    }
}
