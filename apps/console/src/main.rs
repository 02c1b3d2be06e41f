//! `barberia` binary entry point.

use barberia_console::cli::Cli;
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    barberia_console::init_tracing();
    Cli::parse().run().await
}
