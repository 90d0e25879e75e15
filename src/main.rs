//! Routerus - static route generator for categorized domain lists
//!
//! Resolves domains to IPv4 addresses and writes route tables for routers and
//! operating systems.

use anyhow::Result;
use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use routerus::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    let log_level = if cli.verbose {
        Level::DEBUG
    } else if cli.quiet {
        Level::ERROR
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Generate(args) => {
            routerus::commands::generate::run(args, cli.config.as_deref(), cli.quiet).await
        }
        Commands::Formats => routerus::commands::formats::run().await,
        Commands::Version => {
            println!("routerus {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
