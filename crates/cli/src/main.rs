//! Zarin CLI - Database migrations and catalog tools.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront database migrations
//! zarin migrate
//!
//! # Load the sample jewelry catalog
//! zarin seed
//!
//! # Wipe catalog tables first, then load
//! zarin seed --reset
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "zarin")]
#[command(author, version, about = "Zarin storefront CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run storefront database migrations
    Migrate,
    /// Load the sample catalog (categories, products, coupons)
    Seed {
        /// Delete existing catalog rows before seeding
        #[arg(long)]
        reset: bool,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::storefront().await?,
        Commands::Seed { reset } => commands::seed::catalog(reset).await?,
    }
    Ok(())
}
