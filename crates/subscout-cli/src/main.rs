//! Subscout CLI - Recurring payment detector
//!
//! Usage:
//!   subscout analyze --file tx.json     Detect subscriptions in an export
//!   subscout analyze --sample           Detect subscriptions in sample history
//!   subscout sample --output tx.json    Write sample history
//!   subscout config                     Show detection thresholds

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Analyze {
            file,
            sample: _,
            seed,
            months,
            min_amount,
            max_amount,
            user,
            json,
        } => {
            let now = chrono::Utc::now();
            let source = commands::open_source(file.as_deref(), seed, now);
            let params = commands::AnalyzeSubscriptionsParams {
                timeframe_months: months,
                min_amount,
                max_amount,
            };
            commands::cmd_analyze(config_path, source.as_ref(), &user, params, json, now).await
        }
        Commands::Sample {
            output,
            seed,
            limit,
            months,
        } => commands::cmd_sample(&output, seed, limit, months),
        Commands::Config => commands::cmd_config(config_path),
    }
}
