//! Configuration display command

use std::path::Path;

use anyhow::Result;
use subscout_core::config::resolve_config_path;

use super::load_config;

pub fn cmd_config(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;

    println!();
    println!("⚙️  Detection Config");
    println!("   ─────────────────────────────────────────────────────────────");

    match resolve_config_path(config_path) {
        Some(path) => println!("   Source: {}", path.display()),
        None => println!("   Source: built-in defaults"),
    }

    println!();
    println!("   Lookback:            {} months", config.timeframe_months);
    println!(
        "   Amount band:         ${:.2} - ${:.2}",
        config.min_amount, config.max_amount
    );
    println!(
        "   Interval tolerance:  ±{:.0}% of the mean gap",
        config.interval_tolerance * 100.0
    );
    println!(
        "   Regular share:       {:.0}% of gaps",
        config.regular_share * 100.0
    );
    println!(
        "   Inactive after:      {} days (series under {} payments)",
        config.inactive_after_days, config.inactive_max_occurrences
    );
    println!(
        "   Savings tip:         above ${:.2}/month, quoting {:.0}%",
        config.savings_tip_threshold,
        config.savings_rate * 100.0
    );
    println!(
        "   Fetch:               up to {} records, {}s timeout",
        config.fetch_limit, config.fetch_timeout_secs
    );

    Ok(())
}
