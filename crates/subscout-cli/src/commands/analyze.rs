//! Subscription analysis command

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use subscout_core::tools::{self, ToolRequest};
use subscout_core::{
    AnalysisReport, Confidence, CsvFileSource, DetectionConfig, JsonFileSource, SampleSource,
    SubscriptionDetector, TransactionSource,
};

pub use subscout_core::AnalyzeSubscriptionsParams;

use super::truncate;

/// Months of subscription charges mixed into sample history
pub const SAMPLE_RECURRING_MONTHS: u32 = 6;

/// Pick a source: an export file by extension, or sample history
pub fn open_source(
    file: Option<&Path>,
    seed: u64,
    now: DateTime<Utc>,
) -> Box<dyn TransactionSource> {
    match file {
        Some(path) if is_csv(path) => Box::new(CsvFileSource::new(path)),
        Some(path) => Box::new(JsonFileSource::new(path)),
        None => {
            Box::new(SampleSource::new(seed, now).with_recurring_months(SAMPLE_RECURRING_MONTHS))
        }
    }
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"))
}

/// Load and check the detection config
pub fn load_config(config_path: Option<&Path>) -> Result<DetectionConfig> {
    let config = DetectionConfig::load(config_path).context("Failed to load detection config")?;
    config.validate().context("Invalid detection config")?;
    Ok(config)
}

pub async fn cmd_analyze(
    config_path: Option<&Path>,
    source: &dyn TransactionSource,
    user: &str,
    params: AnalyzeSubscriptionsParams,
    json: bool,
    now: DateTime<Utc>,
) -> Result<()> {
    let detector = SubscriptionDetector::with_config(load_config(config_path)?);
    let input = serde_json::to_value(params).context("Failed to encode parameters")?;
    let request = ToolRequest::new(user, input);

    if !json {
        println!("🔍 Analyzing subscriptions for {} ({})...", user, source.name());
    }

    let result = tools::analyze_subscriptions(source, &detector, &request, now).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    if !result.success {
        anyhow::bail!(
            "Analysis failed: {}",
            result.error.as_deref().unwrap_or("unknown error")
        );
    }

    let report: AnalysisReport = serde_json::from_value(result.data.unwrap_or_default())
        .context("Tool returned a malformed report")?;
    print_report(&report);

    Ok(())
}

fn confidence_icon(confidence: Confidence) -> &'static str {
    match confidence {
        Confidence::High => "✅",
        Confidence::Medium => "🔶",
        Confidence::Low => "❔",
    }
}

fn print_report(report: &AnalysisReport) {
    println!();
    println!(
        "📋 Detected Subscriptions ({} found in {} transactions, last {})",
        report.subscriptions_found, report.total_transactions_scanned, report.analysis_period
    );
    println!("   ─────────────────────────────────────────────────────────────");

    if report.subscriptions.is_empty() {
        println!("   (none)");
    }

    for sub in &report.subscriptions {
        let next = sub
            .estimated_next
            .map(|d| d.to_string())
            .unwrap_or_else(|| "unknown".to_string());

        println!(
            "   {} {:24} │ {:>9}/{:<11} │ {:>2}x │ next {}",
            confidence_icon(sub.confidence),
            truncate(&sub.merchant, 24),
            format!("${:.2}", sub.amount),
            sub.frequency.as_str(),
            sub.occurrences,
            next
        );
    }

    println!();
    println!("   💰 Monthly cost: ${:.2}", report.total_monthly_cost);

    println!();
    println!("⚠️  Notes");
    for warning in &report.warnings {
        println!("   • {}", warning);
    }
}
