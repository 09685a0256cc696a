//! Sample history command

use std::path::Path;

use anyhow::{Context, Result};
use subscout_core::{SampleSource, TransactionQuery};

pub fn cmd_sample(output: &Path, seed: u64, limit: usize, months: u32) -> Result<()> {
    let source = SampleSource::new(seed, chrono::Utc::now()).with_recurring_months(months);
    let records = source.generate(&TransactionQuery::new("sample").limit(limit));

    let document = serde_json::json!({
        "transactions": records,
        "total": records.len(),
    });
    let content = serde_json::to_string_pretty(&document)?;
    std::fs::write(output, content)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!(
        "✅ Wrote {} sample transactions to {}",
        records.len(),
        output.display()
    );
    println!("   Analyze them with: subscout analyze --file {}", output.display());

    Ok(())
}
