//! Tool adapter for the subscription detector
//!
//! Bridges a tool invocation (user id plus a JSON parameter payload) to the
//! detector. Every failure comes back as a `ToolResult` with `success: false`
//! rather than an error, so the caller can hand it straight back to whoever
//! invoked the tool.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::detect::{DetectionParams, SubscriptionDetector};
use crate::error::{Error, Result};
use crate::models::TransactionRecord;
use crate::source::{TransactionQuery, TransactionSource};

/// Name the detector is invoked under
pub const ANALYZE_SUBSCRIPTIONS: &str = "analyze_subscriptions";

// =============================================================================
// Request / result envelopes
// =============================================================================

/// A single tool invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolRequest {
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// Parameter payload; `null` means all defaults
    #[serde(default)]
    pub input: serde_json::Value,
}

impl ToolRequest {
    pub fn new(user_id: impl Into<String>, input: serde_json::Value) -> Self {
        Self {
            user_id: user_id.into(),
            request_id: None,
            input,
        }
    }
}

/// Structured outcome of a tool invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolResult {
    pub fn ok(data: serde_json::Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

// =============================================================================
// analyze_subscriptions
// =============================================================================

/// Parameters accepted by `analyze_subscriptions`
///
/// Missing or zero values fall back to the configured defaults.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeSubscriptionsParams {
    /// Lookback window in months
    pub timeframe_months: Option<u32>,
    /// Smallest payment considered (inclusive)
    pub min_amount: Option<f64>,
    /// Largest payment considered (inclusive)
    pub max_amount: Option<f64>,
}

impl AnalyzeSubscriptionsParams {
    /// Decode a parameter payload; `null` decodes to all defaults
    pub fn from_input(input: &serde_json::Value) -> serde_json::Result<Self> {
        if input.is_null() {
            return Ok(Self::default());
        }
        serde_json::from_value(input.clone())
    }

    /// Fill in defaults for anything missing or zero
    pub fn resolve(&self, defaults: DetectionParams) -> DetectionParams {
        DetectionParams {
            timeframe_months: self
                .timeframe_months
                .filter(|&m| m > 0)
                .unwrap_or(defaults.timeframe_months),
            min_amount: self
                .min_amount
                .filter(|&v| v != 0.0)
                .unwrap_or(defaults.min_amount),
            max_amount: self
                .max_amount
                .filter(|&v| v != 0.0)
                .unwrap_or(defaults.max_amount),
        }
    }
}

/// Fetch a user's history and run the detector over it
pub async fn analyze_subscriptions(
    source: &dyn TransactionSource,
    detector: &SubscriptionDetector,
    request: &ToolRequest,
    now: DateTime<Utc>,
) -> ToolResult {
    let params = match AnalyzeSubscriptionsParams::from_input(&request.input) {
        Ok(p) => p.resolve(detector.default_params()),
        Err(e) => {
            debug!("Rejecting {} input: {}", ANALYZE_SUBSCRIPTIONS, e);
            return ToolResult::failure(format!("invalid input: {}", e));
        }
    };

    let config = detector.config();
    let query = TransactionQuery::new(&request.user_id)
        .since(params.cutoff(now).date_naive())
        .limit(config.fetch_limit);

    let raw = match fetch_with_timeout(source, &query, config.fetch_timeout_secs).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!(
                "Fetching transactions from {} for {} failed: {}",
                source.name(),
                request.user_id,
                e
            );
            return ToolResult::failure(format!("failed to fetch transactions: {}", e));
        }
    };

    let transactions = decode_records(raw);
    let report = detector.analyze(&transactions, &params, now);

    info!(
        "{} for {}: {} subscriptions from {}",
        ANALYZE_SUBSCRIPTIONS,
        request.user_id,
        report.subscriptions_found,
        source.name()
    );

    match serde_json::to_value(&report) {
        Ok(data) => ToolResult::ok(data),
        Err(e) => ToolResult::failure(format!("failed to serialize report: {}", e)),
    }
}

/// Dispatch a tool call by name
pub async fn execute_tool(
    name: &str,
    source: &dyn TransactionSource,
    detector: &SubscriptionDetector,
    request: &ToolRequest,
    now: DateTime<Utc>,
) -> ToolResult {
    match name {
        ANALYZE_SUBSCRIPTIONS => analyze_subscriptions(source, detector, request, now).await,
        _ => ToolResult::failure(format!("unknown tool: {}", name)),
    }
}

async fn fetch_with_timeout(
    source: &dyn TransactionSource,
    query: &TransactionQuery,
    timeout_secs: u64,
) -> Result<Vec<serde_json::Value>> {
    tokio::time::timeout(Duration::from_secs(timeout_secs), source.fetch(query))
        .await
        .map_err(|_| Error::Timeout(timeout_secs))?
}

/// Decode raw records one at a time, dropping the ones that don't fit
pub fn decode_records(raw: Vec<serde_json::Value>) -> Vec<TransactionRecord> {
    let total = raw.len();
    let records: Vec<TransactionRecord> = raw
        .into_iter()
        .enumerate()
        .filter_map(|(i, value)| match serde_json::from_value(value) {
            Ok(record) => Some(record),
            Err(e) => {
                debug!("Skipping record {}: {}", i, e);
                None
            }
        })
        .collect();

    if records.len() < total {
        debug!("Decoded {} of {} records", records.len(), total);
    }
    records
}
