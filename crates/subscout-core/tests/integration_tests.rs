//! Integration tests for subscout-core
//!
//! These tests exercise the full source → tool adapter → detector → report workflow.

use std::io::Write;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde_json::json;
use subscout_core::{
    tools::{analyze_subscriptions, ToolRequest, ToolResult},
    AnalysisReport, Confidence, CsvFileSource, DetectionConfig, Frequency, JsonFileSource,
    SampleSource, SubscriptionDetector,
};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 10, 9, 0, 0).unwrap()
}

/// CSV export with three obvious monthly subscriptions (Netflix, Spotify, Hulu),
/// four payments each, plus one-off purchases and an inbound payment
fn csv_with_subscriptions() -> &'static str {
    "id,type,amount,description,recipient,date,status
t01,send,15.99,NETFLIX.COM,,2024-01-15T08:00:00Z,completed
t02,send,15.99,NETFLIX.COM,,2024-02-15T08:00:00Z,completed
t03,send,15.99,NETFLIX.COM,,2024-03-15T08:00:00Z,completed
t04,send,15.99,NETFLIX.COM,,2024-04-15T08:00:00Z,completed
t05,send,10.99,SPOTIFY USA,,2024-01-20T08:00:00Z,completed
t06,send,10.99,SPOTIFY USA,,2024-02-20T08:00:00Z,completed
t07,send,10.99,SPOTIFY USA,,2024-03-20T08:00:00Z,completed
t08,send,10.99,SPOTIFY USA,,2024-04-20T08:00:00Z,completed
t09,send,17.99,HULU,,2024-01-01T08:00:00Z,completed
t10,send,17.99,HULU,,2024-02-01T08:00:00Z,completed
t11,send,17.99,HULU,,2024-03-01T08:00:00Z,completed
t12,send,17.99,HULU,,2024-04-01T08:00:00Z,completed
t13,send,67.30,Whole Foods Market,,2024-03-03T18:00:00Z,completed
t14,send,54.25,Target Store,,2024-04-11T18:00:00Z,completed
t15,receive,2500.00,Payroll Deposit,,2024-04-01T08:00:00Z,completed"
}

fn netflix_json() -> serde_json::Value {
    let transactions: Vec<_> = (1..=4)
        .map(|m| {
            json!({
                "id": format!("tx_{}", m),
                "type": "send",
                "amount": 15.99,
                "description": "Netflix",
                "date": format!("2024-0{}-01T10:00:00Z", m),
                "status": "completed"
            })
        })
        .collect();
    json!({ "transactions": transactions, "total": 4 })
}

fn expect_report(result: ToolResult) -> AnalysisReport {
    assert!(result.success, "tool failed: {:?}", result.error);
    serde_json::from_value(result.data.expect("successful result carries data"))
        .expect("data decodes as a report")
}

// =============================================================================
// File Source Workflows
// =============================================================================

#[tokio::test]
async fn test_csv_export_workflow() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(csv_with_subscriptions().as_bytes()).unwrap();

    let source = CsvFileSource::new(file.path());
    let detector = SubscriptionDetector::new();
    let request = ToolRequest::new("user_1", serde_json::Value::Null);

    let report = expect_report(analyze_subscriptions(&source, &detector, &request, now()).await);

    assert_eq!(report.total_transactions_scanned, 15);
    assert_eq!(report.subscriptions_found, 3);

    // First-seen order of each series
    let merchants: Vec<_> = report
        .subscriptions
        .iter()
        .map(|s| s.merchant.as_str())
        .collect();
    assert_eq!(merchants, vec!["NETFLIX.COM", "SPOTIFY USA", "HULU"]);

    for sub in &report.subscriptions {
        assert_eq!(sub.frequency, Frequency::Monthly);
        assert_eq!(sub.occurrences, 4);
        assert_eq!(sub.confidence, Confidence::High);
    }

    assert_eq!(report.total_monthly_cost, 44.97);
    assert_eq!(
        report.warnings,
        vec![
            "You are spending approximately $44.97 per month on subscriptions.".to_string(),
            "You have multiple streaming subscriptions: NETFLIX.COM, SPOTIFY USA, HULU. Consider consolidating."
                .to_string(),
        ]
    );
}

#[tokio::test]
async fn test_netflix_json_end_to_end() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{}", netflix_json()).unwrap();

    let source = JsonFileSource::new(file.path());
    let detector = SubscriptionDetector::new();
    let request = ToolRequest::new("user_1", json!({}));

    let result = analyze_subscriptions(&source, &detector, &request, now()).await;
    let data = result.data.clone().unwrap();
    assert_eq!(data["analysis_period"], "6 months");
    assert_eq!(data["subscriptions"][0]["frequency"], "monthly");
    assert_eq!(data["subscriptions"][0]["confidence"], "high");
    assert_eq!(data["subscriptions"][0]["last_occurrence"], "2024-04-01");
    assert_eq!(data["subscriptions"][0]["estimated_next"], "2024-05-01");

    let report = expect_report(result);
    let sub = &report.subscriptions[0];
    assert_eq!(sub.total_paid, 63.96);
    assert_eq!(report.total_monthly_cost, 15.99);
    assert_eq!(report.warnings.len(), 1);
    assert!(!report.warnings.iter().any(|w| w.starts_with("Tip:")));
}

#[tokio::test]
async fn test_max_amount_boundary_through_tool() {
    let mut records = netflix_json()["transactions"].as_array().unwrap().clone();
    for m in 1..=4 {
        records.push(json!({
            "type": "send",
            "amount": 16.00,
            "description": "Premium Tier",
            "date": format!("2024-0{}-02T10:00:00Z", m),
            "status": "completed"
        }));
    }

    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{}", serde_json::Value::Array(records)).unwrap();

    let source = JsonFileSource::new(file.path());
    let detector = SubscriptionDetector::new();
    let request = ToolRequest::new("user_1", json!({"max_amount": 15.99}));

    let report = expect_report(analyze_subscriptions(&source, &detector, &request, now()).await);
    let merchants: Vec<_> = report
        .subscriptions
        .iter()
        .map(|s| s.merchant.as_str())
        .collect();
    assert_eq!(merchants, vec!["Netflix"]);
}

#[tokio::test]
async fn test_timeframe_parameter_limits_history() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{}", netflix_json()).unwrap();

    let source = JsonFileSource::new(file.path());
    let detector = SubscriptionDetector::new();

    // Cutoff 2024-02-10 leaves the March and April payments
    let request = ToolRequest::new("user_1", json!({"timeframe_months": 3}));
    let report = expect_report(analyze_subscriptions(&source, &detector, &request, now()).await);
    assert_eq!(report.analysis_period, "3 months");
    assert_eq!(report.subscriptions[0].occurrences, 2);
    assert_eq!(report.subscriptions[0].confidence, Confidence::Low);

    // Nothing falls inside a one-month window
    let request = ToolRequest::new("user_1", json!({"timeframe_months": 1}));
    let report = expect_report(analyze_subscriptions(&source, &detector, &request, now()).await);
    assert_eq!(report.subscriptions_found, 0);
    assert_eq!(
        report.warnings,
        vec!["No subscriptions were detected in your transaction history.".to_string()]
    );
}

#[tokio::test]
async fn test_missing_file_is_failure_result() {
    let source = JsonFileSource::new("/nonexistent/transactions.json");
    let detector = SubscriptionDetector::new();
    let request = ToolRequest::new("user_1", serde_json::Value::Null);

    let result = analyze_subscriptions(&source, &detector, &request, now()).await;
    assert!(!result.success);
    assert!(result
        .error
        .unwrap()
        .starts_with("failed to fetch transactions"));
}

// =============================================================================
// Determinism
// =============================================================================

#[tokio::test]
async fn test_reports_are_idempotent() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(csv_with_subscriptions().as_bytes()).unwrap();

    let source = CsvFileSource::new(file.path());
    let detector = SubscriptionDetector::new();
    let request = ToolRequest::new("user_1", serde_json::Value::Null);

    let first = analyze_subscriptions(&source, &detector, &request, now()).await;
    let second = analyze_subscriptions(&source, &detector, &request, now()).await;
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[tokio::test]
async fn test_sample_source_recurring_charges_detected() {
    let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
    let source = SampleSource::new(42, now).with_recurring_months(6);
    let detector = SubscriptionDetector::new();
    let request = ToolRequest::new("demo", serde_json::Value::Null);

    let first = analyze_subscriptions(&source, &detector, &request, now).await;
    let second = analyze_subscriptions(&source, &detector, &request, now).await;
    assert_eq!(first, second);

    let report = expect_report(first);
    for merchant in [
        "Netflix Subscription",
        "Spotify Premium",
        "Internet Service",
        "Phone Bill",
    ] {
        let sub = report
            .subscriptions
            .iter()
            .find(|s| s.merchant == merchant)
            .unwrap_or_else(|| panic!("{} not detected", merchant));
        assert_eq!(sub.frequency, Frequency::Monthly);
        assert_eq!(sub.occurrences, 6);
        assert_eq!(sub.last_occurrence, NaiveDate::from_ymd_opt(2024, 6, 15).unwrap());
    }

    assert!(report.total_monthly_cost >= 171.97);
    assert!(report
        .warnings
        .iter()
        .any(|w| w.starts_with("Tip: Cancelling just 10%")));
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn test_config_override_changes_regularity() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[regularity]").unwrap();
    writeln!(file, "interval_tolerance = 0.0").unwrap();
    writeln!(file, "regular_share = 1.0").unwrap();

    let config = DetectionConfig::load(Some(file.path())).unwrap();
    assert_eq!(config.timeframe_months, 6);
    config.validate().unwrap();

    // Gaps of 31, 29, 31 days are no longer all exactly on the mean
    let transactions: Vec<_> = ["2024-01-01", "2024-02-01", "2024-03-01", "2024-04-01"]
        .iter()
        .map(|d| {
            subscout_core::TransactionRecord::send("Gym", 40.0, &format!("{}T00:00:00Z", d))
        })
        .collect();

    let strict = SubscriptionDetector::with_config(config);
    assert!(strict
        .detect(&transactions, &strict.default_params(), now())
        .is_empty());

    let lenient = SubscriptionDetector::new();
    assert_eq!(
        lenient
            .detect(&transactions, &lenient.default_params(), now())
            .len(),
        1
    );
}
