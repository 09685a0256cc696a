//! Synthetic transaction history for demos and tests
//!
//! Output depends only on the seed, the reference time and the query, so two
//! sources built with the same arguments produce identical records.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Months, SecondsFormat, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{TransactionQuery, TransactionSource};
use crate::error::Result;
use crate::models::{TransactionRecord, TransactionType};

/// A merchant the generator can draw from
struct Template {
    description: &'static str,
    amount: f64,
    tx_type: TransactionType,
    /// Billed at a fixed price every month when recurring charges are enabled
    recurring: bool,
}

const fn t(
    description: &'static str,
    amount: f64,
    tx_type: TransactionType,
    recurring: bool,
) -> Template {
    Template {
        description,
        amount,
        tx_type,
        recurring,
    }
}

const TEMPLATES: &[Template] = &[
    t("Starbucks Coffee", 8.50, TransactionType::Send, false),
    t("Chipotle Mexican Grill", 15.75, TransactionType::Send, false),
    t("Whole Foods Market", 67.30, TransactionType::Send, false),
    t("DoorDash - Pizza Delivery", 32.50, TransactionType::Send, false),
    t("Local Coffee Shop", 6.25, TransactionType::Send, false),
    t("Uber Ride", 18.50, TransactionType::Send, false),
    t("Gas Station", 45.00, TransactionType::Send, false),
    t("Lyft Ride", 22.75, TransactionType::Send, false),
    t("Metro Card Reload", 30.00, TransactionType::Send, false),
    t("Amazon.com", 89.99, TransactionType::Send, false),
    t("Target Store", 54.25, TransactionType::Send, false),
    t("Nike Store", 125.00, TransactionType::Send, false),
    t("Netflix Subscription", 15.99, TransactionType::Send, true),
    t("Spotify Premium", 10.99, TransactionType::Send, true),
    t("Movie Theater", 28.50, TransactionType::Send, false),
    t("Steam Games", 59.99, TransactionType::Send, false),
    t("Electric Bill Payment", 125.50, TransactionType::Send, false),
    t("Internet Service", 79.99, TransactionType::Send, true),
    t("Phone Bill", 65.00, TransactionType::Send, true),
    t("Payroll Deposit", 2500.00, TransactionType::Receive, false),
    t("Freelance Payment", 450.00, TransactionType::Receive, false),
    t("Refund from Amazon", 29.99, TransactionType::Receive, false),
    t("Payment from @alice", 75.00, TransactionType::Receive, false),
    t("Savings Deposit", 200.00, TransactionType::Deposit, false),
    t("Savings Withdrawal", 100.00, TransactionType::Withdrawal, false),
];

/// Number of random draws per fetch
const RANDOM_DRAWS: usize = 40;
/// Random records fall within this many days before `now`
const WINDOW_DAYS: i64 = 30;

/// Deterministic synthetic transaction source
///
/// Draws up to 40 random purchases from the last 30 days, each priced at
/// 80-120% of its template amount. With `recurring_months` set, it also bills
/// the subscription templates at their exact price once a month going back
/// that many months.
#[derive(Debug, Clone)]
pub struct SampleSource {
    seed: u64,
    now: DateTime<Utc>,
    recurring_months: u32,
}

impl SampleSource {
    pub fn new(seed: u64, now: DateTime<Utc>) -> Self {
        Self {
            seed,
            now,
            recurring_months: 0,
        }
    }

    /// Also emit fixed-price monthly charges for this many months
    pub fn with_recurring_months(mut self, months: u32) -> Self {
        self.recurring_months = months;
        self
    }

    /// Generate records for a query
    pub fn generate(&self, query: &TransactionQuery) -> Vec<TransactionRecord> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let stamp = self.now.timestamp_millis();
        let mut records = Vec::new();

        for i in 0..RANDOM_DRAWS {
            if records.len() >= query.limit {
                break;
            }

            let template = &TEMPLATES[rng.gen_range(0..TEMPLATES.len())];
            let days_ago = rng.gen_range(0..WINDOW_DAYS);
            let created_at = self.now - Duration::days(days_ago);
            // Draw the remaining values before filtering so the sequence
            // doesn't depend on the query
            let variance = 0.8 + rng.gen::<f64>() * 0.4;
            let counterparty_roll = rng.gen::<f64>();

            if query
                .start_date
                .is_some_and(|start| created_at.date_naive() < start)
            {
                continue;
            }

            let amount = (template.amount * variance * 100.0).round() / 100.0;
            let recipient = (template.tx_type == TransactionType::Receive
                && counterparty_roll > 0.5)
                .then(|| "@alice".to_string());

            records.push(self.record(
                format!("tx_sample_{}_{}", i, stamp),
                template,
                amount,
                recipient,
                created_at,
            ));
        }

        for (n, template) in TEMPLATES.iter().filter(|t| t.recurring).enumerate() {
            for month in 0..self.recurring_months {
                if records.len() >= query.limit {
                    return records;
                }
                let Some(billed_at) = self.now.checked_sub_months(Months::new(month)) else {
                    break;
                };
                if query
                    .start_date
                    .is_some_and(|start| billed_at.date_naive() < start)
                {
                    continue;
                }
                records.push(self.record(
                    format!("tx_sample_sub_{}_{}_{}", n, month, stamp),
                    template,
                    template.amount,
                    None,
                    billed_at,
                ));
            }
        }

        records
    }

    fn record(
        &self,
        id: String,
        template: &Template,
        amount: f64,
        recipient: Option<String>,
        at: DateTime<Utc>,
    ) -> TransactionRecord {
        let timestamp = at.to_rfc3339_opts(SecondsFormat::Secs, true);
        TransactionRecord {
            id: Some(id),
            tx_type: template.tx_type,
            amount,
            currency: Some("USD".to_string()),
            description: Some(template.description.to_string()),
            recipient,
            date: timestamp.clone(),
            status: "completed".to_string(),
            created_at: Some(timestamp),
        }
    }
}

#[async_trait]
impl TransactionSource for SampleSource {
    fn name(&self) -> &str {
        "sample"
    }

    async fn fetch(&self, query: &TransactionQuery) -> Result<Vec<serde_json::Value>> {
        self.generate(query)
            .into_iter()
            .map(|record| serde_json::to_value(record).map_err(Into::into))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_same_seed_same_records() {
        let query = TransactionQuery::new("u");
        let a = SampleSource::new(42, now()).generate(&query);
        let b = SampleSource::new(42, now()).generate(&query);
        assert_eq!(a, b);
        assert_eq!(a.len(), RANDOM_DRAWS);
    }

    #[test]
    fn test_different_seed_differs() {
        let query = TransactionQuery::new("u");
        let a = SampleSource::new(1, now()).generate(&query);
        let b = SampleSource::new(2, now()).generate(&query);
        assert_ne!(a, b);
    }

    #[test]
    fn test_records_within_window_and_variance() {
        let records = SampleSource::new(7, now()).generate(&TransactionQuery::new("u"));
        let earliest = now() - Duration::days(WINDOW_DAYS);
        for record in &records {
            let date = record.parsed_date().expect("sample dates parse");
            assert!(date > earliest && date <= now());

            let template = TEMPLATES
                .iter()
                .find(|t| Some(t.description) == record.description.as_deref())
                .unwrap();
            assert!(record.amount >= (template.amount * 0.8 * 100.0).floor() / 100.0);
            assert!(record.amount <= (template.amount * 1.2 * 100.0).ceil() / 100.0);

            if record.recipient.is_some() {
                assert_eq!(record.tx_type, TransactionType::Receive);
            }
        }
    }

    #[test]
    fn test_limit_and_start_date() {
        let query = TransactionQuery::new("u").limit(5);
        assert_eq!(SampleSource::new(42, now()).generate(&query).len(), 5);

        let start = (now() - Duration::days(10)).date_naive();
        let query = TransactionQuery::new("u").since(start);
        let records = SampleSource::new(42, now()).generate(&query);
        assert!(records
            .iter()
            .all(|r| r.parsed_date().unwrap().date_naive() >= start));
    }

    #[test]
    fn test_recurring_charges() {
        let source = SampleSource::new(42, now()).with_recurring_months(4);
        let records = source.generate(&TransactionQuery::new("u"));
        let netflix: Vec<_> = records
            .iter()
            .filter(|r| r.id.as_deref().is_some_and(|id| id.starts_with("tx_sample_sub_")))
            .filter(|r| r.description.as_deref() == Some("Netflix Subscription"))
            .collect();
        assert_eq!(netflix.len(), 4);
        assert!(netflix.iter().all(|r| r.amount == 15.99));
    }

    #[tokio::test]
    async fn test_fetch_returns_json_records() {
        let source = SampleSource::new(42, now());
        let values = source.fetch(&TransactionQuery::new("u").limit(3)).await.unwrap();
        assert_eq!(values.len(), 3);
        assert_eq!(values[0]["currency"], "USD");
        assert_eq!(values[0]["status"], "completed");
    }
}
