//! Recurring payment detection
//!
//! Pipeline, each stage feeding the next:
//! 1. Select outbound payments in the amount band and lookback window
//! 2. Group them by (merchant, amount to the cent)
//! 3. Measure the gaps between payments and test their regularity
//! 4. Classify the cadence from the mean gap
//! 5. Build a subscription record per regular series
//! 6. Aggregate the monthly-equivalent cost
//! 7. Derive warnings
//!
//! The detector is a pure function of its inputs. The clock is passed in,
//! so the same transactions, parameters and `now` always give the same report.

pub mod cost;
pub mod grouping;
pub mod intervals;
pub mod warnings;

use chrono::{DateTime, Months, Utc};
use tracing::{debug, info};

use crate::config::DetectionConfig;
use crate::models::{AnalysisReport, Confidence, Subscription, TransactionRecord};

use grouping::{from_cents, AmountBand, PaymentGroup};

/// Per-call parameters of a detection run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionParams {
    /// Lookback window in months
    pub timeframe_months: u32,
    pub min_amount: f64,
    pub max_amount: f64,
}

impl DetectionParams {
    /// Earliest payment date considered
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_sub_months(Months::new(self.timeframe_months))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

impl From<&DetectionConfig> for DetectionParams {
    fn from(config: &DetectionConfig) -> Self {
        Self {
            timeframe_months: config.timeframe_months,
            min_amount: config.min_amount,
            max_amount: config.max_amount,
        }
    }
}

impl Default for DetectionParams {
    fn default() -> Self {
        Self::from(&DetectionConfig::default())
    }
}

/// Subscription detector
#[derive(Debug, Clone, Default)]
pub struct SubscriptionDetector {
    config: DetectionConfig,
}

impl SubscriptionDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DetectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Parameters taken from the configured defaults
    pub fn default_params(&self) -> DetectionParams {
        DetectionParams::from(&self.config)
    }

    /// Run the full pipeline and assemble a report
    pub fn analyze(
        &self,
        transactions: &[TransactionRecord],
        params: &DetectionParams,
        now: DateTime<Utc>,
    ) -> AnalysisReport {
        let subscriptions = self.detect(transactions, params, now);
        let total_monthly_cost = cost::total_monthly_cost(&subscriptions);
        let warnings =
            warnings::generate_warnings(&subscriptions, total_monthly_cost, &self.config, now);

        info!(
            "Subscription analysis: {} transactions scanned, {} subscriptions, ${:.2}/month",
            transactions.len(),
            subscriptions.len(),
            total_monthly_cost
        );

        AnalysisReport {
            analysis_period: format!("{} months", params.timeframe_months),
            total_transactions_scanned: transactions.len(),
            subscriptions_found: subscriptions.len(),
            subscriptions,
            total_monthly_cost,
            warnings,
            generated_at: now,
        }
    }

    /// Identify recurring payments, in order of each series' first payment
    pub fn detect(
        &self,
        transactions: &[TransactionRecord],
        params: &DetectionParams,
        now: DateTime<Utc>,
    ) -> Vec<Subscription> {
        let band = AmountBand::new(params.min_amount, params.max_amount);
        let candidates = grouping::select_candidates(transactions, band, params.cutoff(now));
        let groups = grouping::group_payments(&candidates);

        debug!(
            "{} candidate payments in {} merchant/amount groups",
            candidates.len(),
            groups.len()
        );

        groups
            .iter()
            .filter_map(|group| self.evaluate_group(group))
            .collect()
    }

    /// Promote a group to a subscription if its payments recur regularly
    fn evaluate_group(&self, group: &PaymentGroup) -> Option<Subscription> {
        // Need at least one repeat to establish a pattern
        if group.dates.len() < 2 {
            return None;
        }

        let gaps = intervals::gaps_in_days(&group.dates);
        let regular = intervals::is_regular(
            &gaps,
            self.config.interval_tolerance,
            self.config.regular_share,
        );
        if !regular {
            debug!(
                "Skipping {} @ {:.2} - irregular gaps {:?}",
                group.key.merchant,
                from_cents(group.key.amount_cents),
                gaps
            );
            return None;
        }

        let frequency = intervals::classify_frequency(&gaps);
        let occurrences = group.dates.len();
        let last_occurrence = group.dates.last()?.date_naive();

        debug!(
            "Found subscription: {} @ ${:.2}/{} ({} payments)",
            group.key.merchant,
            from_cents(group.key.amount_cents),
            frequency,
            occurrences
        );

        Some(Subscription {
            merchant: group.key.merchant.clone(),
            amount: from_cents(group.key.amount_cents),
            frequency,
            occurrences,
            last_occurrence,
            estimated_next: frequency.next_after(last_occurrence),
            total_paid: from_cents(group.key.amount_cents * occurrences as i64),
            confidence: Confidence::assess(occurrences, regular),
        })
    }
}
