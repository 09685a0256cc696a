//! Candidate selection and grouping
//!
//! Outbound payments inside the amount band and lookback window are bucketed
//! by (merchant label, amount in cents). Two payments only share a bucket when
//! they match to the cent.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::models::{TransactionRecord, TransactionType};

/// Convert a decimal amount to integer cents
pub fn to_cents(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

/// Convert integer cents back to a decimal amount
pub fn from_cents(cents: i64) -> f64 {
    cents as f64 / 100.0
}

/// Inclusive amount band, held in cents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmountBand {
    pub min_cents: i64,
    pub max_cents: i64,
}

impl AmountBand {
    pub fn new(min_amount: f64, max_amount: f64) -> Self {
        Self {
            min_cents: to_cents(min_amount),
            max_cents: to_cents(max_amount),
        }
    }

    pub fn contains(&self, cents: i64) -> bool {
        (self.min_cents..=self.max_cents).contains(&cents)
    }
}

/// Identity of a candidate recurring series
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PaymentGroupKey {
    pub merchant: String,
    pub amount_cents: i64,
}

/// Payments sharing a key, dates sorted ascending
#[derive(Debug, Clone)]
pub struct PaymentGroup {
    pub key: PaymentGroupKey,
    pub dates: Vec<DateTime<Utc>>,
}

/// A transaction that passed the filter, with its parsed date
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub tx: &'a TransactionRecord,
    pub amount_cents: i64,
    pub date: DateTime<Utc>,
}

/// Keep outbound payments within the band whose date parses and is not
/// before `cutoff`. Records with unparseable dates are skipped.
pub fn select_candidates<'a>(
    transactions: &'a [TransactionRecord],
    band: AmountBand,
    cutoff: DateTime<Utc>,
) -> Vec<Candidate<'a>> {
    let mut selected = Vec::new();

    for tx in transactions {
        if tx.tx_type != TransactionType::Send {
            continue;
        }

        let amount_cents = to_cents(tx.amount);
        if !band.contains(amount_cents) {
            continue;
        }

        let Some(date) = tx.parsed_date() else {
            debug!(
                "Skipping transaction {:?} - unparseable date {:?}",
                tx.id, tx.date
            );
            continue;
        };

        if date < cutoff {
            continue;
        }

        selected.push(Candidate {
            tx,
            amount_cents,
            date,
        });
    }

    selected
}

/// Bucket candidates by (merchant, cents).
///
/// Groups come back in the order their first payment was seen, each with its
/// dates sorted ascending.
pub fn group_payments(candidates: &[Candidate<'_>]) -> Vec<PaymentGroup> {
    let mut index: HashMap<PaymentGroupKey, usize> = HashMap::new();
    let mut groups: Vec<PaymentGroup> = Vec::new();

    for candidate in candidates {
        let key = PaymentGroupKey {
            merchant: candidate.tx.merchant().to_string(),
            amount_cents: candidate.amount_cents,
        };

        let slot = *index.entry(key.clone()).or_insert_with(|| {
            groups.push(PaymentGroup {
                key,
                dates: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].dates.push(candidate.date);
    }

    for group in &mut groups {
        group.dates.sort();
    }

    groups
}
