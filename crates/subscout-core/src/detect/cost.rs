//! Monthly-equivalent cost aggregation

use crate::models::Subscription;

/// Round to two decimal places
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// One subscription's amount normalized to a monthly rate
pub fn monthly_equivalent(sub: &Subscription) -> f64 {
    sub.amount * sub.frequency.monthly_factor()
}

/// Sum of monthly-equivalents, rounded once at the end
pub fn total_monthly_cost(subscriptions: &[Subscription]) -> f64 {
    round_cents(subscriptions.iter().map(monthly_equivalent).sum())
}
