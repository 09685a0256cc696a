//! Advisory messages derived from detected subscriptions

use chrono::{DateTime, NaiveTime, Utc};

use super::cost::round_cents;
use crate::config::DetectionConfig;
use crate::models::Subscription;

/// Service categories and the (lowercase) keywords that identify them
pub const CATEGORY_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "streaming",
        &[
            "netflix",
            "hulu",
            "disney",
            "prime",
            "spotify",
            "hbo",
            "apple tv",
            "youtube premium",
        ],
    ),
    (
        "music",
        &["spotify", "apple music", "youtube music", "tidal", "pandora"],
    ),
    ("cloud", &["dropbox", "google one", "icloud", "onedrive"]),
    (
        "fitness",
        &["peloton", "classpass", "apple fitness", "strava"],
    ),
];

pub const NO_SUBSCRIPTIONS: &str = "No subscriptions were detected in your transaction history.";

/// Categories whose keywords appear in the merchant name (case-insensitive)
pub fn categories_for(merchant: &str) -> Vec<&'static str> {
    let lower = merchant.to_lowercase();
    CATEGORY_KEYWORDS
        .iter()
        .filter(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(category, _)| *category)
        .collect()
}

/// Build the warning list for a report.
///
/// Order: monthly total, category overlaps (table order), inactive
/// subscriptions (report order), savings tip.
pub fn generate_warnings(
    subscriptions: &[Subscription],
    total_monthly: f64,
    config: &DetectionConfig,
    now: DateTime<Utc>,
) -> Vec<String> {
    if subscriptions.is_empty() {
        return vec![NO_SUBSCRIPTIONS.to_string()];
    }

    let mut warnings = vec![format!(
        "You are spending approximately ${:.2} per month on subscriptions.",
        total_monthly
    )];

    warnings.extend(category_overlaps(subscriptions));

    for sub in subscriptions {
        if is_inactive(sub, config, now) {
            warnings.push(format!(
                "Subscription to '{}' seems inactive (last paid {}). Consider cancelling if you no longer use it.",
                sub.merchant,
                sub.last_occurrence.format("%Y-%m-%d")
            ));
        }
    }

    if total_monthly > config.savings_tip_threshold {
        let savings = round_cents(total_monthly * config.savings_rate);
        warnings.push(format!(
            "Tip: Cancelling just {:.0}% of your subscriptions could save you ${:.2} monthly!",
            config.savings_rate * 100.0,
            savings
        ));
    }

    warnings
}

/// One warning per category holding more than one distinct merchant
fn category_overlaps(subscriptions: &[Subscription]) -> Vec<String> {
    let mut warnings = Vec::new();

    for (category, _) in CATEGORY_KEYWORDS {
        let mut merchants: Vec<&str> = Vec::new();
        for sub in subscriptions {
            if categories_for(&sub.merchant).contains(category)
                && !merchants.contains(&sub.merchant.as_str())
            {
                merchants.push(&sub.merchant);
            }
        }

        if merchants.len() > 1 {
            warnings.push(format!(
                "You have multiple {} subscriptions: {}. Consider consolidating.",
                category,
                merchants.join(", ")
            ));
        }
    }

    warnings
}

/// Thin series whose last payment is older than the inactivity window
fn is_inactive(sub: &Subscription, config: &DetectionConfig, now: DateTime<Utc>) -> bool {
    if sub.occurrences >= config.inactive_max_occurrences {
        return false;
    }
    let last_paid = sub.last_occurrence.and_time(NaiveTime::MIN).and_utc();
    let elapsed_days = (now - last_paid).num_seconds() as f64 / 86_400.0;
    elapsed_days > config.inactive_after_days as f64
}
