//! Interval analysis and cadence classification

use chrono::{DateTime, Utc};

use crate::models::Frequency;

/// Whole-day gaps between consecutive (sorted) payment dates
pub fn gaps_in_days(dates: &[DateTime<Utc>]) -> Vec<i64> {
    dates
        .windows(2)
        .map(|w| (w[1] - w[0]).num_hours() / 24)
        .collect()
}

/// Mean gap, `None` for an empty slice
pub fn mean_gap(gaps: &[i64]) -> Option<f64> {
    if gaps.is_empty() {
        return None;
    }
    Some(gaps.iter().sum::<i64>() as f64 / gaps.len() as f64)
}

/// Regularity test for a series of gaps
///
/// A gap is on cadence when it lies within `tolerance * mean` of the mean.
/// The series is regular when the on-cadence share reaches `required_share`.
/// A single gap is trivially regular.
pub fn is_regular(gaps: &[i64], tolerance: f64, required_share: f64) -> bool {
    let Some(avg) = mean_gap(gaps) else {
        return false;
    };

    let allowed = avg * tolerance;
    let on_cadence = gaps
        .iter()
        .filter(|&&gap| (gap as f64 - avg).abs() <= allowed)
        .count();

    on_cadence as f64 / gaps.len() as f64 >= required_share
}

/// Map the mean gap to a cadence label.
///
/// Bands are inclusive and checked in order, so a 7-day mean lands on
/// biweekly before the weekly band is reached.
pub fn classify_frequency(gaps: &[i64]) -> Frequency {
    let Some(avg) = mean_gap(gaps) else {
        return Frequency::Irregular;
    };

    const BANDS: &[(f64, f64, Frequency)] = &[
        (25.0, 35.0, Frequency::Monthly),
        (80.0, 100.0, Frequency::Quarterly),
        (170.0, 190.0, Frequency::SemiAnnual),
        (350.0, 380.0, Frequency::Annual),
        (7.0, 14.0, Frequency::Biweekly),
        (1.0, 7.0, Frequency::Weekly),
    ];

    BANDS
        .iter()
        .find(|(lo, hi, _)| (*lo..=*hi).contains(&avg))
        .map(|(_, _, frequency)| *frequency)
        .unwrap_or(Frequency::Irregular)
}
