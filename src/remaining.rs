//! Percentage-remaining gauge relative to the most recent dose.

use crate::dosing::{most_recent, DoseRecord};
use crate::levels::current_level;
use chrono::{DateTime, Utc};

/// Current level as a percentage of the most recent dose, clamped to
/// `[0, 100]`. Residual from earlier doses can push the raw ratio past 100;
/// the gauge still reads full.
pub fn percentage_remaining(doses: &[DoseRecord], at: DateTime<Utc>) -> f64 {
    let last_amount = match most_recent(doses) {
        Some(dose) => dose.amount,
        None => return 0.0,
    };

    // Also covers NaN, infinite and negative amounts.
    if !(last_amount > 0.0 && last_amount.is_finite()) {
        return 0.0;
    }

    let percentage = current_level(doses, at) / last_amount * 100.0;
    percentage.clamp(0.0, 100.0)
}

pub fn percentage_remaining_now(doses: &[DoseRecord]) -> f64 {
    percentage_remaining(doses, Utc::now())
}
