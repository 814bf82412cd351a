//! Next-dose recommendation.
//!
//! The recommendation is the earlier of a fixed cadence after the most recent
//! dose and the moment that dose alone decays to a minimum fraction of itself.

use crate::dosing::{most_recent, DoseRecord};
use crate::models::{duration_from_hours, elapsed_hours, hours_to_fraction};
use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};

pub const DEFAULT_INTERVAL_DAYS: f64 = 7.0;
pub const DEFAULT_MINIMUM_FRACTION: f64 = 0.25;

/// Signed countdown to the next dose. Negative values mean overdue.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeUntilDose {
    /// Whole days, truncated toward zero.
    pub days: i64,
    /// Whole hours left over after `days`, truncated toward zero.
    pub hours: i64,
    pub total_hours: f64,
}

impl TimeUntilDose {
    pub fn from_hours(total_hours: f64) -> Self {
        Self {
            days: (total_hours / 24.0).trunc() as i64,
            hours: (total_hours % 24.0).trunc() as i64,
            total_hours,
        }
    }

    /// Countdown from `now` to `next`.
    pub fn time_until(next: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        Self::from_hours(elapsed_hours(now, next))
    }

    pub fn is_overdue(&self) -> bool {
        self.total_hours < 0.0
    }
}

/// Recommended date of the next dose, or `None` for an empty history.
///
/// `minimum_fraction` of 1 or more pins the floor to the last dose itself;
/// zero, negative or NaN fractions disable the floor and leave the cadence.
pub fn next_dose_date(
    doses: &[DoseRecord],
    interval_days: f64,
    minimum_fraction: f64,
) -> Option<DateTime<Utc>> {
    let last = most_recent(doses)?;

    let cadence = duration_from_hours(interval_days * 24.0)
        .and_then(|interval| last.timestamp.checked_add_signed(interval));

    let floor = if minimum_fraction > 0.0 {
        let hours = hours_to_fraction(minimum_fraction.min(1.0));
        duration_from_hours(hours).and_then(|offset| last.timestamp.checked_add_signed(offset))
    } else {
        None
    };

    debug!(
        "Next dose candidates after {}: cadence {:?}, {:.0}% floor {:?}",
        last.timestamp,
        cadence,
        minimum_fraction * 100.0,
        floor
    );

    match (cadence, floor) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (Some(a), None) => Some(a),
        (None, Some(b)) => Some(b),
        (None, None) => None,
    }
}

/// [`next_dose_date`] with the default minimum fraction.
pub fn next_dose_date_default(doses: &[DoseRecord]) -> Option<DateTime<Utc>> {
    next_dose_date(doses, DEFAULT_INTERVAL_DAYS, DEFAULT_MINIMUM_FRACTION)
}

pub fn time_until_next_dose(doses: &[DoseRecord], interval_days: f64) -> Option<TimeUntilDose> {
    time_until_next_dose_at(doses, interval_days, Utc::now())
}

/// Countdown from `now` to the recommended date, using the default minimum
/// fraction. Overdue doses give a negative duration.
pub fn time_until_next_dose_at(
    doses: &[DoseRecord],
    interval_days: f64,
    now: DateTime<Utc>,
) -> Option<TimeUntilDose> {
    let next = next_dose_date(doses, interval_days, DEFAULT_MINIMUM_FRACTION)?;
    Some(TimeUntilDose::time_until(next, now))
}
