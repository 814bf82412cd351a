//! Single-dose first-order elimination.
//!
//! Every dose decays independently with a fixed half-life:
//! `level = amount * 0.5^(hours / HALF_LIFE_HOURS)`.

use chrono::{DateTime, Duration, Utc};

/// Elimination half-life of the modelled drug class (5 days).
pub const HALF_LIFE_HOURS: f64 = 120.0;

const MS_PER_HOUR: f64 = 3_600_000.0;

/// Residual amount (mg) of a single dose after `hours_elapsed`.
///
/// A negative amount or negative elapsed time contributes nothing. The result
/// is floored at zero, which also maps NaN input to zero.
pub fn residual_level(amount: f64, hours_elapsed: f64) -> f64 {
    if amount < 0.0 || hours_elapsed < 0.0 {
        return 0.0;
    }

    let level = amount * 0.5_f64.powf(hours_elapsed / HALF_LIFE_HOURS);
    level.max(0.0)
}

/// Hours after administration at which a dose has decayed to `fraction` of
/// its initial amount. Independent of the amount itself.
///
/// `fraction` of 1 gives 0 hours; values in (0, 1) give a positive time;
/// 0 gives infinity and negative or NaN input gives NaN.
pub fn hours_to_fraction(fraction: f64) -> f64 {
    HALF_LIFE_HOURS * fraction.ln() / 0.5_f64.ln()
}

/// Signed hours from `from` to `to`, millisecond resolution.
pub fn elapsed_hours(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / MS_PER_HOUR
}

/// Converts fractional hours into a `Duration`, or `None` when the value is
/// not finite or does not fit.
pub fn duration_from_hours(hours: f64) -> Option<Duration> {
    if !hours.is_finite() {
        return None;
    }
    let millis = (hours * MS_PER_HOUR).round();
    if millis.abs() >= i64::MAX as f64 {
        return None;
    }
    Duration::try_milliseconds(millis as i64)
}
