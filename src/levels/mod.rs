//! Superposed medication level over a dose history.
//!
//! The level at an instant is the sum of every prior dose's independently
//! decaying residual; doses dated after the instant are ignored.

pub mod summary;

use crate::dosing::{sorted_by_time, DoseRecord};
use crate::models::{duration_from_hours, elapsed_hours, residual_level};
use chrono::{DateTime, Duration, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

pub use summary::SeriesSummary;

pub const DEFAULT_SERIES_INTERVAL_HOURS: f64 = 24.0;
pub const DEFAULT_PROJECTION_DAYS: i64 = 14;

/// Estimated aggregate level (mg) at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelSample {
    pub timestamp: DateTime<Utc>,
    pub level: f64,
}

/// Window and resolution for [`level_series`].
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesOptions {
    /// Defaults to the earliest dose.
    pub start: Option<DateTime<Utc>>,
    /// Defaults to the evaluation instant plus [`DEFAULT_PROJECTION_DAYS`].
    pub end: Option<DateTime<Utc>>,
    pub interval_hours: f64,
}

impl Default for SeriesOptions {
    fn default() -> Self {
        Self {
            start: None,
            end: None,
            interval_hours: DEFAULT_SERIES_INTERVAL_HOURS,
        }
    }
}

/// Level at `at`. Empty input gives exactly zero.
pub fn current_level(doses: &[DoseRecord], at: DateTime<Utc>) -> f64 {
    doses
        .iter()
        .filter(|dose| dose.timestamp <= at)
        .map(|dose| residual_level(dose.amount, elapsed_hours(dose.timestamp, at)))
        .sum()
}

pub fn current_level_now(doses: &[DoseRecord]) -> f64 {
    current_level(doses, Utc::now())
}

/// Level samples from `start` to `end` every `interval_hours`, projecting the
/// default window forward from the current time.
pub fn level_series(doses: &[DoseRecord], options: &SeriesOptions) -> Vec<LevelSample> {
    level_series_at(doses, options, Utc::now())
}

/// Same as [`level_series`] with an explicit evaluation instant `now`, which
/// only matters when `options.end` is unset.
///
/// A non-positive or non-finite interval yields at most the sample at
/// `start`; a window that ends before it starts yields nothing.
pub fn level_series_at(
    doses: &[DoseRecord],
    options: &SeriesOptions,
    now: DateTime<Utc>,
) -> Vec<LevelSample> {
    if doses.is_empty() {
        return Vec::new();
    }

    let sorted = sorted_by_time(doses);
    let start = match options.start.or_else(|| sorted.first().map(|dose| dose.timestamp)) {
        Some(start) => start,
        None => return Vec::new(),
    };
    let end = options
        .end
        .or_else(|| now.checked_add_signed(Duration::days(DEFAULT_PROJECTION_DAYS)))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);

    if start > end {
        debug!("Series window ends ({}) before it starts ({})", end, start);
        return Vec::new();
    }

    let step = match duration_from_hours(options.interval_hours) {
        Some(step) if step > Duration::zero() => step,
        _ => {
            warn!(
                "Series interval of {} hours is not usable; returning a single sample",
                options.interval_hours
            );
            return vec![sample_at(&sorted, start)];
        }
    };

    let mut samples = Vec::new();
    let mut time = start;
    while time <= end {
        samples.push(sample_at(&sorted, time));
        time = match time.checked_add_signed(step) {
            Some(next) => next,
            None => break,
        };
    }

    debug!(
        "Generated {} level samples from {} to {} every {} h",
        samples.len(),
        start,
        end,
        options.interval_hours
    );
    samples
}

fn sample_at(doses: &[DoseRecord], timestamp: DateTime<Utc>) -> LevelSample {
    LevelSample {
        timestamp,
        level: current_level(doses, timestamp),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HALF_LIFE_HOURS;
    use approx::assert_relative_eq;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 6, 8, 0, 0).unwrap()
    }

    fn weekly(amounts: &[f64]) -> Vec<DoseRecord> {
        amounts
            .iter()
            .enumerate()
            .map(|(week, &amount)| DoseRecord::new(amount, t0() + Duration::weeks(week as i64)))
            .collect()
    }

    #[test]
    fn test_empty_history_is_zero() {
        assert_eq!(current_level(&[], t0()), 0.0);
        assert_eq!(current_level_now(&[]), 0.0);
    }

    #[test]
    fn test_single_dose_level() {
        let doses = vec![DoseRecord::new(5.0, t0())];
        assert_relative_eq!(current_level(&doses, t0()), 5.0, epsilon = 1e-9);
        assert_relative_eq!(
            current_level(&doses, t0() + Duration::hours(120)),
            2.5,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_superposition() {
        let doses = weekly(&[2.5, 2.5]);
        let at = t0() + Duration::weeks(1);
        let expected = 2.5 + 2.5 * 0.5_f64.powf(168.0 / HALF_LIFE_HOURS);
        assert_relative_eq!(current_level(&doses, at), expected, epsilon = 1e-9);
    }

    #[test]
    fn test_future_doses_are_skipped() {
        let doses = vec![
            DoseRecord::new(2.5, t0()),
            DoseRecord::new(10.0, t0() + Duration::days(3)),
        ];
        let at = t0() + Duration::days(1);
        assert_relative_eq!(current_level(&doses, at), residual_level(2.5, 24.0), epsilon = 1e-9);
        assert_eq!(current_level(&doses, t0() - Duration::seconds(1)), 0.0);
    }

    #[test]
    fn test_negative_amounts_never_subtract() {
        let doses = vec![DoseRecord::new(5.0, t0()), DoseRecord::new(-5.0, t0())];
        assert_relative_eq!(current_level(&doses, t0()), 5.0, epsilon = 1e-9);
    }

    #[test]
    fn test_series_of_empty_history() {
        assert!(level_series(&[], &SeriesOptions::default()).is_empty());
    }

    #[test]
    fn test_series_default_window() {
        let doses = weekly(&[2.5]);
        let now = t0() + Duration::days(2);
        let series = level_series_at(&doses, &SeriesOptions::default(), now);

        // Day 0 through day 16 inclusive.
        assert_eq!(series.len(), 17);
        assert_eq!(series[0].timestamp, t0());
        assert_eq!(series.last().unwrap().timestamp, now + Duration::days(14));
        assert_relative_eq!(series[0].level, 2.5, epsilon = 1e-9);
    }

    #[test]
    fn test_series_ignores_caller_order() {
        let mut doses = weekly(&[2.5, 2.5, 5.0]);
        let now = t0() + Duration::weeks(3);
        let forward = level_series_at(&doses, &SeriesOptions::default(), now);
        doses.reverse();
        let backward = level_series_at(&doses, &SeriesOptions::default(), now);
        assert_eq!(forward, backward);
        assert_eq!(forward[0].timestamp, t0());
    }

    #[test]
    fn test_series_only_rises_across_doses() {
        let doses = weekly(&[2.5, 2.5, 5.0, 5.0]);
        let options = SeriesOptions {
            interval_hours: 6.0,
            ..SeriesOptions::default()
        };
        let series = level_series_at(&doses, &options, t0() + Duration::weeks(3));

        for pair in series.windows(2) {
            assert!(pair[0].level >= 0.0 && pair[1].level >= 0.0);
            if pair[1].level > pair[0].level {
                let crossed = doses
                    .iter()
                    .any(|d| d.timestamp > pair[0].timestamp && d.timestamp <= pair[1].timestamp);
                assert!(crossed, "level rose without a dose at {}", pair[1].timestamp);
            }
        }
    }

    #[test]
    fn test_finer_interval_is_not_shorter() {
        let doses = weekly(&[2.5, 5.0]);
        let options = |hours: f64| SeriesOptions {
            start: Some(t0()),
            end: Some(t0() + Duration::days(21)),
            interval_hours: hours,
        };

        let daily = level_series_at(&doses, &options(24.0), t0());
        let hourly = level_series_at(&doses, &options(1.0), t0());
        let weekly_series = level_series_at(&doses, &options(168.0), t0());

        assert_eq!(daily.len(), 22);
        assert_eq!(hourly.len(), 21 * 24 + 1);
        assert_eq!(weekly_series.len(), 4);
        assert!(hourly.len() >= daily.len() && daily.len() >= weekly_series.len());
    }

    #[test]
    fn test_explicit_window() {
        let doses = weekly(&[5.0]);
        let options = SeriesOptions {
            start: Some(t0() - Duration::days(2)),
            end: Some(t0() + Duration::days(1)),
            interval_hours: 24.0,
        };
        let series = level_series_at(&doses, &options, t0());

        let levels: Vec<f64> = series.iter().map(|s| s.level).collect();
        assert_eq!(levels.len(), 4);
        assert_eq!(levels[0], 0.0);
        assert_eq!(levels[1], 0.0);
        assert_relative_eq!(levels[2], 5.0, epsilon = 1e-9);
        assert_relative_eq!(levels[3], residual_level(5.0, 24.0), epsilon = 1e-9);
    }

    #[test]
    fn test_degenerate_requests() {
        let doses = weekly(&[5.0]);

        let inverted = SeriesOptions {
            start: Some(t0()),
            end: Some(t0() - Duration::hours(1)),
            interval_hours: 24.0,
        };
        assert!(level_series_at(&doses, &inverted, t0()).is_empty());

        for interval in [0.0, -6.0, f64::NAN, f64::INFINITY] {
            let options = SeriesOptions {
                interval_hours: interval,
                ..SeriesOptions::default()
            };
            let series = level_series_at(&doses, &options, t0());
            assert_eq!(series.len(), 1);
            assert_eq!(series[0].timestamp, t0());
        }
    }
}
