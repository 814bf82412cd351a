//! Peak, trough, mean and exposure of a level series.

use super::LevelSample;
use crate::models::elapsed_hours;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Chart annotations for a level series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesSummary {
    pub n_samples: usize,
    pub peak_level: f64,
    pub peak_time: Option<DateTime<Utc>>,
    pub trough_level: f64,
    pub mean_level: f64,
    /// Area under the level curve in mg*h (trapezoidal rule).
    pub level_hours: f64,
}

impl SeriesSummary {
    pub fn from_samples(samples: &[LevelSample]) -> Self {
        let levels: Vec<f64> = samples.iter().map(|s| s.level).collect();

        // First sample wins ties so the peak points at the dose that caused it.
        let peak = samples.iter().fold(None::<&LevelSample>, |best, sample| match best {
            Some(b) if b.level >= sample.level => Some(b),
            _ => Some(sample),
        });

        let trough = levels.iter().copied().fold(f64::INFINITY, f64::min);

        Self {
            n_samples: samples.len(),
            peak_level: peak.map(|s| s.level).unwrap_or(0.0),
            peak_time: peak.map(|s| s.timestamp),
            trough_level: if trough.is_finite() { trough } else { 0.0 },
            mean_level: mean(&levels),
            level_hours: area_under_curve(samples),
        }
    }
}

fn area_under_curve(samples: &[LevelSample]) -> f64 {
    samples
        .windows(2)
        .map(|pair| {
            let dt = elapsed_hours(pair[0].timestamp, pair[1].timestamp);
            dt * (pair[0].level + pair[1].level) / 2.0
        })
        .sum()
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{Duration, TimeZone};

    fn samples(levels: &[f64]) -> Vec<LevelSample> {
        let start = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        levels
            .iter()
            .enumerate()
            .map(|(i, &level)| LevelSample {
                timestamp: start + Duration::hours(24 * i as i64),
                level,
            })
            .collect()
    }

    #[test]
    fn test_empty_summary() {
        let summary = SeriesSummary::from_samples(&[]);
        assert_eq!(summary.n_samples, 0);
        assert_eq!(summary.peak_level, 0.0);
        assert_eq!(summary.peak_time, None);
        assert_eq!(summary.trough_level, 0.0);
        assert_eq!(summary.mean_level, 0.0);
        assert_eq!(summary.level_hours, 0.0);
    }

    #[test]
    fn test_summary_statistics() {
        let series = samples(&[0.0, 4.0, 2.0, 4.0]);
        let summary = SeriesSummary::from_samples(&series);

        assert_eq!(summary.n_samples, 4);
        assert_relative_eq!(summary.peak_level, 4.0);
        assert_eq!(summary.peak_time, Some(series[1].timestamp));
        assert_relative_eq!(summary.trough_level, 0.0);
        assert_relative_eq!(summary.mean_level, 2.5);
        // 24 * (2 + 3 + 3)
        assert_relative_eq!(summary.level_hours, 192.0, epsilon = 1e-9);
    }
}
