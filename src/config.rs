use crate::error::{PKError, PKResult};
use crate::levels::{SeriesOptions, DEFAULT_PROJECTION_DAYS, DEFAULT_SERIES_INTERVAL_HOURS};
use crate::schedule::{DEFAULT_INTERVAL_DAYS, DEFAULT_MINIMUM_FRACTION};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub series: SeriesConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    #[serde(default = "default_interval_days")]
    pub interval_days: f64,
    /// Fraction of the last dose below which the next dose is due.
    #[serde(default = "default_minimum_fraction")]
    pub minimum_fraction: f64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval_days: DEFAULT_INTERVAL_DAYS,
            minimum_fraction: DEFAULT_MINIMUM_FRACTION,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesConfig {
    #[serde(default = "default_series_interval_hours")]
    pub interval_hours: f64,
    /// How far past the evaluation instant the chart projects.
    #[serde(default = "default_projection_days")]
    pub projection_days: i64,
}

impl Default for SeriesConfig {
    fn default() -> Self {
        Self {
            interval_hours: DEFAULT_SERIES_INTERVAL_HOURS,
            projection_days: DEFAULT_PROJECTION_DAYS,
        }
    }
}

fn default_interval_days() -> f64 {
    DEFAULT_INTERVAL_DAYS
}

fn default_minimum_fraction() -> f64 {
    DEFAULT_MINIMUM_FRACTION
}

fn default_series_interval_hours() -> f64 {
    DEFAULT_SERIES_INTERVAL_HOURS
}

fn default_projection_days() -> i64 {
    DEFAULT_PROJECTION_DAYS
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> PKResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> PKResult<()> {
        self.validate_schedule()?;
        self.validate_series()?;
        Ok(())
    }

    fn validate_schedule(&self) -> PKResult<()> {
        let schedule = &self.schedule;

        if !schedule.interval_days.is_finite() || schedule.interval_days <= 0.0 {
            return Err(PKError::Validation(
                "Dosing interval must be a positive number of days".to_string()
            ));
        }

        if !(schedule.minimum_fraction > 0.0 && schedule.minimum_fraction <= 1.0) {
            return Err(PKError::Validation(format!(
                "Minimum fraction must lie in (0, 1], got {}",
                schedule.minimum_fraction
            )));
        }

        Ok(())
    }

    fn validate_series(&self) -> PKResult<()> {
        if !self.series.interval_hours.is_finite() || self.series.interval_hours <= 0.0 {
            return Err(PKError::Config(
                "Series interval must be a positive number of hours".to_string()
            ));
        }

        if self.series.projection_days < 0 {
            return Err(PKError::Config(
                "Projection window cannot be negative".to_string()
            ));
        }

        Ok(())
    }

    /// Series request covering the whole history up to the projection window.
    pub fn series_options(&self, at: DateTime<Utc>) -> SeriesOptions {
        SeriesOptions {
            start: None,
            end: Duration::try_days(self.series.projection_days)
                .and_then(|window| at.checked_add_signed(window)),
            interval_hours: self.series.interval_hours,
        }
    }
}
