//! Medication level estimation for weekly GLP-1 injections.
//!
//! Models the active amount left from a history of doses with a fixed
//! half-life, sums overlapping doses, and derives the next recommended dose
//! date and a percentage-remaining gauge from that model. All engine
//! functions are pure and never fail; empty or invalid input maps to zero,
//! an empty series or `None`.

pub mod config;
pub mod dosing;
pub mod error;
pub mod levels;
pub mod models;
pub mod output;
pub mod remaining;
pub mod schedule;

pub use config::Config;
pub use dosing::{DoseHistory, DoseRecord};
pub use error::{PKError, PKResult};
pub use levels::{
    current_level, current_level_now, level_series, level_series_at, LevelSample, SeriesOptions,
    SeriesSummary,
};
pub use models::{residual_level, HALF_LIFE_HOURS};
pub use remaining::{percentage_remaining, percentage_remaining_now};
pub use schedule::{
    next_dose_date, next_dose_date_default, time_until_next_dose, time_until_next_dose_at,
    TimeUntilDose,
};
