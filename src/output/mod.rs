use crate::config::Config;
use crate::dosing::{DoseHistory, DoseRecord};
use crate::error::PKResult;
use crate::levels::{current_level, level_series_at, LevelSample, SeriesSummary};
use crate::models::{elapsed_hours, residual_level};
use crate::remaining::percentage_remaining;
use crate::schedule::{next_dose_date, TimeUntilDose};
use chrono::{DateTime, SecondsFormat, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

/// Every engine output for one dose history at one instant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelReport {
    pub evaluated_at: DateTime<Utc>,
    pub doses: Vec<DoseRecord>,
    pub current_level: f64,
    pub percentage_remaining: f64,
    pub next_dose: Option<DateTime<Utc>>,
    pub time_until_next_dose: Option<TimeUntilDose>,
    pub series: Vec<LevelSample>,
    pub summary: SeriesSummary,
}

impl LevelReport {
    pub fn build(history: &DoseHistory, config: &Config, at: DateTime<Utc>) -> Self {
        let doses = history.as_slice();
        let next_dose = next_dose_date(
            doses,
            config.schedule.interval_days,
            config.schedule.minimum_fraction,
        );
        let series = level_series_at(doses, &config.series_options(at), at);
        let summary = SeriesSummary::from_samples(&series);

        Self {
            evaluated_at: at,
            doses: doses.to_vec(),
            current_level: current_level(doses, at),
            percentage_remaining: percentage_remaining(doses, at),
            next_dose,
            time_until_next_dose: next_dose.map(|next| TimeUntilDose::time_until(next, at)),
            series,
            summary,
        }
    }
}

pub fn save_results<P: AsRef<Path>>(report: &LevelReport, output_dir: P) -> PKResult<()> {
    let output_path = output_dir.as_ref();

    save_level_series(&report.series, &output_path.join("levels.csv"))?;
    save_dose_residuals(report, &output_path.join("doses.csv"))?;
    save_report_json(report, &output_path.join("report.json"))?;
    generate_report(report, output_path)?;

    info!("All results saved to {:?}", output_path);
    Ok(())
}

fn save_level_series<P: AsRef<Path>>(series: &[LevelSample], path: P) -> PKResult<()> {
    let mut writer = csv::Writer::from_path(path)?;

    writer.write_record(["TIMESTAMP", "LEVEL_MG"])?;

    for sample in series {
        writer.write_record(&[format_time(&sample.timestamp), format!("{:.4}", sample.level)])?;
    }

    writer.flush()?;
    Ok(())
}

fn save_dose_residuals<P: AsRef<Path>>(report: &LevelReport, path: P) -> PKResult<()> {
    let mut writer = csv::Writer::from_path(path)?;

    writer.write_record(["TIMESTAMP", "AMOUNT_MG", "RESIDUAL_MG"])?;

    for dose in &report.doses {
        // Doses after the evaluation instant have not started decaying yet.
        let residual = if dose.timestamp <= report.evaluated_at {
            residual_level(dose.amount, elapsed_hours(dose.timestamp, report.evaluated_at))
        } else {
            0.0
        };

        writer.write_record(&[
            format_time(&dose.timestamp),
            dose.amount.to_string(),
            format!("{:.4}", residual),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

fn save_report_json<P: AsRef<Path>>(report: &LevelReport, path: P) -> PKResult<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, report)?;
    Ok(())
}

/// Writes a human-readable `report.md` into `output_dir`.
pub fn generate_report<P: AsRef<Path>>(report: &LevelReport, output_dir: P) -> PKResult<()> {
    let report_path = output_dir.as_ref().join("report.md");

    let next_dose = match report.next_dose {
        Some(next) => format_time(&next),
        None => "no dose history".to_string(),
    };

    let countdown = match report.time_until_next_dose {
        Some(left) if left.is_overdue() => format!(
            "overdue by {}d {}h ({:.1} h)",
            -left.days, -left.hours, -left.total_hours
        ),
        Some(left) => format!("{}d {}h ({:.1} h)", left.days, left.hours, left.total_hours),
        None => "n/a".to_string(),
    };

    let peak_time = report
        .summary
        .peak_time
        .map(|t| format_time(&t))
        .unwrap_or_else(|| "n/a".to_string());

    let report_content = format!(
        r#"# Medication Level Report

Evaluated at {}

## Current Status
- **Doses on record**: {}
- **Estimated level**: {:.3} mg
- **Remaining of last dose**: {:.1}%
- **Next dose**: {}
- **Time until next dose**: {}

## Level Chart Window
- **Samples**: {}
- **Peak**: {:.3} mg at {}
- **Trough**: {:.3} mg
- **Mean**: {:.3} mg
- **Exposure**: {:.1} mg*h

## Files Generated
- `levels.csv`: Level samples for charting
- `doses.csv`: Dose history with residual amount at evaluation time
- `report.json`: All values above in machine-readable form
"#,
        format_time(&report.evaluated_at),
        report.doses.len(),
        report.current_level,
        report.percentage_remaining,
        next_dose,
        countdown,
        report.summary.n_samples,
        report.summary.peak_level,
        peak_time,
        report.summary.trough_level,
        report.summary.mean_level,
        report.summary.level_hours,
    );

    std::fs::write(report_path, report_content)?;
    Ok(())
}

fn format_time(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, true)
}
