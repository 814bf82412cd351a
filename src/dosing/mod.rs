use crate::error::{PKError, PKResult};
use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One administered dose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoseRecord {
    /// Milligrams introduced at `timestamp`.
    pub amount: f64,
    pub timestamp: DateTime<Utc>,
}

impl DoseRecord {
    pub fn new(amount: f64, timestamp: DateTime<Utc>) -> Self {
        Self { amount, timestamp }
    }
}

/// Returns a copy of `doses` ordered by timestamp. The sort is stable, so
/// records sharing a timestamp keep their caller order.
pub fn sorted_by_time(doses: &[DoseRecord]) -> Vec<DoseRecord> {
    let mut sorted = doses.to_vec();
    sorted.sort_by_key(|dose| dose.timestamp);
    sorted
}

/// The most recent dose. Among equal timestamps the one given last wins.
pub fn most_recent(doses: &[DoseRecord]) -> Option<&DoseRecord> {
    doses
        .iter()
        .enumerate()
        .max_by_key(|(index, dose)| (dose.timestamp, *index))
        .map(|(_, dose)| dose)
}

/// A dose history held in ascending time order.
#[derive(Debug, Clone, Default)]
pub struct DoseHistory {
    pub records: Vec<DoseRecord>,
}

impl DoseHistory {
    pub fn new(mut records: Vec<DoseRecord>) -> Self {
        records.sort_by_key(|dose| dose.timestamp);
        Self { records }
    }

    /// Loads a history from a `.json` array or a `.csv` file with an
    /// `amount,timestamp` header.
    pub fn from_file<P: AsRef<Path>>(path: P) -> PKResult<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        let records = match extension.as_deref() {
            Some("json") => Self::read_json(path)?,
            Some("csv") => Self::read_csv(path)?,
            _ => {
                return Err(PKError::InvalidDosing(format!(
                    "Unsupported dose file type: {:?} (expected .json or .csv)",
                    path
                )))
            }
        };

        if let Some(dose) = records.iter().find(|dose| !dose.amount.is_finite()) {
            return Err(PKError::InvalidDosing(format!(
                "Dose at {} has a non-finite amount ({})",
                dose.timestamp, dose.amount
            )));
        }

        let negative = records.iter().filter(|dose| dose.amount < 0.0).count();
        if negative > 0 {
            warn!("{} dose(s) with a negative amount will contribute nothing", negative);
        }

        info!("Loaded {} dose(s) from {:?}", records.len(), path);
        Ok(Self::new(records))
    }

    fn read_json(path: &Path) -> PKResult<Vec<DoseRecord>> {
        let content = std::fs::read_to_string(path)?;
        let records: Vec<DoseRecord> = serde_json::from_str(&content)?;
        Ok(records)
    }

    fn read_csv(path: &Path) -> PKResult<Vec<DoseRecord>> {
        let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_path(path)?;
        let mut records = Vec::new();

        for row in reader.deserialize() {
            let row: CsvDoseRow = row?;
            let timestamp = DateTime::parse_from_rfc3339(&row.timestamp)?.with_timezone(&Utc);
            records.push(DoseRecord::new(row.amount, timestamp));
        }

        Ok(records)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn most_recent(&self) -> Option<&DoseRecord> {
        self.records.last()
    }

    pub fn as_slice(&self) -> &[DoseRecord] {
        &self.records
    }
}

#[derive(Debug, Deserialize)]
struct CsvDoseRow {
    amount: f64,
    timestamp: String,
}
