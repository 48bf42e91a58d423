//! Split records as CSV with the header `Mile,Time,Pace,Split,Note`.

use std::error;
use std::fmt;
use std::io;
use std::sync::Arc;

use model::pace::{DistanceTimeSample, SplitRecord};
use serde::{Deserialize, Serialize};
use utility::time::{format_pace, format_race_time, race_time_or_zero};

#[derive(Debug, Clone)]
pub enum SheetError {
    Csv(Arc<csv::Error>),
    InvalidRow { line: usize, reason: String },
}

impl error::Error for SheetError {}

impl fmt::Display for SheetError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SheetError::Csv(e) => write!(f, "CSV error: {}", e),
            SheetError::InvalidRow { line, reason } => {
                write!(f, "Invalid row in line {}: {}", line, reason)
            }
        }
    }
}

impl From<csv::Error> for SheetError {
    fn from(e: csv::Error) -> Self {
        SheetError::Csv(Arc::new(e))
    }
}

impl From<io::Error> for SheetError {
    fn from(e: io::Error) -> Self {
        SheetError::Csv(Arc::new(e.into()))
    }
}

#[derive(Debug, Serialize)]
struct SheetRow<'a> {
    #[serde(rename = "Mile")]
    mile: String,
    #[serde(rename = "Time")]
    time: String,
    #[serde(rename = "Pace")]
    pace: String,
    #[serde(rename = "Split")]
    split: String,
    #[serde(rename = "Note")]
    note: &'a str,
}

#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(rename = "Mile")]
    mile: String,
    #[serde(rename = "Time", default)]
    time: String,
    #[serde(rename = "Note", default)]
    note: Option<String>,
}

pub fn write_splits<W: io::Write>(writer: W, records: &[SplitRecord]) -> Result<(), SheetError> {
    let mut writer = csv::Writer::from_writer(writer);
    if records.is_empty() {
        writer.write_record(["Mile", "Time", "Pace", "Split", "Note"])?;
    }
    for record in records {
        writer.serialize(SheetRow {
            mile: format!("{:.2}", record.distance),
            time: format_race_time(&record.elapsed),
            pace: format_pace(record.pace),
            split: format_race_time(&record.split),
            note: record.note.as_deref().unwrap_or_default(),
        })?;
    }
    writer.flush()?;
    Ok(())
}

/// One row per record, in the given order.
pub fn export_splits(records: &[SplitRecord]) -> Result<String, SheetError> {
    let mut buffer = Vec::new();
    write_splits(&mut buffer, records)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Reads samples back from a sheet. Pace and split columns are derived data
/// and ignored; a malformed time counts as zero, a malformed mile rejects the
/// whole sheet.
pub fn read_samples<R: io::Read>(reader: R) -> Result<Vec<DistanceTimeSample>, SheetError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut samples = Vec::new();
    for (index, row) in reader.deserialize::<RawRow>().enumerate() {
        // header is line 1
        let line = index + 2;
        let row = row?;
        let distance = row
            .mile
            .parse::<f64>()
            .ok()
            .filter(|mile| mile.is_finite() && *mile >= 0.0)
            .ok_or_else(|| SheetError::InvalidRow {
                line,
                reason: format!("'{}' is not a distance in miles", row.mile),
            })?;
        let note = row.note.filter(|note| !note.is_empty());
        samples.push(DistanceTimeSample::new(distance, race_time_or_zero(&row.time)).with_note(note));
    }
    log::debug!("Read {} samples from split sheet.", samples.len());
    Ok(samples)
}

pub fn import_samples(content: &str) -> Result<Vec<DistanceTimeSample>, SheetError> {
    read_samples(content.as_bytes())
}
