//! CSV export.
//!
//! Company name and job role are wrapped in double quotes without escaping
//! embedded quotes; a value containing `"` produces a malformed cell.

use chrono::NaiveDate;
use thiserror::Error;

use crate::record::JobRecord;

pub const CSV_HEADER: &str = "Company Name,Job Role,Application Date,Status";

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ExportError {
    /// Nothing to export; callers should notify the user instead of writing a file.
    #[error("no jobs to export")]
    NoData,
}

/// Render records as CSV text (header row, then one row per record,
/// newline-joined with no trailing newline).
pub fn to_csv(records: &[JobRecord]) -> Result<String, ExportError> {
    if records.is_empty() {
        return Err(ExportError::NoData);
    }

    let rows = records.iter().map(|record| {
        format!(
            "\"{}\",\"{}\",{},{}",
            record.company_name(),
            record.job_role(),
            record.application_date(),
            record.status_label()
        )
    });

    Ok(std::iter::once(CSV_HEADER.to_string())
        .chain(rows)
        .collect::<Vec<_>>()
        .join("\n"))
}

/// `job-applications-<YYYY-MM-DD>.csv`
pub fn export_file_name(date: NaiveDate) -> String {
    format!("job-applications-{}.csv", date.format("%Y-%m-%d"))
}
