use std::path::Path;

use anyhow::Context;

use crate::error::ReportError;
use crate::models::{ColumnMapping, DetailRecord, DirectoryEntry, SummaryRecord};

/// Parse the learner detail report.
///
/// The email is taken by position (`mapping.email_column`, zero-based) and
/// progress by header name, because the detail export has no stable header
/// for the email field.
pub fn read_detail(bytes: &[u8], mapping: &ColumnMapping) -> Result<Vec<DetailRecord>, ReportError> {
    let mut reader = csv::Reader::from_reader(bytes);
    let headers = reader.headers().map_err(|source| ReportError::Ingest {
        name: "learner detail",
        source,
    })?;

    let progress_idx = headers
        .iter()
        .position(|h| h == mapping.progress_column)
        .ok_or_else(|| {
            ReportError::Process(format!(
                "learner detail report has no '{}' column",
                mapping.progress_column
            ))
        })?;

    if headers.len() <= mapping.email_column {
        return Err(ReportError::Process(format!(
            "learner detail report has {} columns, email expected at position {}",
            headers.len(),
            mapping.email_column + 1
        )));
    }

    let mut records = Vec::new();
    for (row_idx, result) in reader.records().enumerate() {
        let row = result.map_err(|source| ReportError::Ingest {
            name: "learner detail",
            source,
        })?;

        let email = row.get(mapping.email_column).ok_or_else(|| {
            ReportError::Process(format!(
                "row {}: email column {} out of range",
                row_idx + 1,
                mapping.email_column + 1
            ))
        })?;

        let raw_progress = row.get(progress_idx).unwrap_or_default();
        let progress: f64 = raw_progress.parse().map_err(|_| {
            ReportError::Process(format!(
                "row {}: progress value '{}' is not numeric",
                row_idx + 1,
                raw_progress
            ))
        })?;

        records.push(DetailRecord {
            email: email.to_string(),
            progress,
        });
    }

    Ok(records)
}

/// Parse the learner summary report; only the activation flag matters.
pub fn read_summary(bytes: &[u8], mapping: &ColumnMapping) -> Result<Vec<SummaryRecord>, ReportError> {
    let mut reader = csv::Reader::from_reader(bytes);
    let headers = reader.headers().map_err(|source| ReportError::Ingest {
        name: "learner summary",
        source,
    })?;

    let activated_idx = headers
        .iter()
        .position(|h| h == mapping.activated_column)
        .ok_or_else(|| {
            ReportError::Process(format!(
                "learner summary report has no '{}' column",
                mapping.activated_column
            ))
        })?;

    let mut records = Vec::new();
    for (row_idx, result) in reader.records().enumerate() {
        let row = result.map_err(|source| ReportError::Ingest {
            name: "learner summary",
            source,
        })?;

        let raw = row.get(activated_idx).unwrap_or_default();
        let activated = parse_flag(raw).ok_or_else(|| {
            ReportError::Process(format!(
                "row {}: activation value '{}' is neither numeric nor boolean",
                row_idx + 1,
                raw
            ))
        })?;

        records.push(SummaryRecord { activated });
    }

    Ok(records)
}

/// The summary export writes the flag as 1/0 in some versions and
/// true/false in others; an empty cell means not activated.
fn parse_flag(raw: &str) -> Option<i64> {
    let value = raw.trim();
    if value.is_empty() {
        return Some(0);
    }
    if let Ok(n) = value.parse::<i64>() {
        return Some(n);
    }
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" => Some(1),
        "false" | "no" => Some(0),
        _ => None,
    }
}

/// Load the organizational directory from disk at startup.
///
/// Rows are kept verbatim, including entries with an empty department or
/// team; the aggregation step decides what counts as a usable match.
pub fn load_directory(path: &Path) -> anyhow::Result<Vec<DirectoryEntry>> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        email: String,
        department: String,
        team: String,
    }

    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open directory file {}", path.display()))?;
    let mut entries = Vec::new();

    for result in reader.deserialize::<CsvRow>() {
        let row = result.with_context(|| format!("malformed directory row in {}", path.display()))?;
        entries.push(DirectoryEntry {
            email: row.email,
            department: row.department,
            team: row.team,
        });
    }

    Ok(entries)
}
