//! Export of classified rows and the match log
//!
//! Supports:
//! - Classification export as CSV (one row per ledger entry) or JSON
//! - Match log export as pretty-printed JSON

use std::io::Write;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::models::{ClassifiedRow, MatchLogEntry};

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(Error::InvalidData(format!("Unknown export format: {}", other))),
        }
    }
}

/// Flat view of a classified row, shared by both formats
#[derive(Debug, Clone, Serialize)]
pub struct ClassificationExport {
    #[serde(rename = "Entry Name")]
    pub entry_name: String,
    #[serde(rename = "Account Type")]
    pub account_type: String,
    #[serde(rename = "Primary Classification")]
    pub primary: String,
    #[serde(rename = "Secondary Classification")]
    pub secondary: String,
    #[serde(rename = "Tertiary Classification")]
    pub tertiary: String,
    #[serde(rename = "Confidence")]
    pub confidence: String,
    #[serde(rename = "Match Type")]
    pub match_type: String,
    #[serde(rename = "Match Source")]
    pub match_source: String,
    /// Sheet the entry is filed under in the workbook this feeds
    #[serde(rename = "Master Sheet")]
    pub master_sheet: String,
}

impl From<&ClassifiedRow> for ClassificationExport {
    fn from(row: &ClassifiedRow) -> Self {
        let c = &row.classification;
        Self {
            entry_name: row.row.entry_name.clone(),
            account_type: c.account_type.clone(),
            primary: c.primary.clone(),
            secondary: c.secondary.clone(),
            tertiary: c.tertiary.clone(),
            confidence: format!("{:.2}", c.confidence),
            match_type: c.match_type.to_string(),
            match_source: c.match_source.to_string(),
            master_sheet: master_sheet_name(&c.account_type),
        }
    }
}

pub fn master_sheet_name(account_type: &str) -> String {
    format!("{} Master Sheet", account_type)
}

/// Write classified rows in the requested format
pub fn export_classifications<W: Write>(
    writer: W,
    rows: &[ClassifiedRow],
    format: ExportFormat,
) -> Result<()> {
    let records: Vec<ClassificationExport> = rows.iter().map(ClassificationExport::from).collect();

    match format {
        ExportFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(writer);
            if records.is_empty() {
                // serde only emits headers alongside the first record
                wtr.write_record(CSV_HEADERS)?;
            }
            for record in &records {
                wtr.serialize(record)?;
            }
            wtr.flush()?;
        }
        ExportFormat::Json => {
            serde_json::to_writer_pretty(writer, &records)?;
        }
    }

    Ok(())
}

const CSV_HEADERS: [&str; 9] = [
    "Entry Name",
    "Account Type",
    "Primary Classification",
    "Secondary Classification",
    "Tertiary Classification",
    "Confidence",
    "Match Type",
    "Match Source",
    "Master Sheet",
];

/// Write the match log as pretty JSON
pub fn export_match_log<W: Write>(writer: W, log: &[MatchLogEntry]) -> Result<()> {
    serde_json::to_writer_pretty(writer, log)?;
    Ok(())
}
