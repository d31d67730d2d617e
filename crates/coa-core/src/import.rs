//! Ledger and correction file readers
//!
//! A ledger is either a table with an "Entry Name" header (and optionally an
//! "Account Type" column) or a raw sheet export where section headings such
//! as "Current Assets" or "Operating Expenses" sit above the entries. For raw
//! sheets the account type hint comes from the nearest heading above each row.

use std::io::Read;

use csv::{ReaderBuilder, StringRecord};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{HierarchyPath, LedgerRow, UNKNOWN};
use crate::normalize::{contains_whole_word, normalize_text};

/// Heading keywords, checked in this order within one row
const SECTION_KEYWORDS: &[(&[&str], &str)] = &[
    (&["assets", "asset"], "Asset"),
    (&["liabilities", "liability"], "Liability"),
    (&["equity"], "Equity"),
    (&["income", "revenue", "revenues"], "Income"),
    (&["expenses", "expense", "cost", "costs"], "Expense"),
];

const ENTRY_NAME_HEADER: &str = "entry name";
const ACCOUNT_TYPE_HEADER: &str = "account type";

/// Account type named by a row of cells, if any keyword appears
pub fn section_account_type(cells: &[String]) -> Option<&'static str> {
    let text = normalize_text(&cells.join(" "));
    if text.is_empty() {
        return None;
    }
    SECTION_KEYWORDS
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| contains_whole_word(&text, k)))
        .map(|(_, account_type)| *account_type)
}

/// Walk upward from the row above `index` and return the account type of the
/// nearest row containing a section keyword, or [`UNKNOWN`].
pub fn infer_account_type(rows: &[Vec<String>], index: usize) -> String {
    rows[..index.min(rows.len())]
        .iter()
        .rev()
        .find_map(|row| section_account_type(row))
        .unwrap_or(UNKNOWN)
        .to_string()
}

/// Read a ledger into rows to classify
pub fn parse_ledger<R: Read>(reader: R) -> Result<Vec<LedgerRow>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows: Vec<Vec<String>> = Vec::new();
    for result in rdr.records() {
        rows.push(record_cells(&result?));
    }

    let header_index = rows.iter().position(|r| r.iter().any(|c| !c.is_empty()));
    let Some(header_index) = header_index else {
        return Ok(Vec::new());
    };

    let header = &rows[header_index];
    let ledger = match column_index(header, ENTRY_NAME_HEADER) {
        Some(name_col) => {
            let type_col = column_index(header, ACCOUNT_TYPE_HEADER);
            parse_table(&rows, header_index, name_col, type_col)
        }
        None => parse_sheet(&rows),
    };

    debug!("Parsed {} ledger rows", ledger.len());
    Ok(ledger)
}

fn parse_table(
    rows: &[Vec<String>],
    header_index: usize,
    name_col: usize,
    type_col: Option<usize>,
) -> Vec<LedgerRow> {
    rows.iter()
        .enumerate()
        .skip(header_index + 1)
        .filter_map(|(i, row)| {
            let name = row.get(name_col).filter(|n| !n.is_empty())?;
            let account_type = type_col
                .and_then(|c| row.get(c))
                .filter(|t| !t.is_empty())
                .cloned()
                .unwrap_or_else(|| infer_account_type(rows, i));
            Some(LedgerRow {
                row_number: i + 1,
                entry_name: name.clone(),
                account_type_hint: account_type,
            })
        })
        .collect()
}

/// Raw sheet rows. A lone keyword cell is a section heading only when the
/// sheet carries amounts; in a names-only sheet every row is an entry.
fn parse_sheet(rows: &[Vec<String>]) -> Vec<LedgerRow> {
    let has_amounts = rows
        .iter()
        .any(|row| row.iter().filter(|c| !c.is_empty()).count() > 1);

    rows.iter()
        .enumerate()
        .filter_map(|(i, row)| {
            let non_empty: Vec<&String> = row.iter().filter(|c| !c.is_empty()).collect();
            let name = non_empty.first()?;
            if has_amounts && non_empty.len() == 1 {
                if let Some(account_type) = section_account_type(row) {
                    debug!(
                        "Row {}: '{}' read as {} section heading",
                        i + 1,
                        name,
                        account_type
                    );
                    return None;
                }
            }
            Some(LedgerRow {
                row_number: i + 1,
                entry_name: (*name).clone(),
                account_type_hint: infer_account_type(rows, i),
            })
        })
        .collect()
}

/// A confirmed classification read from a corrections file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Correction {
    pub entry_name: String,
    pub path: HierarchyPath,
}

/// Read corrections: Entry Name, Account Type, Primary, Secondary, Tertiary.
///
/// The first row is a header. Missing or empty levels become [`UNKNOWN`];
/// rows without an entry name are rejected.
pub fn parse_corrections<R: Read>(reader: R) -> Result<Vec<Correction>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut corrections = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        let record = result?;
        let cells = record_cells(&record);
        let entry_name = cells.first().filter(|n| !n.is_empty()).ok_or_else(|| {
            Error::Import(format!("Correction row {} has no entry name", i + 2))
        })?;
        let level = |idx: usize| {
            cells
                .get(idx)
                .filter(|v| !v.is_empty())
                .cloned()
                .unwrap_or_else(|| UNKNOWN.to_string())
        };
        corrections.push(Correction {
            entry_name: entry_name.clone(),
            path: HierarchyPath::new(level(1), level(2), level(3), level(4)),
        });
    }

    Ok(corrections)
}

fn record_cells(record: &StringRecord) -> Vec<String> {
    record.iter().map(|c| c.trim().to_string()).collect()
}

fn column_index(header: &[String], name: &str) -> Option<usize> {
    header.iter().position(|h| h.to_lowercase() == name)
}
