//! Row parser for search results
//!
//! Each result row is a fixed positional list:
//! `[first name, last name, office, <a href="path">label</a>, MM/DD/YYYY]`.
//! The link cell is matched lexically; this is the endpoint's row contract,
//! not general HTML parsing.

use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;
use tracing::{debug, warn};

use crate::{FilingCategory, FilingRecord, ROW_DATE_FORMAT};

const FIRST_NAME_IDX: usize = 0;
const LAST_NAME_IDX: usize = 1;
const OFFICE_IDX: usize = 2;
const LINK_IDX: usize = 3;
const DATE_IDX: usize = 4;

/// Minimum number of cells in a well-formed row
pub const ROW_LEN: usize = DATE_IDX + 1;

static LINK_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<a[^>]*href="([^"]+)"[^>]*>(.*?)</a>"#).unwrap()
});

/// Why a row was skipped
#[derive(Debug, Error)]
pub enum RowParseError {
    #[error("row has {0} fields, expected 5")]
    TooFewFields(usize),

    #[error("no filing link in cell: {0}")]
    MissingLink(String),

    #[error("invalid filing date '{value}': {source}")]
    InvalidDate {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

/// Parse one result row into a record.
///
/// `base_url` is the portal origin the relative filing path is joined to.
pub fn parse_row<S: AsRef<str>>(
    row: &[S],
    base_url: &str,
) -> Result<FilingRecord, RowParseError> {
    if row.len() < ROW_LEN {
        return Err(RowParseError::TooFewFields(row.len()));
    }

    let link_cell = row[LINK_IDX].as_ref();
    let captures = LINK_REGEX
        .captures(link_cell)
        .ok_or_else(|| RowParseError::MissingLink(link_cell.to_string()))?;
    let path = &captures[1];
    let label = captures[2].trim();

    let date_cell = row[DATE_IDX].as_ref().trim();
    let filing_date = NaiveDate::parse_from_str(date_cell, ROW_DATE_FORMAT).map_err(|source| {
        RowParseError::InvalidDate {
            value: date_cell.to_string(),
            source,
        }
    })?;

    Ok(FilingRecord::new(
        row[FIRST_NAME_IDX].as_ref(),
        row[LAST_NAME_IDX].as_ref(),
        row[OFFICE_IDX].as_ref(),
        filing_date,
        FilingCategory::from_label(label),
        base_url,
        path,
    ))
}

/// Parse a page of rows, skipping (and logging) the ones that fail
pub fn parse_rows<R: AsRef<[String]>>(rows: &[R], base_url: &str) -> Vec<FilingRecord> {
    let records: Vec<FilingRecord> = rows
        .iter()
        .filter_map(|row| match parse_row(row.as_ref(), base_url) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Skipping row {:?}: {}", row.as_ref(), e);
                None
            }
        })
        .collect();

    debug!("Parsed {} of {} rows", records.len(), rows.len());
    records
}
