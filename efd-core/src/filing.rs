//! Filing records produced by the row parser
//!
//! A record's category comes from the label text of the result link, its
//! content format from the link's path. Both classifications fall back to
//! `Unknown` rather than failing.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Disclosure type of a filing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilingCategory {
    /// Yearly statement of assets, income and liabilities
    AnnualReport,
    /// Report of individual securities transactions (PTR)
    PeriodicTransactionReport,
    /// Label did not match a known category
    Unknown,
}

impl FilingCategory {
    /// Numeric report type understood by the search endpoint
    pub fn report_type_id(self) -> Option<u32> {
        match self {
            Self::AnnualReport => Some(7),
            Self::PeriodicTransactionReport => Some(11),
            Self::Unknown => None,
        }
    }

    /// Classify a result link label (case-insensitive substring match)
    pub fn from_label(label: &str) -> Self {
        let lower = label.to_lowercase();
        if lower.contains("annual report") {
            Self::AnnualReport
        } else if lower.contains("periodic transaction report") {
            Self::PeriodicTransactionReport
        } else {
            warn!("Unknown filing category: {}", label);
            Self::Unknown
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::AnnualReport => "annual_report",
            Self::PeriodicTransactionReport => "periodic_transaction_report",
            Self::Unknown => "unknown",
        }
    }
}

/// How a filing's underlying document is stored on the portal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentFormat {
    /// Electronically filed, served as an HTML document
    StructuredDocument,
    /// Scanned paper filing; text needs OCR
    PaperScan,
    /// Path matched neither pattern
    Unknown,
}

impl ContentFormat {
    /// Classify a filing path (case-insensitive substring match)
    pub fn from_path(path: &str) -> Self {
        let lower = path.to_lowercase();
        if lower.contains("ptr") || lower.contains("annual") {
            Self::StructuredDocument
        } else if lower.contains("paper") {
            Self::PaperScan
        } else {
            warn!("Unknown filing format: {}", path);
            Self::Unknown
        }
    }
}

/// One filing returned by the portal search
///
/// Records are only built by [`crate::parse_row`] and are never mutated; the
/// filing URL identifies a record downstream. Deserializing derives the
/// content format from the URL again; a stored `format` is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "StoredRecord")]
pub struct FilingRecord {
    first_name: String,
    last_name: String,
    office: String,
    filing_date: NaiveDate,
    category: FilingCategory,
    url: String,
    format: ContentFormat,
}

impl FilingRecord {
    /// Build a record; the content format is derived from `path`.
    pub(crate) fn new(
        first_name: &str,
        last_name: &str,
        office: &str,
        filing_date: NaiveDate,
        category: FilingCategory,
        base_url: &str,
        path: &str,
    ) -> Self {
        Self {
            first_name: first_name.trim().to_string(),
            last_name: last_name.trim().to_string(),
            office: office.trim().to_string(),
            filing_date,
            category,
            url: format!("{}{}", base_url.trim_end_matches('/'), path),
            format: ContentFormat::from_path(path),
        }
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    /// Office or title of the filer
    pub fn office(&self) -> &str {
        &self.office
    }

    pub fn filing_date(&self) -> NaiveDate {
        self.filing_date
    }

    pub fn category(&self) -> FilingCategory {
        self.category
    }

    /// Absolute filing URL
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn format(&self) -> ContentFormat {
        self.format
    }

    /// URL path, without scheme and host
    fn path(&self) -> &str {
        let rest = self.url.split_once("://").map_or(self.url.as_str(), |(_, r)| r);
        rest.find('/').map_or("", |idx| &rest[idx..])
    }

    /// Portal report identifier: the last non-empty path segment of the URL
    pub fn filing_id(&self) -> &str {
        self.url
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default()
    }
}

/// Serialized form of a record, before the format is derived
#[derive(Deserialize)]
struct StoredRecord {
    first_name: String,
    last_name: String,
    office: String,
    filing_date: NaiveDate,
    category: FilingCategory,
    url: String,
}

impl From<StoredRecord> for FilingRecord {
    fn from(stored: StoredRecord) -> Self {
        let mut record = Self {
            first_name: stored.first_name,
            last_name: stored.last_name,
            office: stored.office,
            filing_date: stored.filing_date,
            category: stored.category,
            url: stored.url,
            format: ContentFormat::Unknown,
        };
        record.format = ContentFormat::from_path(record.path());
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_label() {
        assert_eq!(
            FilingCategory::from_label("Annual Report for CY 2022"),
            FilingCategory::AnnualReport
        );
        assert_eq!(
            FilingCategory::from_label("PERIODIC TRANSACTION REPORT for 01/03/2023"),
            FilingCategory::PeriodicTransactionReport
        );
        assert_eq!(
            FilingCategory::from_label("Extension Notice"),
            FilingCategory::Unknown
        );
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            ContentFormat::from_path("/search/view/ptr/abc/"),
            ContentFormat::StructuredDocument
        );
        assert_eq!(
            ContentFormat::from_path("/search/view/ANNUAL/abc/"),
            ContentFormat::StructuredDocument
        );
        assert_eq!(
            ContentFormat::from_path("/search/view/paper/abc/"),
            ContentFormat::PaperScan
        );
        assert_eq!(
            ContentFormat::from_path("/search/view/extension-notice/abc/"),
            ContentFormat::Unknown
        );
    }

    #[test]
    fn test_report_type_ids() {
        assert_eq!(FilingCategory::AnnualReport.report_type_id(), Some(7));
        assert_eq!(FilingCategory::PeriodicTransactionReport.report_type_id(), Some(11));
        assert_eq!(FilingCategory::Unknown.report_type_id(), None);
    }

    #[test]
    fn test_record_url_and_id() {
        let record = FilingRecord::new(
            " Jane ",
            "Doe",
            "Senator",
            NaiveDate::from_ymd_opt(2023, 1, 15).unwrap(),
            FilingCategory::PeriodicTransactionReport,
            "https://efdsearch.senate.gov/",
            "/search/view/ptr/abc123/",
        );

        assert_eq!(record.first_name(), "Jane");
        assert_eq!(record.url(), "https://efdsearch.senate.gov/search/view/ptr/abc123/");
        assert_eq!(record.filing_id(), "abc123");
        assert_eq!(record.format(), ContentFormat::StructuredDocument);
    }

    #[test]
    fn test_record_serializes_snake_case() {
        let record = FilingRecord::new(
            "Jane",
            "Doe",
            "Senator",
            NaiveDate::from_ymd_opt(2023, 1, 15).unwrap(),
            FilingCategory::AnnualReport,
            "https://efdsearch.senate.gov",
            "/search/view/paper/xyz/",
        );

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["category"], "annual_report");
        assert_eq!(json["format"], "paper_scan");
        assert_eq!(json["filing_date"], "2023-01-15");
    }

    #[test]
    fn test_record_loads_from_saved_json() {
        let record = FilingRecord::new(
            "Jane",
            "Doe",
            "Senator",
            NaiveDate::from_ymd_opt(2023, 1, 15).unwrap(),
            FilingCategory::PeriodicTransactionReport,
            "https://efdsearch.senate.gov",
            "/search/view/ptr/abc123/",
        );

        let json = serde_json::to_string(&record).unwrap();
        let loaded: FilingRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded, record);
    }

    #[test]
    fn test_loaded_format_follows_url() {
        let json = r#"{
            "first_name": "John",
            "last_name": "Smith",
            "office": "Senator",
            "filing_date": "2014-05-02",
            "category": "annual_report",
            "url": "https://efdsearch.senate.gov/search/view/paper/F00D/",
            "format": "structured_document"
        }"#;

        let record: FilingRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.format(), ContentFormat::PaperScan);
        assert_eq!(record.filing_id(), "F00D");
    }
}
