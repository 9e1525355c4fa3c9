//! Search filters and their wire translation

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::{FilingCategory, SEARCH_DATE_FORMAT};

/// Caller-supplied search restrictions
///
/// Fields left as `None` keep the endpoint defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilters {
    /// Filing categories to request
    pub categories: Option<Vec<FilingCategory>>,
    /// Earliest submission time (inclusive)
    pub start: Option<NaiveDateTime>,
    /// Latest submission time (inclusive)
    pub end: Option<NaiveDateTime>,
}

impl SearchFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_categories(mut self, categories: &[FilingCategory]) -> Self {
        self.categories = Some(categories.to_vec());
        self
    }

    /// Cover whole days: `from` at 00:00:00 through `to` at 23:59:59
    pub fn with_date_range(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        self.start = from.and_hms_opt(0, 0, 0);
        self.end = to.and_hms_opt(23, 59, 59);
        self
    }

    pub fn with_start(mut self, start: NaiveDateTime) -> Self {
        self.start = Some(start);
        self
    }

    pub fn with_end(mut self, end: NaiveDateTime) -> Self {
        self.end = Some(end);
        self
    }

    /// Wire parameters to overlay on the default search table
    pub fn to_search_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();

        if let Some(categories) = &self.categories {
            let ids: Vec<String> = categories
                .iter()
                .filter_map(|c| c.report_type_id())
                .map(|id| id.to_string())
                .collect();
            if !ids.is_empty() {
                params.push(("report_types".to_string(), format!("[{}]", ids.join(", "))));
            }
        }
        if let Some(start) = self.start {
            params.push((
                "submitted_start_date".to_string(),
                start.format(SEARCH_DATE_FORMAT).to_string(),
            ));
        }
        if let Some(end) = self.end {
            params.push((
                "submitted_end_date".to_string(),
                end.format(SEARCH_DATE_FORMAT).to_string(),
            ));
        }

        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
        params.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_empty_filters() {
        assert!(SearchFilters::new().to_search_params().is_empty());
    }

    #[test]
    fn test_ptr_with_date_range() {
        let filters = SearchFilters::new()
            .with_categories(&[FilingCategory::PeriodicTransactionReport])
            .with_date_range(
                NaiveDate::from_ymd_opt(2025, 10, 1).unwrap(),
                NaiveDate::from_ymd_opt(2025, 10, 31).unwrap(),
            );
        let params = filters.to_search_params();

        assert_eq!(lookup(&params, "report_types"), Some("[11]"));
        assert_eq!(lookup(&params, "submitted_start_date"), Some("10/01/2025 00:00:00"));
        assert_eq!(lookup(&params, "submitted_end_date"), Some("10/31/2025 23:59:59"));
    }

    #[test]
    fn test_both_categories() {
        let params = SearchFilters::new()
            .with_categories(&[
                FilingCategory::AnnualReport,
                FilingCategory::PeriodicTransactionReport,
            ])
            .to_search_params();
        assert_eq!(lookup(&params, "report_types"), Some("[7, 11]"));
    }

    #[test]
    fn test_unknown_category_only_leaves_default() {
        let params = SearchFilters::new()
            .with_categories(&[FilingCategory::Unknown])
            .to_search_params();
        assert_eq!(lookup(&params, "report_types"), None);
    }

    #[test]
    fn test_explicit_start_time() {
        let start = NaiveDate::from_ymd_opt(2024, 2, 3)
            .unwrap()
            .and_hms_opt(8, 30, 5)
            .unwrap();
        let params = SearchFilters::new().with_start(start).to_search_params();
        assert_eq!(lookup(&params, "submitted_start_date"), Some("02/03/2024 08:30:05"));
        assert_eq!(lookup(&params, "submitted_end_date"), None);
    }
}
