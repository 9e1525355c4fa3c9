//! eFD portal endpoints and search wire format
//!
//! The search endpoint is a DataTables server-side backend: it expects the
//! full column/order descriptor table on every request and answers with a
//! JSON object whose `data` field holds the result rows.

use serde::Deserialize;

/// Public origin of the portal
pub const BASE_URL: &str = "https://efdsearch.senate.gov";

/// Landing page carrying the usage agreement form
pub const ROOT_PATH: &str = "/search/home/";

/// Tabular search backend
pub const SEARCH_PATH: &str = "/search/report/data/";

/// Rows per search page (`length`)
pub const PAGE_SIZE: u32 = 25;

/// Format for `submitted_start_date` / `submitted_end_date`
pub const SEARCH_DATE_FORMAT: &str = "%m/%d/%Y %H:%M:%S";

/// Format of the submission date column in result rows
pub const ROW_DATE_FORMAT: &str = "%m/%d/%Y";

/// Name of the hidden CSRF input on portal forms
pub const CSRF_FIELD: &str = "csrfmiddlewaretoken";

/// Default search parameters, minus the `draw`/`start` cursor.
///
/// Copied into a [`SearchParams`] per scrape and overlaid there.
pub static DEFAULT_SEARCH_PARAMS: &[(&str, &str)] = &[
    ("columns[0][data]", "0"),
    ("columns[0][name]", ""),
    ("columns[0][searchable]", "true"),
    ("columns[0][orderable]", "true"),
    ("columns[0][search][value]", ""),
    ("columns[0][search][regex]", "false"),
    ("columns[1][data]", "1"),
    ("columns[1][name]", ""),
    ("columns[1][searchable]", "true"),
    ("columns[1][orderable]", "true"),
    ("columns[1][search][value]", ""),
    ("columns[1][search][regex]", "false"),
    ("columns[2][data]", "2"),
    ("columns[2][name]", ""),
    ("columns[2][searchable]", "true"),
    ("columns[2][orderable]", "true"),
    ("columns[2][search][value]", ""),
    ("columns[2][search][regex]", "false"),
    ("columns[3][data]", "3"),
    ("columns[3][name]", ""),
    ("columns[3][searchable]", "true"),
    ("columns[3][orderable]", "true"),
    ("columns[3][search][value]", ""),
    ("columns[3][search][regex]", "false"),
    ("columns[4][data]", "4"),
    ("columns[4][name]", ""),
    ("columns[4][searchable]", "true"),
    ("columns[4][orderable]", "true"),
    ("columns[4][search][value]", ""),
    ("columns[4][search][regex]", "false"),
    ("order[0][column]", "1"),
    ("order[0][dir]", "asc"),
    ("order[1][column]", "0"),
    ("order[1][dir]", "asc"),
    ("length", "25"),
    ("search[value]", ""),
    ("search[regex]", "false"),
    ("report_types", "[7, 11]"),
    ("filer_types", "[1]"),
    ("submitted_start_date", "01/01/2012 00:00:00"),
    ("submitted_end_date", "12/31/2023 23:59:59"),
    ("candidate_state", ""),
    ("senator_state", ""),
    ("office_id", ""),
    ("first_name", ""),
    ("last_name", ""),
];

/// Owned, per-scrape copy of the search parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParams {
    pairs: Vec<(String, String)>,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            pairs: DEFAULT_SEARCH_PARAMS
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

impl SearchParams {
    /// Replace a parameter's value, appending it if absent
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.pairs.iter_mut().find(|(k, _)| k == key) {
            Some(pair) => pair.1 = value,
            None => self.pairs.push((key.to_string(), value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Apply every pair of `overlay` on top of these parameters
    pub fn overlay(&mut self, overlay: &[(String, String)]) {
        for (key, value) in overlay {
            self.set(key, value.clone());
        }
    }

    /// Form body for one page request at the given cursor
    pub fn with_cursor(&self, draw: u32, start: u32) -> Vec<(String, String)> {
        let mut form = Vec::with_capacity(self.pairs.len() + 2);
        form.push(("draw".to_string(), draw.to_string()));
        form.extend(self.pairs.iter().cloned());
        form.push(("start".to_string(), start.to_string()));
        form
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }
}

/// One decoded page from the search endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct SearchPage {
    /// Result rows, each a positional list of cells
    pub data: Vec<Vec<String>>,
}

impl SearchPage {
    pub fn from_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
