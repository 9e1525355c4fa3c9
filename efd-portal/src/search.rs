//! Paginated search over the portal's report endpoint
//!
//! Pages are requested strictly in order. The DataTables cursor (`draw`,
//! `start`) advances by one page after each non-empty response, and the
//! first empty page ends the sequence.

use futures::stream::{self, Stream};
use reqwest::{Method, StatusCode};
use thiserror::Error;
use tracing::debug;

use efd_core::{SearchFilters, SearchPage, SearchParams, PAGE_SIZE};

use crate::{PortalClient, SessionContext};

/// One page of raw result rows
pub type RawRows = Vec<Vec<String>>;

/// Errors from the search endpoint
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Search returned status {status} at offset {start}")]
    Status { status: StatusCode, start: u32 },

    #[error("Malformed search response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Lazy, finite sequence of result pages
///
/// Once it has returned `None` or an error it stays finished; start a new
/// scrape with a freshly negotiated [`SessionContext`] to search again.
#[derive(Debug)]
pub struct SearchPages {
    client: PortalClient,
    context: SessionContext,
    params: SearchParams,
    finished: bool,
}

/// Begin paging through search results for `filters`.
///
/// No request is made until the first page is pulled.
/// Every page request sends the token held by `context`, so scrapes sharing a
/// client never pick up each other's token.
pub fn paginate(
    client: &PortalClient,
    context: SessionContext,
    filters: &SearchFilters,
) -> SearchPages {
    let mut params = SearchParams::default();
    params.overlay(&filters.to_search_params());

    SearchPages {
        client: client.clone(),
        context,
        params,
        finished: false,
    }
}

impl SearchPages {
    /// Fetch the next non-empty page, or `None` at the end of results
    pub async fn next_page(&mut self) -> Result<Option<RawRows>, SearchError> {
        if self.finished {
            return Ok(None);
        }

        match self.request_page().await {
            Ok(page) if page.is_empty() => {
                debug!("Empty page at offset {}; search complete", self.context.start());
                self.finished = true;
                Ok(None)
            }
            Ok(page) => {
                debug!(
                    "Page draw={} start={} returned {} rows",
                    self.context.draw(),
                    self.context.start(),
                    page.data.len()
                );
                self.context.advance(PAGE_SIZE);
                Ok(Some(page.data))
            }
            Err(e) => {
                self.finished = true;
                Err(e)
            }
        }
    }

    /// Cursor for the next request
    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Adapt into a `Stream` of pages
    pub fn into_stream(self) -> impl Stream<Item = Result<RawRows, SearchError>> {
        stream::try_unfold(self, |mut pages| async move {
            Ok::<_, SearchError>(pages.next_page().await?.map(|rows| (rows, pages)))
        })
    }

    async fn request_page(&self) -> Result<SearchPage, SearchError> {
        let form = self
            .params
            .with_cursor(self.context.draw(), self.context.start());

        let response = self
            .client
            .request_with_token(
                Method::POST,
                &self.client.search_url(),
                self.context.csrf_token(),
            )
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Status {
                status,
                start: self.context.start(),
            });
        }

        let body = response.bytes().await?;
        Ok(SearchPage::from_slice(&body)?)
    }
}
