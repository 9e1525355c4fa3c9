//! One-call scrape over a portal session
//!
//! Negotiates, pages through every result and parses the rows, the way a
//! driver normally uses the individual pieces.

use futures::TryStreamExt;
use std::pin::pin;
use thiserror::Error;
use tracing::{debug, info};

use efd_core::{parse_rows, FilingRecord, SearchFilters};

use crate::{
    fetch, negotiate, paginate, ClientError, FetchError, NegotiationError, PortalClient,
    PortalConfig, SearchError,
};

/// Errors aborting a whole scrape
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Session negotiation failed: {0}")]
    Negotiation(#[from] NegotiationError),

    #[error("Search failed: {0}")]
    Search(#[from] SearchError),
}

/// Scraper for the eFD search portal
#[derive(Debug, Clone)]
pub struct FilingScraper {
    client: PortalClient,
}

impl FilingScraper {
    pub fn new(config: &PortalConfig) -> Result<Self, ClientError> {
        Ok(Self::with_client(PortalClient::new(config)?))
    }

    pub fn with_client(client: PortalClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &PortalClient {
        &self.client
    }

    /// Negotiate a session and collect every filing matching `filters`.
    ///
    /// Rows that fail to parse are skipped; any endpoint failure aborts.
    pub async fn scrape(&self, filters: &SearchFilters) -> Result<Vec<FilingRecord>, ScrapeError> {
        let context = negotiate(&self.client).await?;
        let mut pages = pin!(paginate(&self.client, context, filters).into_stream());

        let mut records = Vec::new();
        let mut page_count = 0usize;
        while let Some(rows) = pages.try_next().await? {
            page_count += 1;
            records.extend(parse_rows(&rows, self.client.base_url()));
        }

        debug!("Read {} result pages", page_count);
        info!("Fetched {} filings", records.len());
        Ok(records)
    }

    /// Retrieve one filing's content on the negotiated session
    pub async fn download(&self, record: &FilingRecord) -> Result<Vec<u8>, FetchError> {
        fetch(&self.client, record).await
    }
}

/// Check that the portal is reachable and accepts the usage agreement
pub async fn check_portal(config: &PortalConfig) -> Result<bool, ClientError> {
    let client = PortalClient::new(config)?;

    match negotiate(&client).await {
        Ok(_) => Ok(true),
        Err(e) => {
            debug!("Portal check failed: {}", e);
            Ok(false)
        }
    }
}
