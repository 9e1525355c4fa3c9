//! Filing content retrieval
//!
//! Structured documents are downloaded as-is. Paper scans would need OCR,
//! which is not done here, so they yield empty content without a request.

use reqwest::{Method, StatusCode};
use thiserror::Error;
use tracing::{debug, info, warn};

use efd_core::{ContentFormat, FilingRecord};

use crate::PortalClient;

/// Errors retrieving one filing's content
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Filing {url} returned status {status}")]
    Status { url: String, status: StatusCode },

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Retrieve the raw content of a filing
pub async fn fetch(client: &PortalClient, record: &FilingRecord) -> Result<Vec<u8>, FetchError> {
    match record.format() {
        ContentFormat::StructuredDocument => fetch_document(client, record.url()).await,
        ContentFormat::PaperScan => {
            debug!("Paper filing {} not extracted; returning empty content", record.url());
            Ok(Vec::new())
        }
        ContentFormat::Unknown => {
            warn!(
                "Unknown filing format for {}, fetching as structured document",
                record.url()
            );
            fetch_document(client, record.url()).await
        }
    }
}

async fn fetch_document(client: &PortalClient, url: &str) -> Result<Vec<u8>, FetchError> {
    info!("Downloading filing: {}", url);

    let response = client.request(Method::GET, url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status,
        });
    }

    let body = response.bytes().await?;
    debug!("Downloaded {} bytes from {}", body.len(), url);
    Ok(body.to_vec())
}
