//! Session negotiation
//!
//! The portal refuses searches until the usage agreement on the landing page
//! has been accepted. Acceptance is a form POST echoing the page's CSRF token;
//! the response carries a rotated token that every later request must send.

use reqwest::{Method, StatusCode};
use scraper::{Html, Selector};
use std::sync::LazyLock;
use thiserror::Error;
use tracing::{debug, info};

use efd_core::CSRF_FIELD;

use crate::PortalClient;

static CSRF_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(&format!(r#"[name="{}"]"#, CSRF_FIELD)).unwrap()
});

/// Errors establishing a portal session
#[derive(Debug, Error)]
pub enum NegotiationError {
    #[error("No CSRF token on {0}")]
    MissingToken(&'static str),

    #[error("Portal returned status {status} for {url}")]
    Status { url: String, status: StatusCode },

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Token and pagination cursor for one scrape
///
/// Consumed by a single [`crate::SearchPages`]; not meant to be shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    csrf_token: String,
    draw: u32,
    start: u32,
}

impl SessionContext {
    /// Context for a token obtained elsewhere, with the cursor at the first page.
    ///
    /// Pages requested through this context send `csrf_token` as
    /// `X-CSRFToken`; the client must already hold the matching session cookie.
    pub fn new(csrf_token: &str) -> Self {
        Self {
            csrf_token: csrf_token.to_string(),
            draw: 1,
            start: 0,
        }
    }

    pub fn csrf_token(&self) -> &str {
        &self.csrf_token
    }

    /// DataTables request counter
    pub fn draw(&self) -> u32 {
        self.draw
    }

    /// Row offset of the next page
    pub fn start(&self) -> u32 {
        self.start
    }

    pub(crate) fn advance(&mut self, page_size: u32) {
        self.draw += 1;
        self.start += page_size;
    }
}

/// Accept the usage agreement and return a fresh session context.
///
/// On success the client sends the rotated token as `X-CSRFToken` on every
/// later request, and its cookie jar holds the portal session cookie.
pub async fn negotiate(client: &PortalClient) -> Result<SessionContext, NegotiationError> {
    let root_url = client.root_url();

    debug!("Fetching landing page: {}", root_url);
    let landing = fetch_page(client, Method::GET, &root_url, None).await?;
    let token = extract_csrf_token(&landing)
        .ok_or(NegotiationError::MissingToken("landing page"))?;

    debug!("Accepting usage agreement");
    let form = [("prohibition_agreement", "1"), (CSRF_FIELD, token.as_str())];
    let accepted = fetch_page(client, Method::POST, &root_url, Some(&form[..])).await?;
    let token = extract_csrf_token(&accepted)
        .ok_or(NegotiationError::MissingToken("agreement response"))?;

    client.set_csrf_token(&token);
    info!("Negotiated portal session and CSRF token");

    Ok(SessionContext::new(&token))
}

async fn fetch_page(
    client: &PortalClient,
    method: Method,
    url: &str,
    form: Option<&[(&str, &str)]>,
) -> Result<String, NegotiationError> {
    let mut request = client.request(method, url);
    if let Some(form) = form {
        request = request.form(form);
    }

    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(NegotiationError::Status {
            url: url.to_string(),
            status,
        });
    }

    Ok(response.text().await?)
}

/// Extract the hidden `csrfmiddlewaretoken` value from a page
pub fn extract_csrf_token(html: &str) -> Option<String> {
    let document = Html::parse_document(html);

    document
        .select(&CSRF_SELECTOR)
        .filter_map(|el| el.value().attr("value"))
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(str::to_string)
}
