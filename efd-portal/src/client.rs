//! Portal HTTP client
//!
//! Builds the cookie-carrying client every portal request goes through and
//! holds the negotiated CSRF token.

use parking_lot::RwLock;
use reqwest::header::{HeaderMap, HeaderValue, ORIGIN, REFERER};
use reqwest::{Client, Method, Proxy, RequestBuilder};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use efd_core::{BASE_URL, ROOT_PATH, SEARCH_PATH};

/// Header carrying the negotiated token on every post-agreement request
pub const CSRF_HEADER: &str = "X-CSRFToken";

/// Default browser identity sent to the portal
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:109.0) Gecko/20100101 Firefox/118.0";

/// Portal client configuration
#[derive(Debug, Clone)]
pub struct PortalConfig {
    /// Portal origin, without trailing slash (default: https://efdsearch.senate.gov)
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// User-Agent header value
    pub user_agent: String,
    /// Optional proxy URL (http, https or socks5h)
    pub proxy: Option<String>,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            base_url: BASE_URL.to_string(),
            timeout_secs: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            proxy: None,
        }
    }
}

impl PortalConfig {
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// Errors building the portal client
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Failed to build portal client: {0}")]
    Build(String),

    #[error("Invalid header value for {name}: {value}")]
    InvalidHeader { name: &'static str, value: String },
}

/// User agents for rotation
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/135.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/135.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/135.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:137.0) Gecko/20100101 Firefox/137.0",
    DEFAULT_USER_AGENT,
];

/// Get a random browser user agent
pub fn random_user_agent() -> &'static str {
    use rand::Rng;
    let idx = rand::thread_rng().gen_range(0..USER_AGENTS.len());
    USER_AGENTS[idx]
}

/// HTTP client bound to one portal origin
///
/// Clones share the cookie jar and the most recently negotiated token.
/// Searches send the token of their own [`crate::SessionContext`] instead.
#[derive(Debug, Clone)]
pub struct PortalClient {
    http: Client,
    base_url: String,
    csrf_token: Arc<RwLock<Option<String>>>,
}

impl PortalClient {
    pub fn new(config: &PortalConfig) -> Result<Self, ClientError> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        let root_url = format!("{}{}", base_url, ROOT_PATH);

        let mut headers = HeaderMap::new();
        headers.insert(REFERER, header_value("Referer", &root_url)?);
        headers.insert(ORIGIN, header_value("Origin", &base_url)?);

        let mut builder = Client::builder()
            .cookie_store(true)
            .default_headers(headers)
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs));

        if let Some(proxy) = &config.proxy {
            let proxy = Proxy::all(proxy).map_err(|e| ClientError::Build(e.to_string()))?;
            builder = builder.proxy(proxy);
        }

        let http = builder
            .build()
            .map_err(|e| ClientError::Build(e.to_string()))?;

        Ok(Self {
            http,
            base_url,
            csrf_token: Arc::new(RwLock::new(None)),
        })
    }

    /// Portal origin filing paths are joined to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Landing page with the usage agreement
    pub fn root_url(&self) -> String {
        format!("{}{}", self.base_url, ROOT_PATH)
    }

    pub fn search_url(&self) -> String {
        format!("{}{}", self.base_url, SEARCH_PATH)
    }

    /// Negotiated token, if the agreement has been accepted
    pub fn csrf_token(&self) -> Option<String> {
        self.csrf_token.read().clone()
    }

    pub(crate) fn set_csrf_token(&self, token: &str) {
        *self.csrf_token.write() = Some(token.to_string());
    }

    /// Start a request, attaching the CSRF header once negotiated
    pub(crate) fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self.http.request(method, url);
        match self.csrf_token.read().as_deref() {
            Some(token) => builder.header(CSRF_HEADER, token),
            None => builder,
        }
    }

    /// Start a request carrying `token`, regardless of the shared one
    pub(crate) fn request_with_token(
        &self,
        method: Method,
        url: &str,
        token: &str,
    ) -> RequestBuilder {
        self.http.request(method, url).header(CSRF_HEADER, token)
    }
}

fn header_value(name: &'static str, value: &str) -> Result<HeaderValue, ClientError> {
    HeaderValue::from_str(value).map_err(|_| ClientError::InvalidHeader {
        name,
        value: value.to_string(),
    })
}
