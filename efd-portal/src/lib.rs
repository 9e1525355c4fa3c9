//! eFD Portal Layer
//!
//! Talks to the Senate eFD search portal:
//! - Cookie-carrying HTTP client with browser headers
//! - Usage-agreement and CSRF negotiation
//! - Paginated search over the report endpoint
//! - Filing content retrieval

pub mod client;
pub mod session;
pub mod search;
pub mod fetch;
pub mod scrape;

pub use client::*;
pub use session::*;
pub use search::*;
pub use fetch::*;
pub use scrape::*;
