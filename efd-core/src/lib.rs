//! eFD Core - Filing records and search model for the Senate disclosure portal
//!
//! This crate provides the protocol-independent pieces:
//! - Filing records with category and content-format classification
//! - Search filters and the default search parameter table
//! - Result row parsing

pub mod filing;
pub mod filters;
pub mod portal;
pub mod row;

pub use filing::*;
pub use filters::*;
pub use portal::*;
pub use row::*;
