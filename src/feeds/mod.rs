//! Feed retrieval and parsing.
//!
//! # Submodules
//!
//! - [`fetch`]: The [`FeedFetcher`] seam and its HTTP implementation
//! - [`parse`]: RSS 0.9x/1.0/2.0 and Atom documents into [`crate::models::ParsedFeed`]
//! - [`dates`]: Lenient date-string parsing for entry timestamps
//!
//! Feeds are fetched one at a time. A feed that fails to fetch or parse is
//! logged by the collector and contributes no items.

pub mod dates;
pub mod fetch;
pub mod parse;

pub use fetch::{FeedFetcher, HttpFetcher};
