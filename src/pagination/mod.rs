//! Pagination module
//!
//! Resolves the token for the next page from a parsed response body.
//!
//! # Overview
//!
//! A `PageTokenExtractor` looks at one page and either returns the query
//! parameters that fetch the following page or signals that the stream is
//! exhausted. Missing pagination metadata is never an error; it ends the sync.

mod strategies;
mod types;

pub use strategies::NextRecordIdPaginator;
pub use types::{extract_path, NextPage, PageToken, PageTokenExtractor};
