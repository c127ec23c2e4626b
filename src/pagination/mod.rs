//! Pagination module
//!
//! Offset/limit paging over the OpenTable sync API.
//!
//! # Overview
//!
//! One call to [`PageFetcher::fetch_page`] retrieves a single bounded page of
//! one resource collection. The sync engine decides which offset to ask for
//! and whether another invocation is needed; the fetcher only reports what
//! upstream returned.

mod fetcher;
mod types;

pub use fetcher::PageFetcher;
pub use types::{FetchResult, PageRequest};
