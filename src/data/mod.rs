//! Remote data source: HTTP client, endpoint catalogue, region enumeration.

pub mod client;
pub mod endpoints;
pub mod source;

pub use client::{ApiClient, DEFAULT_BASE_URL, DEFAULT_ELECTION_ID, Fetch, HttpFetcher, Params, RetryPolicy};
pub use source::Region;
