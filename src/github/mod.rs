pub mod client;
pub mod query;

pub use client::{interpret_response, request_payload, GithubClient, DEFAULT_ENDPOINT};
pub use query::{contributions_query, slice_alias, SLICE_DAYS};
