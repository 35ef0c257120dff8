pub mod client;
pub mod endpoints;
pub mod types;

pub use client::{ClientConfig, Fetch, GitHubClient, RawResponse};
pub use endpoints::{build_url, Endpoint, RepoRef, API_BASE, DEFAULT_NAME, DEFAULT_OWNER};
pub use types::{summarize, TrafficSummary};
