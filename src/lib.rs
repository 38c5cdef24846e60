//! GeoSearch-RS: A resilient geocoding search service written in Rust
//!
//! Orchestrates place-search queries against a remote Elasticsearch-compatible
//! backend, retrying transient timeouts up to a configured budget and
//! normalizing backend responses into a uniform result shape.

pub mod backend;
pub mod config;
pub mod controller;
pub mod pipeline;
pub mod query;
pub mod web;

pub use backend::{BackendError, BackendOutcome, SearchBackend, SearchCommand};
pub use config::Settings;
pub use controller::SearchController;
pub use pipeline::{RequestContext, ResponseContext};
pub use query::{PreparedQuery, QuerySupplier};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Search mode sent with every backend command
pub const SEARCH_TYPE: &str = "dfs_query_then_fetch";

/// Default number of retries after the initial backend attempt
pub const DEFAULT_REQUEST_RETRIES: u32 = 3;
