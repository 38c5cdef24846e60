//! Pipeline controllers
//!
//! Each controller advances one request through a pipeline stage,
//! mutating the shared contexts and deciding whether the backend is
//! contacted at all.

mod search;

pub use search::SearchController;
