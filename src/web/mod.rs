//! Web server module
//!
//! Provides the HTTP API surface for GeoSearch-RS.

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
