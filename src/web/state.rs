//! Application state shared across handlers

use crate::backend::ElasticsearchBackend;
use crate::config::Settings;
use crate::controller::SearchController;
use crate::query::PassthroughSupplier;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Global settings
    pub settings: Arc<Settings>,
    /// Search stage controller
    pub search: Arc<SearchController<ElasticsearchBackend, PassthroughSupplier>>,
}

impl AppState {
    /// Create new application state
    pub fn new(settings: Settings) -> anyhow::Result<Self> {
        let backend = Arc::new(ElasticsearchBackend::with_settings(&settings.backend)?);
        let search = Arc::new(SearchController::new(
            settings.api.clone(),
            backend,
            PassthroughSupplier,
        ));

        Ok(Self {
            settings: Arc::new(settings),
            search,
        })
    }
}
