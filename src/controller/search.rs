//! Search stage with bounded retry
//!
//! Decides whether a backend call is needed, builds the command, retries
//! transient timeouts up to the configured budget, and normalizes the
//! backend outcome into the response context.

use crate::backend::{SearchBackend, SearchCommand};
use crate::config::ApiSettings;
use crate::pipeline::{RequestContext, ResponseContext};
use crate::query::QuerySupplier;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

/// Orchestrates the search stage of the pipeline
pub struct SearchController<B, Q> {
    api: ApiSettings,
    backend: Arc<B>,
    query: Q,
}

impl<B, Q> SearchController<B, Q>
where
    B: SearchBackend,
    Q: QuerySupplier,
{
    /// Create a controller over a backend and a query supplier
    pub fn new(api: ApiSettings, backend: Arc<B>, query: Q) -> Self {
        Self {
            api,
            backend,
            query,
        }
    }

    /// Run the search stage for one request.
    ///
    /// Returns without contacting the backend when an earlier stage
    /// recorded an error, when results already exist, or when the
    /// supplier decides no query is needed. Returning hands the request
    /// to the next pipeline stage.
    pub async fn handle(&self, req: &mut RequestContext, res: &mut ResponseContext) {
        if req.has_errors() {
            return;
        }
        if res.has_data() {
            return;
        }
        let Some(query) = self.query.supply(&req.clean) else {
            return;
        };

        let cmd = SearchCommand::new(&self.api.index_name, query.body.clone());
        let budget = self.api.request_retries();

        // The command is reused unchanged across attempts; only the
        // attempt counter advances.
        let mut attempt: u32 = 0;
        loop {
            match self.backend.execute(&cmd).await {
                Ok(outcome) => {
                    let count = outcome.docs.as_ref().map_or(0, Vec::len);
                    info!(
                        "[controller:search] [queryType:{}] [es_result_count:{}]",
                        query.query_type, count
                    );
                    if attempt > 0 {
                        info!("succeeded on retry {}", attempt);
                    }

                    if let Some(docs) = outcome.docs {
                        res.data = Some(docs);
                    }
                    let mut meta = outcome.meta.unwrap_or_default();
                    meta.insert(
                        "query_type".to_string(),
                        Value::String(query.query_type.clone()),
                    );
                    res.meta = Some(meta);
                    return;
                }
                Err(err) if err.is_retryable() && attempt < budget => {
                    attempt += 1;
                    info!("request timed out on attempt {}, retrying", attempt);
                }
                Err(err) => {
                    req.errors.push(err.surface_message().to_string());
                    return;
                }
            }
        }
    }
}
