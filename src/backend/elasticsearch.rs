//! Elasticsearch-compatible search backend
//!
//! Speaks the `_search` HTTP API and maps responses onto the backend
//! boundary types.

use super::{BackendError, BackendOutcome, SearchBackend, SearchCommand};
use crate::config::BackendSettings;
use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Map, Value};
use std::time::{Duration, Instant};
use tracing::debug;
use url::Url;

/// HTTP client for an Elasticsearch-compatible search backend
#[derive(Debug, Clone)]
pub struct ElasticsearchBackend {
    client: Client,
    base_url: Url,
}

impl ElasticsearchBackend {
    /// Create a backend client for a base URL with default settings
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_settings(&BackendSettings {
            url: base_url.to_string(),
            ..Default::default()
        })
    }

    /// Create a backend client from settings
    pub fn with_settings(settings: &BackendSettings) -> Result<Self> {
        let mut builder =
            Client::builder().timeout(Duration::from_secs_f64(settings.request_timeout));

        if !settings.verify_ssl {
            builder = builder.danger_accept_invalid_certs(true);
        }

        // a trailing slash keeps Url::join from eating the last path segment
        let mut base = settings.url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }

        Ok(Self {
            client: builder.build()?,
            base_url: Url::parse(&base)?,
        })
    }

    fn search_url(&self, index: &str) -> Result<Url, BackendError> {
        self.base_url
            .join(&format!("{}/_search", index))
            .map_err(|e| BackendError::Opaque(e.to_string()))
    }
}

#[async_trait]
impl SearchBackend for ElasticsearchBackend {
    async fn execute(&self, cmd: &SearchCommand) -> Result<BackendOutcome, BackendError> {
        let url = self.search_url(&cmd.index)?;
        let started = Instant::now();

        let response = self
            .client
            .post(url)
            .query(&[("search_type", cmd.search_type.as_str())])
            .json(&cmd.body)
            .send()
            .await
            .map_err(|e| classify_transport_error(e, started.elapsed()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| BackendError::Opaque(e.to_string()))?;

        if !(200..300).contains(&status) {
            return Err(BackendError::from_status(status, error_reason(&text, status)));
        }

        let json: Value =
            serde_json::from_str(&text).map_err(|e| BackendError::Opaque(e.to_string()))?;

        debug!(
            "search on index '{}' answered in {:?}",
            cmd.index,
            started.elapsed()
        );

        Ok(parse_outcome(&json))
    }
}

/// Client-side deadline expiries are reported as the 408 class, since
/// this executor owns the network-level timeout.
fn classify_transport_error(err: reqwest::Error, elapsed: Duration) -> BackendError {
    if err.is_timeout() {
        BackendError::Timeout {
            status: 408,
            message: format!("Request Timeout after {}ms", elapsed.as_millis()),
        }
    } else {
        BackendError::Opaque(err.to_string())
    }
}

/// Pull a human-readable reason out of an error body, falling back to
/// the raw text or the status line.
fn error_reason(body: &str, status: u16) -> String {
    if let Ok(json) = serde_json::from_str::<Value>(body) {
        if let Some(reason) = json.pointer("/error/reason").and_then(Value::as_str) {
            return reason.to_string();
        }
        if let Some(error) = json.get("error").and_then(Value::as_str) {
            return error.to_string();
        }
    }

    if body.trim().is_empty() {
        format!("backend returned status {}", status)
    } else {
        body.trim().to_string()
    }
}

/// Extract documents and metadata from a search response.
///
/// A response with no hits section yields absent documents, which is
/// distinct from a hits array that happens to be empty.
fn parse_outcome(json: &Value) -> BackendOutcome {
    let docs = json
        .pointer("/hits/hits")
        .and_then(Value::as_array)
        .map(|hits| {
            hits.iter()
                .map(|hit| hit.get("_source").cloned().unwrap_or_else(|| hit.clone()))
                .collect()
        });

    let mut meta = Map::new();
    if let Some(took) = json.get("took") {
        meta.insert("took".to_string(), took.clone());
    }
    if let Some(total) = json.pointer("/hits/total") {
        meta.insert("total".to_string(), total.clone());
    }
    if let Some(score) = json.pointer("/hits/max_score") {
        if !score.is_null() {
            meta.insert("max_score".to_string(), score.clone());
        }
    }

    BackendOutcome {
        docs,
        meta: if meta.is_empty() { None } else { Some(meta) },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn command() -> SearchCommand {
        SearchCommand::new("venues", json!({ "query": { "match": { "name": "park" } } }))
    }

    #[tokio::test]
    async fn test_successful_search_extracts_docs_and_meta() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/venues/_search"))
            .and(query_param("search_type", "dfs_query_then_fetch"))
            .and(body_json(json!({ "query": { "match": { "name": "park" } } })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "took": 12,
                "hits": {
                    "total": 2,
                    "max_score": 1.5,
                    "hits": [
                        { "_id": "a", "_source": { "name": "central park" } },
                        { "_id": "b", "_source": { "name": "hyde park" } }
                    ]
                }
            })))
            .mount(&server)
            .await;

        let backend = ElasticsearchBackend::new(&server.uri()).unwrap();
        let outcome = backend.execute(&command()).await.unwrap();

        let docs = outcome.docs.unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0], json!({ "name": "central park" }));

        let meta = outcome.meta.unwrap();
        assert_eq!(meta.get("took"), Some(&json!(12)));
        assert_eq!(meta.get("total"), Some(&json!(2)));
        assert_eq!(meta.get("max_score"), Some(&json!(1.5)));
    }

    #[tokio::test]
    async fn test_response_without_hits_yields_absent_docs() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/venues/_search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "took": 3 })))
            .mount(&server)
            .await;

        let backend = ElasticsearchBackend::new(&server.uri()).unwrap();
        let outcome = backend.execute(&command()).await.unwrap();

        assert!(outcome.docs.is_none());
        assert_eq!(outcome.meta.unwrap().get("took"), Some(&json!(3)));
    }

    #[tokio::test]
    async fn test_empty_hits_yield_empty_docs_not_absent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/venues/_search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "hits": { "total": 0, "hits": [] }
            })))
            .mount(&server)
            .await;

        let backend = ElasticsearchBackend::new(&server.uri()).unwrap();
        let outcome = backend.execute(&command()).await.unwrap();

        assert_eq!(outcome.docs, Some(vec![]));
    }

    #[tokio::test]
    async fn test_408_maps_to_retryable_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/venues/_search"))
            .respond_with(ResponseTemplate::new(408).set_body_json(json!({
                "error": { "reason": "Request Timeout after 17ms" }
            })))
            .mount(&server)
            .await;

        let backend = ElasticsearchBackend::new(&server.uri()).unwrap();
        let err = backend.execute(&command()).await.unwrap_err();

        assert!(err.is_retryable());
        assert_eq!(err.surface_message(), "Request Timeout after 17ms");
    }

    #[tokio::test]
    async fn test_500_maps_to_fatal_backend_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/venues/_search"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "error": { "reason": "an internal server error occurred" }
            })))
            .mount(&server)
            .await;

        let backend = ElasticsearchBackend::new(&server.uri()).unwrap();
        let err = backend.execute(&command()).await.unwrap_err();

        assert!(!err.is_retryable());
        assert_eq!(
            err,
            BackendError::Backend {
                status: 500,
                message: "an internal server error occurred".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_unparseable_error_body_falls_back_to_raw_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/venues/_search"))
            .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
            .mount(&server)
            .await;

        let backend = ElasticsearchBackend::new(&server.uri()).unwrap();
        let err = backend.execute(&command()).await.unwrap_err();

        assert_eq!(err.surface_message(), "upstream unavailable");
    }
}
