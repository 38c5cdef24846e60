//! HTTP request handlers

use super::state::AppState;
use crate::pipeline::{CleanParams, RequestContext, ResponseContext};
use axum::extract::{Query, State};
use axum::Json;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Search response envelope; `data` and `meta` are omitted when the
/// pipeline produced none.
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Map<String, Value>>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// Search handler: runs the pipeline for one request
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<SearchResponse> {
    // parameters pass through untouched; sanitization belongs to an
    // upstream stage
    let clean: CleanParams = params
        .into_iter()
        .map(|(k, v)| (k, Value::String(v)))
        .collect();

    let mut req = RequestContext::new(clean);
    let mut res = ResponseContext::default();

    state.search.handle(&mut req, &mut res).await;

    Json(SearchResponse {
        data: res.data,
        meta: res.meta,
        errors: req.errors,
        warnings: req.warnings,
    })
}

/// Health check handler
pub async fn health() -> Json<Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": crate::VERSION,
    }))
}
