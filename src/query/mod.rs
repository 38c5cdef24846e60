//! Query supply seam
//!
//! A supplier turns clean request parameters into a prepared backend
//! query, or decides that no backend call is needed at all.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::pipeline::CleanParams;

/// A fully prepared query: the opaque payload sent to the backend plus
/// the type label carried into response metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreparedQuery {
    /// Opaque query payload
    pub body: Value,
    /// Label describing which kind of query was built
    #[serde(rename = "type")]
    pub query_type: String,
}

impl PreparedQuery {
    /// Create a prepared query
    pub fn new(body: Value, query_type: impl Into<String>) -> Self {
        Self {
            body,
            query_type: query_type.into(),
        }
    }
}

/// Supplies the backend query for a request, if one is needed
pub trait QuerySupplier: Send + Sync {
    /// Produce a query from the clean parameters; `None` means the
    /// request needs no backend call.
    fn supply(&self, clean: &CleanParams) -> Option<PreparedQuery>;
}

/// Adapter turning a plain function into a supplier
pub struct SupplierFn<F>(F);

/// Wrap a function as a [`QuerySupplier`]
pub fn supplier_fn<F>(f: F) -> SupplierFn<F>
where
    F: Fn(&CleanParams) -> Option<PreparedQuery> + Send + Sync,
{
    SupplierFn(f)
}

impl<F> QuerySupplier for SupplierFn<F>
where
    F: Fn(&CleanParams) -> Option<PreparedQuery> + Send + Sync,
{
    fn supply(&self, clean: &CleanParams) -> Option<PreparedQuery> {
        (self.0)(clean)
    }
}

/// Minimal supplier used by the server binary: wraps the `text` clean
/// parameter into a name match. Query semantics belong to the upstream
/// pipeline, not to this crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughSupplier;

impl QuerySupplier for PassthroughSupplier {
    fn supply(&self, clean: &CleanParams) -> Option<PreparedQuery> {
        let text = clean.get("text")?.as_str()?;
        if text.trim().is_empty() {
            return None;
        }

        Some(PreparedQuery::new(
            json!({ "query": { "match": { "name": text } } }),
            "search",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_supplier() {
        let supplier = supplier_fn(|clean: &CleanParams| {
            clean
                .get("text")
                .map(|text| PreparedQuery::new(json!({ "q": text }), "fallback"))
        });

        let mut clean = CleanParams::new();
        assert!(supplier.supply(&clean).is_none());

        clean.insert("text".to_string(), json!("union square"));
        let query = supplier.supply(&clean).unwrap();
        assert_eq!(query.query_type, "fallback");
        assert_eq!(query.body, json!({ "q": "union square" }));
    }

    #[test]
    fn test_passthrough_requires_text() {
        let supplier = PassthroughSupplier;

        let mut clean = CleanParams::new();
        assert!(supplier.supply(&clean).is_none());

        clean.insert("text".to_string(), json!("   "));
        assert!(supplier.supply(&clean).is_none());

        clean.insert("text".to_string(), json!("portland"));
        let query = supplier.supply(&clean).unwrap();
        assert_eq!(query.query_type, "search");
    }
}
