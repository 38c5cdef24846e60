//! Request pipeline contexts
//!
//! One request moves through the pipeline as a pair of mutable carriers:
//! the sanitized inputs with accumulated errors and warnings, and the
//! response under construction.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Sanitizer-produced clean parameters
pub type CleanParams = Map<String, Value>;

/// Inbound request state for one pipeline pass
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestContext {
    /// Clean parameters produced by earlier stages
    #[serde(default)]
    pub clean: CleanParams,
    /// Errors recorded by earlier stages
    #[serde(default)]
    pub errors: Vec<String>,
    /// Warnings recorded by earlier stages
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl RequestContext {
    /// Create a context for the given clean parameters
    pub fn new(clean: CleanParams) -> Self {
        Self {
            clean,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Whether any stage has recorded an error
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Response under construction.
///
/// `data` and `meta` stay absent until a stage produces them; an absent
/// document list is distinct from an empty one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResponseContext {
    /// Result documents
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<Value>>,
    /// Response metadata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Map<String, Value>>,
}

impl ResponseContext {
    /// Whether an earlier stage already produced results
    pub fn has_data(&self) -> bool {
        self.data.is_some()
    }
}
