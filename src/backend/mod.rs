//! Search backend boundary
//!
//! Defines the command and outcome types exchanged with the remote
//! search backend, and the error taxonomy the retry loop discriminates
//! on.

mod elasticsearch;

pub use elasticsearch::ElasticsearchBackend;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::SEARCH_TYPE;

/// A fully-resolved backend request.
///
/// Constructed once per request and reused unchanged across retries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchCommand {
    /// Index the query runs against
    pub index: String,
    /// Search mode, fixed for every command
    pub search_type: String,
    /// Opaque query payload
    pub body: Value,
}

impl SearchCommand {
    /// Build a command for an index and prepared query body
    pub fn new(index: impl Into<String>, body: Value) -> Self {
        Self {
            index: index.into(),
            search_type: SEARCH_TYPE.to_string(),
            body,
        }
    }
}

/// What one backend call produced.
///
/// Documents and metadata are each independently possibly absent; an
/// absent document list is not the same as an empty one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BackendOutcome {
    /// Result documents
    pub docs: Option<Vec<Value>>,
    /// Backend-provided metadata fields
    pub meta: Option<Map<String, Value>>,
}

/// Backend failure classes; only `Timeout` is retryable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// Request timeout reported by the backend (status 408)
    #[error("{message}")]
    Timeout { status: u16, message: String },
    /// Any other structured backend failure
    #[error("{message}")]
    Backend { status: u16, message: String },
    /// Unstructured failure, carried exactly as received
    #[error("{0}")]
    Opaque(String),
}

impl BackendError {
    /// Classify a structured backend failure by status; 408 is the only
    /// status that yields the retryable class.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        if status == 408 {
            Self::Timeout { status, message }
        } else {
            Self::Backend { status, message }
        }
    }

    /// Whether another attempt may be issued for this failure
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// The string appended to the request's error list when this
    /// failure is surfaced downstream
    pub fn surface_message(&self) -> &str {
        match self {
            Self::Timeout { message, .. } | Self::Backend { message, .. } => message,
            Self::Opaque(value) => value,
        }
    }
}

/// One remote search call; resolves exactly once per invocation.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn execute(&self, cmd: &SearchCommand) -> Result<BackendOutcome, BackendError>;
}
