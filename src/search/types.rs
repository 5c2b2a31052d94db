//! Document index contract and the types shared with the Azure AI Search client.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors returned while querying the document index.
#[derive(Debug, Error)]
pub enum IndexError {
    /// Endpoint failed to parse or normalize.
    #[error("Invalid search endpoint: {0}")]
    InvalidUrl(String),
    /// HTTP layer failed before receiving a response.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The search service responded with an unexpected status code.
    #[error("Unexpected search response ({status}): {body}")]
    UnexpectedStatus {
        /// HTTP status returned by the service.
        status: StatusCode,
        /// Body payload associated with the failing response.
        body: String,
    },
}

/// A single document returned by the index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexDocument {
    /// Document key, when the index returns one.
    pub id: Option<String>,
    /// Relevance score reported by the service.
    pub score: Option<f64>,
    /// Raw field map as returned by the service.
    pub fields: Map<String, Value>,
}

impl IndexDocument {
    /// Wrap a raw result object, lifting out the key and score.
    pub fn from_fields(fields: Map<String, Value>) -> Self {
        let id = fields.get("id").and_then(stringify_key);
        let score = fields.get("@search.score").and_then(Value::as_f64);
        Self { id, score, fields }
    }

    /// The textual `content` field, if the document carries one.
    pub fn content(&self) -> Option<&str> {
        self.fields.get("content").and_then(Value::as_str)
    }
}

/// Read-only search contract consumed by the retrieval step.
///
/// Results come back in the order the implementation chooses; an empty list is a valid answer.
#[async_trait]
pub trait DocumentIndex: Send + Sync {
    /// Run a full-text query and return a bounded set of documents.
    async fn search(&self, query: &str) -> Result<Vec<IndexDocument>, IndexError>;
}

fn stringify_key(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

#[derive(Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub(crate) value: Vec<Map<String, Value>>,
}
