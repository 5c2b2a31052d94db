//! Node identifiers and the trait every workflow step implements.

use super::state::{AuditState, StatePatch};
use crate::search::IndexError;
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Closed set of steps in the audit workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeId {
    /// Fetch policy context from the document index.
    Retrieve,
    /// Evaluate content against the compliance policy.
    Check,
    /// Replace non-compliant content with the redaction notice.
    Remediate,
}

impl NodeId {
    /// Stable lowercase label used in logs and traces.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Retrieve => "retrieve",
            Self::Check => "check",
            Self::Remediate => "remediate",
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failures raised inside a node.
#[derive(Debug, Error)]
pub enum NodeError {
    /// The document index could not serve the retrieval query.
    #[error("document index search failed: {0}")]
    Retrieval(#[from] IndexError),
}

/// One step of the workflow: reads the state, returns a patch.
#[async_trait]
pub trait Node: Send + Sync {
    /// Run the step against the current state.
    async fn run(&self, state: &AuditState) -> Result<StatePatch, NodeError>;
}
