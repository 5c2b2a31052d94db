//! Request, report and error types for the audit service.

use crate::workflow::{AuditState, GraphError, NodeId, StateError};
use serde::Serialize;
use thiserror::Error;

/// Errors emitted by the audit service.
#[derive(Debug, Error)]
pub enum AuditError {
    /// The request could not be turned into an audit state.
    #[error("Invalid audit request: {0}")]
    InvalidRequest(#[from] StateError),
    /// The workflow aborted; no report was produced.
    #[error("Audit workflow failed: {0}")]
    Workflow(#[from] GraphError),
}

/// Parameters supplied by a host for one audit.
#[derive(Debug, Clone, Default)]
pub struct AuditRequest {
    /// Video under audit.
    pub video_url: Option<String>,
    /// Explicit retrieval query; falls back to `video_url` when blank.
    pub query: Option<String>,
    /// Transcript extracted ahead of the audit.
    pub transcript: Option<String>,
    /// OCR lines extracted ahead of the audit.
    pub ocr_text: Vec<String>,
}

impl AuditRequest {
    /// Audit subject used as the retrieval query.
    ///
    /// The first of `query` and `video_url` that is not blank, passed on verbatim.
    pub fn subject(&self) -> Option<&str> {
        [self.query.as_deref(), self.video_url.as_deref()]
            .into_iter()
            .flatten()
            .find(|value| !value.trim().is_empty())
    }
}

/// Completed audit produced by [`crate::audit::AuditService::run_audit`].
#[derive(Debug, Clone, Serialize)]
pub struct AuditReport {
    /// Unique identifier for this audit.
    pub session_id: String,
    /// Short video identifier derived from the session.
    pub video_id: String,
    /// RFC3339 completion time.
    pub audited_at: String,
    /// Nodes executed, in order.
    pub steps: Vec<NodeId>,
    /// Whether non-compliant content was redacted.
    pub remediated: bool,
    /// Final workflow state.
    pub state: AuditState,
}
