//! Audit service coordinating state construction, the workflow graph and metrics.

use crate::{
    audit::types::{AuditError, AuditReport, AuditRequest},
    config::Config,
    metrics::{AuditMetrics, MetricsSnapshot},
    policy::BlockedTermPolicy,
    search::{AzureSearchIndex, IndexError},
    workflow::{AuditGraph, AuditState, CheckNode, RemediateNode, RetrieveNode, StateError},
};
use async_trait::async_trait;
use std::sync::Arc;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use uuid::Uuid;

/// Runs audits end to end: builds the initial state, walks the graph, shapes the report.
///
/// The graph is immutable and shared; every call owns its own state, so one service instance
/// serves concurrent requests. Construct it once near process start and share it via `Arc`.
pub struct AuditService {
    graph: AuditGraph,
    metrics: Arc<AuditMetrics>,
}

/// Abstraction over the audit pipeline used by external surfaces (HTTP, CLI).
#[async_trait]
pub trait AuditApi: Send + Sync {
    /// Run one audit to completion.
    async fn run_audit(&self, request: AuditRequest) -> Result<AuditReport, AuditError>;

    /// Retrieve the current metrics snapshot for diagnostics.
    fn metrics_snapshot(&self) -> MetricsSnapshot;
}

impl AuditService {
    /// Wrap an already assembled graph.
    pub fn new(graph: AuditGraph) -> Self {
        Self {
            graph,
            metrics: Arc::new(AuditMetrics::new()),
        }
    }

    /// Build the production graph: Azure AI Search retrieval and the blocked-term policy.
    pub fn from_config(config: &Config) -> Result<Self, IndexError> {
        let index = AzureSearchIndex::from_config(config)?;
        let remediate = config
            .redaction_notice
            .as_deref()
            .map(RemediateNode::new)
            .unwrap_or_default();
        let graph = AuditGraph::new(
            RetrieveNode::new(Arc::new(index)),
            CheckNode::new(Arc::new(BlockedTermPolicy::from_config(config))),
            remediate,
        );
        tracing::info!(
            index = %config.search_index_name,
            blocked_terms = config.blocked_terms.len(),
            "Audit workflow ready"
        );
        Ok(Self::new(graph))
    }

    /// Run one audit to completion.
    pub async fn run_audit(&self, request: AuditRequest) -> Result<AuditReport, AuditError> {
        let session_id = Uuid::new_v4().to_string();
        let video_id = format!("vid_{}", &session_id[..8]);
        let subject = request.subject().ok_or(StateError::EmptySubject)?;
        tracing::info!(
            session_id = %session_id,
            video_id = %video_id,
            subject,
            "Received audit request"
        );

        let mut state = AuditState::new(subject)?.with_video_id(video_id.clone());
        if let Some(url) = request.video_url.as_deref().filter(|url| !url.trim().is_empty()) {
            state = state.with_video_url(url.trim());
        }
        if let Some(transcript) = request.transcript {
            state = state.with_transcript(transcript);
        }
        if !request.ocr_text.is_empty() {
            state = state.with_ocr_text(request.ocr_text);
        }

        self.metrics.record_started();
        let run = match self.graph.invoke_traced(state).await {
            Ok(run) => run,
            Err(error) => {
                self.metrics.record_error();
                tracing::error!(session_id = %session_id, error = %error, "Audit failed");
                return Err(error.into());
            }
        };

        let remediated = run.remediated();
        let status = run.state.final_status();
        self.metrics.record_completed(status, remediated);
        tracing::info!(
            session_id = %session_id,
            status = %status,
            issues = run.state.compliance_results().len(),
            remediated,
            "Audit completed"
        );

        Ok(AuditReport {
            session_id,
            video_id,
            audited_at: current_timestamp_rfc3339(),
            steps: run.visited(),
            remediated,
            state: run.state,
        })
    }

    /// Return the current audit metrics snapshot.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

#[async_trait]
impl AuditApi for AuditService {
    async fn run_audit(&self, request: AuditRequest) -> Result<AuditReport, AuditError> {
        AuditService::run_audit(self, request).await
    }

    fn metrics_snapshot(&self) -> MetricsSnapshot {
        AuditService::metrics_snapshot(self)
    }
}

/// Current timestamp formatted for reports.
pub(crate) fn current_timestamp_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}
