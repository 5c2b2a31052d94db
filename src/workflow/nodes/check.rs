use crate::policy::{CompliancePolicy, PolicyVerdict};
use crate::workflow::node::{Node, NodeError};
use crate::workflow::state::{AuditState, ComplianceIssue, FinalStatus, StatePatch};
use async_trait::async_trait;
use std::sync::Arc;

/// Evaluates the working content and writes the verdict, status and report.
///
/// Performs no I/O, so running it repeatedly on the same state yields the same patch.
pub struct CheckNode {
    policy: Arc<dyn CompliancePolicy>,
}

impl CheckNode {
    /// Build the step over a compliance policy.
    pub fn new(policy: Arc<dyn CompliancePolicy>) -> Self {
        Self { policy }
    }

    /// Evaluate `state` without going through the async node interface.
    pub fn evaluate(&self, state: &AuditState) -> StatePatch {
        let PolicyVerdict { compliant, issues } = self.policy.evaluate(state.content());
        let status = if compliant {
            FinalStatus::Pass
        } else {
            FinalStatus::Fail
        };

        tracing::info!(
            query = state.query(),
            compliant,
            issues = issues.len(),
            "Compliance check completed"
        );

        let report = render_report(state, status, &issues);
        StatePatch {
            compliance_results: issues,
            final_status: Some(status),
            final_report: Some(report),
            compliant: Some(compliant),
            ..Default::default()
        }
    }
}

#[async_trait]
impl Node for CheckNode {
    async fn run(&self, state: &AuditState) -> Result<StatePatch, NodeError> {
        Ok(self.evaluate(state))
    }
}

fn render_report(state: &AuditState, status: FinalStatus, issues: &[ComplianceIssue]) -> String {
    let mut lines = vec![format!("# Compliance audit: {status}"), String::new()];
    lines.push(format!("- Subject: {}", state.query()));
    if let Some(url) = state.video_url() {
        lines.push(format!("- Video: {url}"));
    }
    lines.push(String::new());

    if issues.is_empty() {
        lines.push("No compliance issues found.".to_string());
    } else {
        lines.push(format!("## Issues ({})", issues.len()));
        for issue in issues {
            let at = issue
                .timestamp
                .as_deref()
                .map(|timestamp| format!(" at {timestamp}"))
                .unwrap_or_default();
            lines.push(format!(
                "- [{}] {}{at}: {}",
                issue.severity, issue.category, issue.description
            ));
        }
        lines.push(String::new());
        lines.push("Non-compliant content is redacted before release.".to_string());
    }

    lines.join("\n")
}
