use crate::workflow::node::{Node, NodeError};
use crate::workflow::state::{AuditState, StatePatch};
use async_trait::async_trait;

/// Notice that replaces content which failed the compliance check.
pub const REDACTION_NOTICE: &str = "Information redacted due to compliance policy.";

/// Replaces the working content with a fixed notice and marks the state compliant.
///
/// This is a terminal override rather than a re-check: the patch always sets `compliant`.
pub struct RemediateNode {
    notice: String,
}

impl RemediateNode {
    /// Build the step with a custom notice.
    pub fn new(notice: impl Into<String>) -> Self {
        Self {
            notice: notice.into(),
        }
    }

    /// Notice written over non-compliant content.
    pub fn notice(&self) -> &str {
        &self.notice
    }
}

impl Default for RemediateNode {
    fn default() -> Self {
        Self::new(REDACTION_NOTICE)
    }
}

#[async_trait]
impl Node for RemediateNode {
    async fn run(&self, state: &AuditState) -> Result<StatePatch, NodeError> {
        tracing::info!(query = state.query(), "Redacting non-compliant content");
        Ok(StatePatch {
            content: Some(self.notice.clone()),
            compliant: Some(true),
            ..Default::default()
        })
    }
}
