use crate::search::DocumentIndex;
use crate::workflow::node::{Node, NodeError};
use crate::workflow::state::{AuditState, StatePatch};
use async_trait::async_trait;
use std::sync::Arc;

/// Retrieves policy context for the audit subject from the document index.
///
/// Result texts are joined with a single newline in the order the index returned them. A
/// document without a textual `content` field contributes an empty segment and a diagnostic
/// entry in `errors`; it does not fail the step. Index failures propagate unchanged.
pub struct RetrieveNode {
    index: Arc<dyn DocumentIndex>,
}

impl RetrieveNode {
    /// Build the step over a document index.
    pub fn new(index: Arc<dyn DocumentIndex>) -> Self {
        Self { index }
    }
}

#[async_trait]
impl Node for RetrieveNode {
    async fn run(&self, state: &AuditState) -> Result<StatePatch, NodeError> {
        let query = state.query();
        let documents = self.index.search(query).await?;

        let mut segments = Vec::with_capacity(documents.len());
        let mut errors = Vec::new();
        for (position, document) in documents.iter().enumerate() {
            match document.content() {
                Some(text) => segments.push(text),
                None => {
                    let label = document
                        .id
                        .clone()
                        .unwrap_or_else(|| format!("#{position}"));
                    errors.push(format!(
                        "Retrieved document {label} has no textual `content` field"
                    ));
                    segments.push("");
                }
            }
        }

        tracing::info!(
            query,
            documents = documents.len(),
            missing_content = errors.len(),
            "Retrieved policy context"
        );

        Ok(StatePatch {
            content: Some(segments.join("\n")),
            errors,
            ..Default::default()
        })
    }
}
