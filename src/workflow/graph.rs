//! Fixed audit graph: `Retrieve → Check → {End | Remediate → End}`.
//!
//! Transitions are a match over [`NodeId`], so every destination is a variant of a closed enum
//! and the graph is acyclic by construction. The executor still enforces [`MAX_STEPS`] and
//! reports [`GraphError::StepLimit`] rather than looping.

use super::node::{Node, NodeError, NodeId};
use super::nodes::{CheckNode, RemediateNode, RetrieveNode};
use super::router::{Route, route};
use super::state::AuditState;
use crate::policy::CompliancePolicy;
use crate::search::DocumentIndex;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

/// First node executed for every audit.
pub const ENTRY: NodeId = NodeId::Retrieve;
/// Longest path through the graph, in node executions.
pub const MAX_STEPS: usize = 3;

/// Where the walk goes after a node finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
    /// Execute another node.
    Node(NodeId),
    /// Stop and return the state.
    End,
}

/// Edge table of the audit graph.
pub fn next_transition(from: NodeId, state: &AuditState) -> Transition {
    match from {
        NodeId::Retrieve => Transition::Node(NodeId::Check),
        NodeId::Check => match route(state) {
            Route::Terminate => Transition::End,
            Route::Remediate => Transition::Node(NodeId::Remediate),
        },
        NodeId::Remediate => Transition::End,
    }
}

/// Errors that abort a workflow run.
#[derive(Debug, Error)]
pub enum GraphError {
    /// A node failed; no state is returned.
    #[error("node `{node}` failed: {source}")]
    Node {
        /// Node that raised the error.
        node: NodeId,
        /// Underlying failure.
        #[source]
        source: NodeError,
    },
    /// The walk did not reach `End` within the step budget.
    #[error("workflow exceeded {limit} node executions")]
    StepLimit {
        /// Budget that was exceeded.
        limit: usize,
    },
}

/// Accumulator sizes observed after a node's patch was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StepRecord {
    /// Node that just ran.
    pub node: NodeId,
    /// Length of `compliance_results` after the step.
    pub compliance_results: usize,
    /// Length of `errors` after the step.
    pub errors: usize,
}

/// Final state of a completed run together with its execution trace.
#[derive(Debug, Clone)]
pub struct AuditRun {
    /// State after the terminal node.
    pub state: AuditState,
    /// One record per executed node, in execution order.
    pub steps: Vec<StepRecord>,
}

impl AuditRun {
    /// Nodes executed, in order.
    pub fn visited(&self) -> Vec<NodeId> {
        self.steps.iter().map(|step| step.node).collect()
    }

    /// Whether the remediation step ran.
    pub fn remediated(&self) -> bool {
        self.steps.iter().any(|step| step.node == NodeId::Remediate)
    }
}

/// Compiled audit workflow.
///
/// Holds no per-request data; share one instance across concurrent audits behind an `Arc`.
pub struct AuditGraph {
    retrieve: RetrieveNode,
    check: CheckNode,
    remediate: RemediateNode,
}

impl AuditGraph {
    /// Assemble the graph from its three steps.
    pub fn new(retrieve: RetrieveNode, check: CheckNode, remediate: RemediateNode) -> Self {
        Self {
            retrieve,
            check,
            remediate,
        }
    }

    /// Assemble the graph from its collaborators, using the default redaction notice.
    pub fn from_parts(index: Arc<dyn DocumentIndex>, policy: Arc<dyn CompliancePolicy>) -> Self {
        Self::new(
            RetrieveNode::new(index),
            CheckNode::new(policy),
            RemediateNode::default(),
        )
    }

    fn node(&self, id: NodeId) -> &dyn Node {
        match id {
            NodeId::Retrieve => &self.retrieve,
            NodeId::Check => &self.check,
            NodeId::Remediate => &self.remediate,
        }
    }

    /// Walk the graph to `End` and return the final state.
    pub async fn invoke(&self, initial: AuditState) -> Result<AuditState, GraphError> {
        self.invoke_traced(initial).await.map(|run| run.state)
    }

    /// Walk the graph to `End`, returning the final state and the executed steps.
    ///
    /// A node failure aborts the walk; the partially patched state is dropped.
    pub async fn invoke_traced(&self, initial: AuditState) -> Result<AuditRun, GraphError> {
        let mut state = initial;
        let mut steps = Vec::with_capacity(MAX_STEPS);
        let mut transition = Transition::Node(ENTRY);

        while let Transition::Node(id) = transition {
            if steps.len() == MAX_STEPS {
                return Err(GraphError::StepLimit { limit: MAX_STEPS });
            }

            tracing::debug!(node = %id, "Running workflow node");
            let patch = self
                .node(id)
                .run(&state)
                .await
                .map_err(|source| GraphError::Node { node: id, source })?;
            state.apply(patch);
            steps.push(StepRecord {
                node: id,
                compliance_results: state.compliance_results().len(),
                errors: state.errors().len(),
            });

            transition = next_transition(id, &state);
        }

        tracing::debug!(
            steps = steps.len(),
            status = %state.final_status(),
            "Workflow reached end"
        );
        Ok(AuditRun { state, steps })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::BlockedTermPolicy;
    use crate::search::{IndexDocument, IndexError};
    use crate::workflow::nodes::REDACTION_NOTICE;
    use crate::workflow::state::{FinalStatus, StatePatch};
    use async_trait::async_trait;
    use reqwest::StatusCode;
    use serde_json::json;
    use std::sync::Mutex;

    struct StaticIndex {
        documents: Vec<IndexDocument>,
        queries: Mutex<Vec<String>>,
    }

    impl StaticIndex {
        fn new(documents: Vec<IndexDocument>) -> Arc<Self> {
            Arc::new(Self {
                documents,
                queries: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl DocumentIndex for StaticIndex {
        async fn search(&self, query: &str) -> Result<Vec<IndexDocument>, IndexError> {
            self.queries.lock().unwrap().push(query.to_string());
            Ok(self.documents.clone())
        }
    }

    struct FailingIndex;

    #[async_trait]
    impl DocumentIndex for FailingIndex {
        async fn search(&self, _query: &str) -> Result<Vec<IndexDocument>, IndexError> {
            Err(IndexError::UnexpectedStatus {
                status: StatusCode::SERVICE_UNAVAILABLE,
                body: "index offline".into(),
            })
        }
    }

    fn doc(value: serde_json::Value) -> IndexDocument {
        IndexDocument::from_fields(value.as_object().cloned().expect("object"))
    }

    fn graph(index: Arc<dyn DocumentIndex>) -> AuditGraph {
        AuditGraph::from_parts(index, Arc::new(BlockedTermPolicy::default()))
    }

    fn initial() -> AuditState {
        AuditState::new("compliance guidelines").expect("state")
    }

    #[tokio::test]
    async fn blocked_document_is_redacted() {
        let index = StaticIndex::new(vec![doc(json!({
            "id": "policy-7",
            "content": "Footage of the launch is restricted until March."
        }))]);
        let run = graph(index.clone())
            .invoke_traced(initial())
            .await
            .expect("run");

        assert_eq!(
            run.visited(),
            vec![NodeId::Retrieve, NodeId::Check, NodeId::Remediate]
        );
        assert!(run.remediated());
        assert_eq!(run.state.content(), REDACTION_NOTICE);
        assert!(run.state.compliant());
        assert_eq!(run.state.final_status(), FinalStatus::Fail);
        assert_eq!(run.state.compliance_results().len(), 1);
        assert_eq!(
            index.queries.lock().unwrap().as_slice(),
            &["compliance guidelines".to_string()]
        );
    }

    #[tokio::test]
    async fn empty_result_set_is_redacted() {
        let run = graph(StaticIndex::new(Vec::new()))
            .invoke_traced(initial())
            .await
            .expect("run");

        assert!(run.remediated());
        assert_eq!(run.state.content(), REDACTION_NOTICE);
        assert!(run.state.compliant());
        assert_eq!(run.state.compliance_results()[0].category, "Missing Content");
        assert!(run.state.errors().is_empty());
    }

    #[tokio::test]
    async fn clean_documents_pass_unchanged() {
        let index = StaticIndex::new(vec![
            doc(json!({ "content": "Logos need clear space." })),
            doc(json!({ "content": "Use approved colours." })),
        ]);
        let run = graph(index).invoke_traced(initial()).await.expect("run");

        assert_eq!(run.visited(), vec![NodeId::Retrieve, NodeId::Check]);
        assert_eq!(
            run.state.content(),
            "Logos need clear space.\nUse approved colours."
        );
        assert!(run.state.compliant());
        assert_eq!(run.state.final_status(), FinalStatus::Pass);
        assert!(run.state.compliance_results().is_empty());
    }

    #[tokio::test]
    async fn documents_without_content_contribute_empty_segments() {
        let index = StaticIndex::new(vec![
            doc(json!({ "id": "a", "content": "first" })),
            doc(json!({ "id": "b", "title": "no body" })),
            doc(json!({ "content": "third" })),
        ]);
        let run = graph(index).invoke_traced(initial()).await.expect("run");

        assert_eq!(run.state.content(), "first\n\nthird");
        assert_eq!(run.state.errors().len(), 1);
        assert!(run.state.errors()[0].contains("document b"));
        assert_eq!(run.state.final_status(), FinalStatus::Pass);
    }

    #[tokio::test]
    async fn accumulators_never_shrink_between_steps() {
        let index = StaticIndex::new(vec![
            doc(json!({ "title": "missing body" })),
            doc(json!({ "content": "restricted" })),
        ]);
        let run = graph(index).invoke_traced(initial()).await.expect("run");

        assert_eq!(run.steps.len(), 3);
        for pair in run.steps.windows(2) {
            assert!(pair[1].compliance_results >= pair[0].compliance_results);
            assert!(pair[1].errors >= pair[0].errors);
        }
        assert_eq!(run.steps[0].errors, 1);
        assert_eq!(run.steps[1].compliance_results, 1);
    }

    #[tokio::test]
    async fn index_failure_propagates_without_state() {
        let error = graph(Arc::new(FailingIndex))
            .invoke(initial())
            .await
            .expect_err("retrieval should fail");

        match error {
            GraphError::Node { node, source } => {
                assert_eq!(node, NodeId::Retrieve);
                assert!(matches!(
                    source,
                    NodeError::Retrieval(IndexError::UnexpectedStatus { .. })
                ));
            }
            other => panic!("expected node error, got {other:?}"),
        }
    }

    #[test]
    fn every_path_ends_within_step_budget() {
        for compliant in [true, false] {
            let mut state = initial();
            state.apply(StatePatch {
                compliant: Some(compliant),
                ..Default::default()
            });

            let mut visited = vec![ENTRY];
            let mut transition = next_transition(ENTRY, &state);
            while let Transition::Node(id) = transition {
                assert!(!visited.contains(&id), "cycle through {id}");
                visited.push(id);
                transition = next_transition(id, &state);
            }

            assert!(visited.len() <= MAX_STEPS);
            assert_eq!(visited[..2], [NodeId::Retrieve, NodeId::Check]);
        }
    }
}
