//! Compliance audit workflow: typed state, reducers, nodes, router and graph executor.

pub mod graph;
pub mod node;
pub mod nodes;
pub mod reducer;
pub mod router;
pub mod state;

pub use graph::{AuditGraph, AuditRun, GraphError, MAX_STEPS, StepRecord, Transition};
pub use node::{Node, NodeError, NodeId};
pub use nodes::{CheckNode, REDACTION_NOTICE, RemediateNode, RetrieveNode};
pub use router::{Route, route};
pub use state::{
    AuditState, ComplianceIssue, FinalStatus, Severity, StateError, StatePatch, UnknownSeverity,
};
