//! The three steps of the audit workflow.

mod check;
mod remediate;
mod retrieve;

pub use check::CheckNode;
pub use remediate::{REDACTION_NOTICE, RemediateNode};
pub use retrieve::RetrieveNode;
