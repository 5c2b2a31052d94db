//! Audit pipeline entry point shared by the HTTP server and the CLI.

mod service;
pub mod types;

pub use service::{AuditApi, AuditService};
pub use types::{AuditError, AuditReport, AuditRequest};
