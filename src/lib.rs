#![deny(missing_docs)]

//! Core library for the Brand Guardian compliance audit service.

/// HTTP routing and REST handlers.
pub mod api;
/// Audit orchestration shared by the server and the CLI.
pub mod audit;
/// Environment-driven configuration management.
pub mod config;
/// Structured logging and tracing setup.
pub mod logging;
/// Audit metrics helpers.
pub mod metrics;
/// Pluggable compliance policies.
pub mod policy;
/// Azure AI Search document index integration.
pub mod search;
/// Compliance workflow graph: state, nodes and routing.
pub mod workflow;
