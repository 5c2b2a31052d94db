//! Document index integration.

pub mod client;
pub mod types;

pub use client::AzureSearchIndex;
pub use types::{DocumentIndex, IndexDocument, IndexError};
