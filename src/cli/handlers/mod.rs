//! CLI command handlers
//!
//! Handlers are grouped by domain:
//! - init: schema setup, status and configuration display
//! - ingest: education seed, news files, research triggers and cleanup
//! - query: semantic search and context building
//! - chat: session history

pub mod chat;
pub mod info;
pub mod ingest;
pub mod init;
pub mod query;

pub use chat::*;
pub use info::*;
pub use ingest::*;
pub use init::*;
pub use query::*;

use std::path::Path;

use serde::de::DeserializeOwned;

use crate::Result;

/// Read and decode a JSON input file
pub(crate) fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
