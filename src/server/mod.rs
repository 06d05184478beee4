//! Server module for MCP protocol handling.
//!
//! This module provides:
//! - MCP server implementation over stdio
//! - Tool call handlers and routing
//! - Shared application state management

mod handlers;
mod mcp;

pub use handlers::*;
pub use mcp::*;

use std::sync::Arc;

use crate::compat::BaseMatrix;
use crate::config::Config;
use crate::storage::ReportStore;

/// Application state shared across handlers.
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// The report store.
    pub store: ReportStore,
    /// The injected base compatibility matrix.
    pub matrix: BaseMatrix,
}

impl AppState {
    /// Create new application state
    pub fn new(config: Config, store: ReportStore, matrix: BaseMatrix) -> Self {
        Self {
            config,
            store,
            matrix,
        }
    }
}

/// Shared application state handle
pub type SharedState = Arc<AppState>;
