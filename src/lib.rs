//! # MCP Compat Reports Server
//!
//! A Model Context Protocol (MCP) server that collects user-submitted
//! client↔server compatibility reports, derives a vote-weighted consensus
//! per pair, and merges that consensus into an editorially curated base
//! compatibility matrix.
//!
//! ## Features
//!
//! - **Report Store**: bounded, pair-keyed report collection with
//!   overwrite-on-resubmission semantics and oldest-first eviction
//! - **Vote Aggregation**: upvote/downvote-weighted consensus with a
//!   per-report weight floor and a deterministic tie-break
//! - **Matrix Merging**: effective compatibility view that only overrides
//!   editorial judgments above a strict confidence threshold
//! - **Import/Export**: id-deduplicated JSON exchange of report
//!   collections
//! - **Admin CLI**: export/import/stats/clear without an MCP client
//!
//! ## Architecture
//!
//! ```text
//! MCP Client → MCP Server (stdio JSON-RPC) → ReportStore → Persistence (JSON blob)
//!                        ↓
//!                  BaseMatrix (read-only, injected)
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use mcp_compat_reports::{AppState, Config, McpServer};
//! use mcp_compat_reports::compat::BaseMatrix;
//! use mcp_compat_reports::storage::{FilePersistence, ReportStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let persistence = Arc::new(FilePersistence::new(&config.store.path)?);
//!     let store = ReportStore::new(persistence, config.store.max_reports);
//!     let state = Arc::new(AppState::new(config, store, BaseMatrix::default()));
//!     let server = McpServer::new(state);
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

/// Store administration CLI commands.
pub mod admin;
/// Compatibility consensus logic: aggregation, base matrix, merging.
pub mod compat;
/// Configuration management for the MCP server.
pub mod config;
/// Error types and result aliases for the application.
pub mod error;
/// MCP server implementation and request handling.
pub mod server;
/// Report model and persistence layer.
pub mod storage;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use server::{AppState, McpServer, SharedState};
