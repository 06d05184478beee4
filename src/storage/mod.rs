//! Storage layer for compatibility report persistence.
//!
//! This module provides the report model, the [`Persistence`] capability
//! used to read and write the serialized report collection, and the
//! [`ReportStore`] that implements pair-identity submission, voting,
//! statistics, and import/export on top of it.

mod file;
mod memory;
mod store;


pub use file::FilePersistence;
pub use memory::MemoryPersistence;
pub use store::ReportStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StoreResult;

/// Compatibility judgment carried by a report and by the aggregated
/// consensus.
///
/// Variant order is significant: it is the fixed tie-break order used by
/// the vote aggregator, and the order buckets are tallied in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompatStatus {
    /// The pair works as expected.
    Works,
    /// The pair works with caveats.
    Partial,
    /// The pair does not work.
    Broken,
    /// No judgment available.
    #[default]
    Unknown,
}

impl CompatStatus {
    /// All statuses in tally/tie-break order.
    pub const ALL: [CompatStatus; 4] = [
        CompatStatus::Works,
        CompatStatus::Partial,
        CompatStatus::Broken,
        CompatStatus::Unknown,
    ];
}

impl std::fmt::Display for CompatStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompatStatus::Works => write!(f, "works"),
            CompatStatus::Partial => write!(f, "partial"),
            CompatStatus::Broken => write!(f, "broken"),
            CompatStatus::Unknown => write!(f, "unknown"),
        }
    }
}

impl std::str::FromStr for CompatStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "works" => Ok(CompatStatus::Works),
            "partial" => Ok(CompatStatus::Partial),
            "broken" => Ok(CompatStatus::Broken),
            "unknown" => Ok(CompatStatus::Unknown),
            _ => Err(format!("Unknown compat status: {}", s)),
        }
    }
}

/// Transport a report was exercised over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transport {
    /// Standard input/output transport.
    #[default]
    Stdio,
    /// Server-sent events transport.
    Sse,
    /// Both stdio and SSE.
    Both,
}

impl std::fmt::Display for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Transport::Stdio => write!(f, "stdio"),
            Transport::Sse => write!(f, "sse"),
            Transport::Both => write!(f, "both"),
        }
    }
}

impl std::str::FromStr for Transport {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "stdio" => Ok(Transport::Stdio),
            "sse" => Ok(Transport::Sse),
            "both" => Ok(Transport::Both),
            _ => Err(format!("Unknown transport: {}", s)),
        }
    }
}

/// One user's assertion about a client/server pair.
///
/// At most one report per (client_id, server_id) pair is retained as
/// current; resubmitting for the same pair overwrites the content while
/// preserving the id and vote counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompatReport {
    /// Unique report identifier, stable across resubmissions.
    pub id: String,
    /// Client identifier (slug).
    pub client_id: String,
    /// Human-readable client name.
    #[serde(default)]
    pub client_name: String,
    /// Server identifier (slug).
    pub server_id: String,
    /// Human-readable server name.
    #[serde(default)]
    pub server_name: String,
    /// The reported compatibility judgment.
    pub status: CompatStatus,
    /// Transport the pair was exercised over.
    #[serde(default)]
    pub transport: Transport,
    /// Free-text notes.
    #[serde(default)]
    pub notes: String,
    /// Free-text client/server version information.
    #[serde(default)]
    pub version: String,
    /// Creation or last-update instant.
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
    /// Moderation flag. No in-core writer; resubmission resets it.
    #[serde(default)]
    pub verified: bool,
    /// Number of upvotes.
    #[serde(default)]
    pub upvotes: u32,
    /// Number of downvotes.
    #[serde(default)]
    pub downvotes: u32,
}

/// Input for submitting a report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportInput {
    /// Client identifier (slug).
    pub client_id: String,
    /// Human-readable client name.
    pub client_name: String,
    /// Server identifier (slug).
    pub server_id: String,
    /// Human-readable server name.
    pub server_name: String,
    /// The reported compatibility judgment.
    pub status: CompatStatus,
    /// Transport the pair was exercised over.
    pub transport: Transport,
    /// Free-text notes.
    #[serde(default)]
    pub notes: String,
    /// Free-text version information.
    #[serde(default)]
    pub version: String,
}

impl CompatReport {
    /// Create a fresh report from submission input
    pub fn new(input: ReportInput) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            client_id: input.client_id,
            client_name: input.client_name,
            server_id: input.server_id,
            server_name: input.server_name,
            status: input.status,
            transport: input.transport,
            notes: input.notes,
            version: input.version,
            timestamp: Utc::now(),
            verified: false,
            upvotes: 0,
            downvotes: 0,
        }
    }

    /// Set vote counts
    pub fn with_votes(mut self, upvotes: u32, downvotes: u32) -> Self {
        self.upvotes = upvotes;
        self.downvotes = downvotes;
        self
    }

    /// Set the moderation flag
    pub fn with_verified(mut self, verified: bool) -> Self {
        self.verified = verified;
        self
    }

    /// Whether this report is about the given pair
    pub fn is_pair(&self, client_id: &str, server_id: &str) -> bool {
        self.client_id == client_id && self.server_id == server_id
    }
}

/// Per-status report counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    /// Reports with status `works`.
    pub works: usize,
    /// Reports with status `partial`.
    pub partial: usize,
    /// Reports with status `broken`.
    pub broken: usize,
    /// Reports with status `unknown`.
    pub unknown: usize,
}

/// Summary statistics over the retained report collection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportStats {
    /// Total retained reports.
    pub total: usize,
    /// Counts per status.
    pub by_status: StatusCounts,
    /// Report counts per client id.
    pub by_client: std::collections::BTreeMap<String, usize>,
    /// Report counts per server id.
    pub by_server: std::collections::BTreeMap<String, usize>,
    /// Reports carrying the moderation flag.
    pub verified: usize,
}

/// Capability for reading and writing the serialized report collection.
///
/// The store treats the persisted representation as a single opaque blob
/// under one logical key; implementations decide where that blob lives.
#[async_trait]
pub trait Persistence: Send + Sync {
    /// Read the persisted blob, `None` when nothing was stored yet.
    async fn load(&self) -> StoreResult<Option<Vec<u8>>>;
    /// Replace the persisted blob.
    async fn save(&self, bytes: &[u8]) -> StoreResult<()>;
}
