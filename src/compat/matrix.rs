use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::MatrixError;
use crate::storage::{CompatStatus, Transport};

/// Editorial compatibility judgment in the base matrix vocabulary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaseStatus {
    /// The pair is known to work.
    Yes,
    /// The pair works with caveats.
    Partial,
    /// The pair is known not to work.
    No,
    /// No editorial judgment.
    #[default]
    Unknown,
}

impl std::fmt::Display for BaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BaseStatus::Yes => write!(f, "yes"),
            BaseStatus::Partial => write!(f, "partial"),
            BaseStatus::No => write!(f, "no"),
            BaseStatus::Unknown => write!(f, "unknown"),
        }
    }
}

impl std::str::FromStr for BaseStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "yes" => Ok(BaseStatus::Yes),
            "partial" => Ok(BaseStatus::Partial),
            "no" => Ok(BaseStatus::No),
            "unknown" => Ok(BaseStatus::Unknown),
            _ => Err(format!("Unknown base status: {}", s)),
        }
    }
}

impl From<BaseStatus> for CompatStatus {
    fn from(status: BaseStatus) -> Self {
        match status {
            BaseStatus::Yes => CompatStatus::Works,
            BaseStatus::Partial => CompatStatus::Partial,
            BaseStatus::No => CompatStatus::Broken,
            BaseStatus::Unknown => CompatStatus::Unknown,
        }
    }
}

/// Catalog entry for one MCP client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInfo {
    /// Human-readable client name.
    pub name: String,
    /// Display icon.
    #[serde(default)]
    pub icon: String,
    /// Transports the client speaks.
    pub transports: Vec<Transport>,
    /// Minimum supported version.
    #[serde(default)]
    pub version: String,
    /// Relative popularity score used for catalog ordering.
    #[serde(default)]
    pub popularity: u32,
}

/// Transport requirements of one MCP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerTransport {
    /// Transports the server supports.
    pub supports: Vec<Transport>,
    /// The transport the catalog recommends.
    pub recommended: Transport,
}

/// Transport compatibility between one client and one server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportInfo {
    /// Transports the client speaks.
    pub client_transports: Vec<Transport>,
    /// Transports the server supports.
    pub server_transports: Vec<Transport>,
    /// Whether the two share at least one transport.
    pub compatible: bool,
    /// The server's recommended transport, when both sides are known.
    pub recommended: Option<Transport>,
}

/// The editorially maintained base compatibility table.
///
/// Injected, read-only input: the merge never mutates it, and the store
/// never writes to it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BaseMatrix {
    /// Client catalog entries keyed by client id.
    #[serde(default)]
    pub clients: BTreeMap<String, ClientInfo>,
    /// Server transport requirements keyed by server id.
    #[serde(default)]
    pub server_transports: BTreeMap<String, ServerTransport>,
    /// Compatibility cells keyed by client id, then server id.
    #[serde(default)]
    pub compatibility: BTreeMap<String, BTreeMap<String, BaseStatus>>,
    /// Editorial notes keyed by `"client:server"` or a bare server id.
    #[serde(default)]
    pub notes: BTreeMap<String, String>,
}

impl BaseMatrix {
    /// Parse a matrix document from JSON.
    pub fn from_json(json: &str) -> Result<Self, MatrixError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a matrix document from a file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, MatrixError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// The editorial judgment for a pair; missing cells read as unknown.
    pub fn compatibility(&self, client_id: &str, server_id: &str) -> BaseStatus {
        self.compatibility
            .get(client_id)
            .and_then(|row| row.get(server_id))
            .copied()
            .unwrap_or_default()
    }

    /// Editorial note for a pair: the `"client:server"` key wins, falling
    /// back to a server-wide note.
    pub fn note(&self, client_id: &str, server_id: &str) -> Option<&str> {
        self.notes
            .get(&format!("{}:{}", client_id, server_id))
            .or_else(|| self.notes.get(server_id))
            .map(String::as_str)
    }

    /// Clients whose cell for `server_id` is `yes`.
    pub fn compatible_clients(&self, server_id: &str) -> Vec<&str> {
        self.compatibility
            .iter()
            .filter(|(_, row)| row.get(server_id) == Some(&BaseStatus::Yes))
            .map(|(client_id, _)| client_id.as_str())
            .collect()
    }

    /// Servers whose cell for `client_id` is `yes`.
    pub fn compatible_servers(&self, client_id: &str) -> Vec<&str> {
        match self.compatibility.get(client_id) {
            Some(row) => row
                .iter()
                .filter(|(_, status)| **status == BaseStatus::Yes)
                .map(|(server_id, _)| server_id.as_str())
                .collect(),
            None => Vec::new(),
        }
    }

    /// Servers that require SSE (support it and nothing else).
    pub fn sse_only_servers(&self) -> Vec<&str> {
        self.server_transports
            .iter()
            .filter(|(_, t)| {
                t.supports.contains(&Transport::Sse) && !t.supports.contains(&Transport::Stdio)
            })
            .map(|(server_id, _)| server_id.as_str())
            .collect()
    }

    /// Transport compatibility info for a pair. Unknown clients or
    /// servers yield an empty, incompatible result.
    pub fn transport_info(&self, client_id: &str, server_id: &str) -> TransportInfo {
        let client = self.clients.get(client_id);
        let server = self.server_transports.get(server_id);

        match (client, server) {
            (Some(client), Some(server)) => {
                let compatible = client
                    .transports
                    .iter()
                    .any(|t| server.supports.contains(t));
                TransportInfo {
                    client_transports: client.transports.clone(),
                    server_transports: server.supports.clone(),
                    compatible,
                    recommended: Some(server.recommended),
                }
            }
            _ => TransportInfo {
                client_transports: Vec::new(),
                server_transports: Vec::new(),
                compatible: false,
                recommended: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_matrix() -> BaseMatrix {
        BaseMatrix::from_json(
            r#"{
                "clients": {
                    "claude-desktop": {
                        "name": "Claude Desktop",
                        "icon": "robot",
                        "transports": ["stdio", "sse"],
                        "version": "0.4.0+",
                        "popularity": 95
                    },
                    "cursor": {
                        "name": "Cursor",
                        "transports": ["stdio"],
                        "version": "0.40+",
                        "popularity": 85
                    }
                },
                "server_transports": {
                    "github-mcp": { "supports": ["stdio"], "recommended": "stdio" },
                    "mindsdb-mcp": { "supports": ["sse"], "recommended": "sse" },
                    "postgres-mcp": { "supports": ["stdio", "sse"], "recommended": "stdio" }
                },
                "compatibility": {
                    "claude-desktop": {
                        "github-mcp": "yes",
                        "mindsdb-mcp": "yes"
                    },
                    "cursor": {
                        "github-mcp": "yes",
                        "mindsdb-mcp": "no",
                        "postgres-mcp": "partial"
                    }
                },
                "notes": {
                    "cursor:mindsdb-mcp": "Requires SSE transport",
                    "postgres-mcp": "Needs a connection string"
                }
            }"#,
        )
        .expect("sample matrix should parse")
    }

    #[test]
    fn test_compatibility_lookup() {
        let matrix = sample_matrix();
        assert_eq!(
            matrix.compatibility("cursor", "github-mcp"),
            BaseStatus::Yes
        );
        assert_eq!(
            matrix.compatibility("cursor", "mindsdb-mcp"),
            BaseStatus::No
        );
        assert_eq!(
            matrix.compatibility("cursor", "never-heard-of-it"),
            BaseStatus::Unknown
        );
        assert_eq!(
            matrix.compatibility("unknown-client", "github-mcp"),
            BaseStatus::Unknown
        );
    }

    #[test]
    fn test_note_prefers_pair_key() {
        let matrix = sample_matrix();
        assert_eq!(
            matrix.note("cursor", "mindsdb-mcp"),
            Some("Requires SSE transport")
        );
        assert_eq!(
            matrix.note("cursor", "postgres-mcp"),
            Some("Needs a connection string")
        );
        assert_eq!(matrix.note("cursor", "github-mcp"), None);
    }

    #[test]
    fn test_compatible_clients_and_servers() {
        let matrix = sample_matrix();
        assert_eq!(
            matrix.compatible_clients("mindsdb-mcp"),
            vec!["claude-desktop"]
        );
        assert_eq!(matrix.compatible_servers("cursor"), vec!["github-mcp"]);
        assert!(matrix.compatible_servers("unknown-client").is_empty());
    }

    #[test]
    fn test_sse_only_servers() {
        let matrix = sample_matrix();
        assert_eq!(matrix.sse_only_servers(), vec!["mindsdb-mcp"]);
    }

    #[test]
    fn test_transport_info() {
        let matrix = sample_matrix();

        let info = matrix.transport_info("cursor", "mindsdb-mcp");
        assert!(!info.compatible);
        assert_eq!(info.recommended, Some(Transport::Sse));

        let info = matrix.transport_info("claude-desktop", "mindsdb-mcp");
        assert!(info.compatible);

        let info = matrix.transport_info("cursor", "never-heard-of-it");
        assert!(!info.compatible);
        assert!(info.recommended.is_none());
        assert!(info.client_transports.is_empty());
    }

    #[test]
    fn test_empty_document_parses() {
        let matrix = BaseMatrix::from_json("{}").unwrap();
        assert!(matrix.clients.is_empty());
        assert_eq!(
            matrix.compatibility("anyone", "anything"),
            BaseStatus::Unknown
        );
    }

    #[test]
    fn test_base_status_round_trip() {
        for (text, status) in [
            ("yes", BaseStatus::Yes),
            ("partial", BaseStatus::Partial),
            ("no", BaseStatus::No),
            ("unknown", BaseStatus::Unknown),
        ] {
            assert_eq!(text.parse::<BaseStatus>().unwrap(), status);
            assert_eq!(status.to_string(), text);
        }
        assert!("maybe".parse::<BaseStatus>().is_err());
    }
}
