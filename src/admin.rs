//! CLI commands for store administration.
//!
//! Provides the administrative operations (export, import, stats, clear)
//! as subcommands so they can run without an MCP client attached.

use std::path::PathBuf;

use clap::Subcommand;

use crate::storage::ReportStore;

/// Store administration subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum AdminCommands {
    /// Export the retained reports as JSON
    Export {
        /// Write to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Merge a JSON report collection into the store
    Import {
        /// File containing the serialized report collection
        file: PathBuf,
    },

    /// Show summary statistics over the retained reports
    Stats,

    /// Remove every retained report
    Clear {
        /// Confirm the irreversible clear
        #[arg(long)]
        yes: bool,
    },
}

/// Result of CLI command execution.
pub struct CliResult {
    /// Exit code (0 = success)
    pub exit_code: i32,
    /// Output message
    pub message: String,
}

impl CliResult {
    /// Create a success result with the given message.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            exit_code: 0,
            message: message.into(),
        }
    }

    /// Create an error result with the given message.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            exit_code: 1,
            message: message.into(),
        }
    }
}

/// Execute an administration CLI command.
pub async fn execute_command(command: AdminCommands, store: &ReportStore) -> CliResult {
    match command {
        AdminCommands::Export { output } => execute_export(store, output).await,
        AdminCommands::Import { file } => execute_import(store, file).await,
        AdminCommands::Stats => execute_stats(store).await,
        AdminCommands::Clear { yes } => execute_clear(store, yes).await,
    }
}

async fn execute_export(store: &ReportStore, output: Option<PathBuf>) -> CliResult {
    let json = store.export().await;

    match output {
        Some(path) => match tokio::fs::write(&path, &json).await {
            Ok(()) => CliResult::success(format!("Exported reports to {}", path.display())),
            Err(e) => CliResult::error(format!("Failed to write {}: {}", path.display(), e)),
        },
        None => CliResult::success(json),
    }
}

async fn execute_import(store: &ReportStore, file: PathBuf) -> CliResult {
    let json = match tokio::fs::read_to_string(&file).await {
        Ok(json) => json,
        Err(e) => return CliResult::error(format!("Failed to read {}: {}", file.display(), e)),
    };

    let merged = store.import(&json).await;
    CliResult::success(format!("Merged {} new report(s)", merged))
}

async fn execute_stats(store: &ReportStore) -> CliResult {
    let stats = store.stats().await;

    let mut lines = vec![
        format!("Total reports:  {}", stats.total),
        format!("Verified:       {}", stats.verified),
        format!(
            "By status:      works={} partial={} broken={} unknown={}",
            stats.by_status.works,
            stats.by_status.partial,
            stats.by_status.broken,
            stats.by_status.unknown
        ),
    ];
    if !stats.by_client.is_empty() {
        let clients: Vec<String> = stats
            .by_client
            .iter()
            .map(|(id, count)| format!("{}={}", id, count))
            .collect();
        lines.push(format!("By client:      {}", clients.join(" ")));
    }
    if !stats.by_server.is_empty() {
        let servers: Vec<String> = stats
            .by_server
            .iter()
            .map(|(id, count)| format!("{}={}", id, count))
            .collect();
        lines.push(format!("By server:      {}", servers.join(" ")));
    }

    CliResult::success(lines.join("\n"))
}

async fn execute_clear(store: &ReportStore, yes: bool) -> CliResult {
    if !yes {
        return CliResult::error("Refusing to clear without --yes");
    }

    store.clear().await;
    CliResult::success("All reports cleared")
}
