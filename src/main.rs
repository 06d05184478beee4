use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use mcp_compat_reports::{
    admin::{self, AdminCommands},
    compat::BaseMatrix,
    config::Config,
    server::{AppState, McpServer},
    storage::{FilePersistence, ReportStore},
};

/// MCP server and admin CLI for client-server compatibility reports.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Administrative command; without one the MCP server runs on stdio.
    #[command(subcommand)]
    command: Option<AdminCommands>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize logging
    init_logging(&config);

    // Initialize the report store
    let persistence = match FilePersistence::new(&config.store.path) {
        Ok(p) => {
            info!(path = %config.store.path.display(), "Report store initialized");
            Arc::new(p)
        }
        Err(e) => {
            error!(error = %e, "Failed to initialize report store");
            return Err(e.into());
        }
    };
    let store = ReportStore::new(persistence, config.store.max_reports);

    // Administrative commands run against the store and exit
    if let Some(command) = cli.command {
        let result = admin::execute_command(command, &store).await;
        if result.exit_code == 0 {
            println!("{}", result.message);
        } else {
            eprintln!("{}", result.message);
        }
        std::process::exit(result.exit_code);
    }

    // Load the base compatibility matrix
    let matrix = match &config.matrix.path {
        Some(path) => match BaseMatrix::from_path(path) {
            Ok(m) => {
                info!(path = %path.display(), clients = m.clients.len(), "Base matrix loaded");
                m
            }
            Err(e) => {
                error!(error = %e, "Failed to load base matrix");
                return Err(e.into());
            }
        },
        None => {
            info!("No base matrix configured, starting with an empty table");
            BaseMatrix::default()
        }
    };

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "MCP Compat Reports Server starting..."
    );

    // Create application state and start the MCP server
    let state = Arc::new(AppState::new(config, store, matrix));
    let server = McpServer::new(state);

    info!("Server ready, waiting for requests on stdin...");

    if let Err(e) = server.run().await {
        error!(error = %e, "Server error");
        return Err(e.into());
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Initialize tracing/logging
fn init_logging(config: &Config) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format {
        mcp_compat_reports::config::LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        mcp_compat_reports::config::LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}
