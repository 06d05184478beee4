use std::env;
use std::path::PathBuf;

use crate::error::AppError;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub store: StoreConfig,
    pub matrix: MatrixConfig,
    pub logging: LoggingConfig,
}

/// Report store configuration
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub path: PathBuf,
    pub max_reports: usize,
}

/// Base compatibility matrix configuration
#[derive(Debug, Clone)]
pub struct MatrixConfig {
    /// Path to the base matrix JSON document. When unset the server runs
    /// with an empty base matrix and every cell reads as unknown.
    pub path: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

/// Log output format
#[derive(Debug, Clone, PartialEq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Default retention cap on persisted reports.
pub const DEFAULT_MAX_REPORTS: usize = 500;

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, AppError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let store = StoreConfig {
            path: PathBuf::from(
                env::var("COMPAT_DATA_PATH").unwrap_or_else(|_| "./data/reports.json".to_string()),
            ),
            max_reports: env::var("COMPAT_MAX_REPORTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_MAX_REPORTS),
        };

        let matrix = MatrixConfig {
            path: env::var("COMPAT_MATRIX_PATH").ok().map(PathBuf::from),
        };

        let logging = LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            format: match env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .to_lowercase()
                .as_str()
            {
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
        };

        Ok(Self {
            store,
            matrix,
            logging,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store: StoreConfig {
                path: PathBuf::from("./data/reports.json"),
                max_reports: DEFAULT_MAX_REPORTS,
            },
            matrix: MatrixConfig { path: None },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: LogFormat::Pretty,
            },
        }
    }
}
