use thiserror::Error;

/// Application-level errors
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Matrix error: {0}")]
    Matrix(#[from] MatrixError),

    #[error("MCP protocol error: {0}")]
    Mcp(#[from] McpError),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Report store and persistence errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Persistence I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Report serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Base compatibility matrix errors
#[derive(Debug, Error)]
pub enum MatrixError {
    #[error("Failed to read matrix file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed matrix document: {0}")]
    Parse(#[from] serde_json::Error),
}

/// MCP protocol errors
#[derive(Debug, Error)]
pub enum McpError {
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Unknown tool: {tool_name}")]
    UnknownTool { tool_name: String },

    #[error("Invalid parameters for {tool_name}: {message}")]
    InvalidParameters { tool_name: String, message: String },

    #[error("Tool execution failed: {message}")]
    ExecutionFailed { message: String },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type alias for MCP operations
pub type McpResult<T> = Result<T, McpError>;
