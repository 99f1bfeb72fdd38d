// src/error.rs

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrainlogError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database Error: {0}")]
    Sql(#[from] rusqlite::Error),

    /// The store file or its tables are missing, as opposed to being empty.
    #[error("Store unavailable: {0} (run `trainlog init` first)")]
    Unavailable(String),

    #[error("Home directory not found")]
    HomeDirNotFound,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Login failed: username or password does not match")]
    AuthenticationFailed,

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("User '{0}' not found")]
    UserNotFound(String),

    #[error("User '{0}' already exists")]
    UserExists(String),

    #[error("No {log_type} log for {username} on {date}")]
    LogNotFound {
        username: String,
        date: String,
        log_type: String,
    },

    #[error("Editor exited with a non-zero status")]
    EditorError,

    #[error("No changes detected in log content")]
    NoChangesMade,

    #[error("Export Error: {0}")]
    Export(#[from] rust_xlsxwriter::XlsxError),

    #[error("JSON Error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TrainlogError>;
