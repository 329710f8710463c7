//! Reconciliation error types and exit codes

use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for callers that surface errors as a process status
/// - 1: General error (configuration, local I/O)
/// - 3: Network error
/// - 4: Validation / data-integrity error
/// - 5: Server error
/// - 6: Server response violated the expected contract
pub type SyncResult<T> = Result<T, SyncError>;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Connection failed: {0}\n\nTroubleshooting:\n  - Check that the identity server is running\n  - Verify server.base_url in the configuration")]
    ConnectionFailed(String),

    #[error("Error while {operation}. Status code: {status}, Error: {message}")]
    Status {
        operation: String,
        status: u16,
        message: String,
    },

    #[error("Unexpected response while {operation}: {message}")]
    Decode { operation: String, message: String },

    #[error("Failed to read file {}: {message}", path.display())]
    Read { path: PathBuf, message: String },

    #[error("Failed to parse {source_name}: {message}")]
    Parse {
        source_name: String,
        message: String,
    },

    #[error("Duplicate {resource_type} name on server: {name}")]
    DuplicateName {
        resource_type: String,
        name: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Template error: {0}")]
    Template(String),

    #[error("{0} resource(s) could not be processed")]
    Incomplete(usize),
}

impl SyncError {
    /// Build a status error, classifying the code into a readable message.
    pub fn status(operation: impl Into<String>, status: u16) -> Self {
        SyncError::Status {
            operation: operation.into(),
            status,
            message: crate::status::describe(status).to_string(),
        }
    }

    /// Whether this error must abort the whole run.
    ///
    /// A success response that cannot be decoded means the server no longer
    /// speaks the expected contract; continuing would act on corrupt data.
    pub fn is_fatal(&self) -> bool {
        matches!(self, SyncError::Decode { .. })
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            SyncError::Network(_) | SyncError::ConnectionFailed(_) => 3,
            SyncError::Status { status, .. } => {
                if *status >= 500 {
                    5
                } else {
                    4
                }
            }
            SyncError::Decode { .. } => 6,
            SyncError::Parse { .. } | SyncError::DuplicateName { .. } => 4,
            SyncError::Template(_) => 4,
            SyncError::Read { .. }
            | SyncError::Config(_)
            | SyncError::Io(_)
            | SyncError::Incomplete(_) => 1,
        }
    }

    /// Print the error to stderr with appropriate formatting
    pub fn print(&self) {
        let use_color = std::env::var("NO_COLOR").is_err();

        if use_color {
            eprintln!("\x1b[31mError:\x1b[0m {}", self);
        } else {
            eprintln!("Error: {}", self);
        }

        if let Some(suggestion) = self.suggestion() {
            if use_color {
                eprintln!("\n\x1b[33mSuggestion:\x1b[0m {}", suggestion);
            } else {
                eprintln!("\nSuggestion: {}", suggestion);
            }
        }
    }

    fn suggestion(&self) -> Option<&'static str> {
        match self {
            SyncError::Status { status: 401, .. } => {
                Some("Check server.token, or set IDSYNC_TOKEN for this run.")
            }
            SyncError::DuplicateName { .. } => {
                Some("Rename one of the resources on the server before exporting.")
            }
            SyncError::Decode { .. } => {
                Some("Verify that server.base_url points at a supported identity server.")
            }
            SyncError::Incomplete(_) => Some("Run with --log-level debug to see each failure."),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() {
            SyncError::ConnectionFailed(e.to_string())
        } else if e.is_timeout() {
            SyncError::Network("Request timed out".to_string())
        } else {
            SyncError::Network(e.to_string())
        }
    }
}

impl From<std::io::Error> for SyncError {
    fn from(e: std::io::Error) -> Self {
        SyncError::Io(e.to_string())
    }
}

impl From<serde_yaml::Error> for SyncError {
    fn from(e: serde_yaml::Error) -> Self {
        SyncError::Parse {
            source_name: "YAML document".to_string(),
            message: e.to_string(),
        }
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(e: serde_json::Error) -> Self {
        SyncError::Parse {
            source_name: "JSON document".to_string(),
            message: e.to_string(),
        }
    }
}
