// Error types for the sample-data workflow
use thiserror::Error;

/// Failures raised by this crate itself. Store errors stay as native
/// `rusqlite::Error` values inside `anyhow::Error`.
#[derive(Error, Debug)]
pub enum WorkflowError {
    /// Another holder of the connection panicked while it was locked
    #[error("Database connection lock poisoned")]
    LockPoisoned,

    /// Table name that is not part of the declared schema
    #[error("Unknown table: {0}")]
    UnknownTable(String),

    /// Settings that cannot drive the workflow
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    #[error("Failed to read settings file: {0}")]
    SettingsRead(#[source] std::io::Error),

    #[error("Invalid settings JSON: {0}")]
    SettingsFormat(#[source] serde_json::Error),

    #[error("Failed to serialize settings: {0}")]
    SettingsEncode(#[source] serde_json::Error),

    #[error("Failed to write settings file: {0}")]
    SettingsWrite(#[source] std::io::Error),
}
