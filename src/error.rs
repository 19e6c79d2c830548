//! Error types for cnf-lsp
//!
//! Validation itself never fails: malformed conformance files turn into
//! diagnostics. These errors cover the server plumbing around it.

use thiserror::Error;

/// Result type for cnf-lsp operations
pub type Result<T> = std::result::Result<T, CnfError>;

/// cnf-lsp error types
#[derive(Error, Debug)]
pub enum CnfError {
    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
