//! cnf-lsp - language server for asn2wrs conformance files
//!
//! asn2wrs generates Wireshark dissectors from ASN.1 modules and reads
//! `.cnf` conformance files for the extra knowledge it needs. This crate
//! checks those files and serves the results to editors:
//!
//! - Block location and rule-driven validation of directive bodies
//! - Completion and hover over the directive catalog
//! - A stdio language server with debounced diagnostics

pub mod config;
pub mod error;
pub mod lsp;

pub use error::{CnfError, Result};
