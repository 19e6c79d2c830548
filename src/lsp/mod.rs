//! asn2wrs conformance file Language Server Protocol implementation
//!
//! Provides IDE support for `.cnf` editing including:
//! - Diagnostics for `#.REGISTER`, `#.TYPE_RENAME` and `#.FIELD_RENAME` blocks
//! - Auto-completion of directives, option keywords and encodings
//! - Hover documentation

pub mod blocks;
mod completion;
mod diagnostics;
pub mod directives;
mod hover;
pub mod rules;
mod server;
mod session;
pub mod text;
pub mod transport;
pub mod types;
pub mod validator;

pub use completion::CompletionProvider;
pub use diagnostics::{validate_document, DiagnosticsProvider};
pub use hover::HoverProvider;
pub use server::{CnfLanguageServer, LspMessage, RequestId, ServerAction};
pub use session::{serve_stdio, spawn_reader, Session};
pub use types::{Diagnostic, Position, Range, Severity};
