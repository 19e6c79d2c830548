//! Diagnostics Provider for conformance files

use super::blocks::find_blocks;
use super::rules::{default_rules, DirectiveRule};
use super::text::{split_lines, DIRECTIVE_SENTINEL};
use super::types::Diagnostic;
use super::validator::validate_block;
use tracing::debug;

/// Diagnostics provider for conformance files
pub struct DiagnosticsProvider {
    rules: Vec<DirectiveRule>,
}

impl DiagnosticsProvider {
    /// Create a provider with the built-in rule table
    pub fn new() -> Self {
        Self::with_rules(default_rules())
    }

    /// Create a provider over a custom rule table
    pub fn with_rules(rules: Vec<DirectiveRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[DirectiveRule] {
        &self.rules
    }

    /// Validate a whole document.
    ///
    /// Diagnostics are grouped by rule, then block, then line. Nothing is
    /// deduplicated.
    pub fn validate_document(&self, text: &str) -> Vec<Diagnostic> {
        let lines = split_lines(text);
        let mut diagnostics = Vec::new();

        for rule in &self.rules {
            for block in find_blocks(rule.label(), DIRECTIVE_SENTINEL, &lines) {
                let found = validate_block(&lines, block, rule);
                debug!(
                    directive = rule.label(),
                    start = block.start,
                    end = block.end,
                    count = found.len(),
                    "validated block"
                );
                diagnostics.extend(found);
            }
        }

        diagnostics
    }
}

impl Default for DiagnosticsProvider {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate `text` with the built-in rules.
pub fn validate_document(text: &str) -> Vec<Diagnostic> {
    DiagnosticsProvider::new().validate_document(text)
}
