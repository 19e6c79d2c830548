//! Declarative validation rules for directive blocks
//!
//! Each directive that carries a validated body gets one [`DirectiveRule`].
//! A rule lists the accepted line shapes by token count, and each shape
//! lists the checks to run on its tokens. Adding a directive means adding a
//! table entry, not a new validation function.

use super::directives::{Directive, EncodingType};
use super::text::{starts_with_lowercase, starts_with_uppercase};
use super::types::Severity;

pub const TYPE_NAME_CASE_MESSAGE: &str = "Type name should always start with an uppercase letter";
pub const FIELD_NAME_CASE_MESSAGE: &str = "Field name should always start with a lowercase letter";
pub const INVALID_ENCODING_MESSAGE: &str =
    "Invalid encoding type! Please use one of N, NUM, S, STR, B, BER, P, PER, O, OER.";
pub const TEXT_ENCODING_ARGS_MESSAGE: &str = "Invalid number of arguments for encoding type {token}.";

/// What a firing check's diagnostic covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// First occurrence of the checked token in the normalized line
    Token,
    /// The whole normalized line
    Line,
}

/// One check against one token of a line
#[derive(Clone, Copy)]
pub struct TokenCheck {
    pub token_index: usize,
    pub severity: Severity,
    /// Returns true when the token violates the rule
    pub fires: fn(&str) -> bool,
    /// May contain `{token}`, replaced by the offending token
    pub message: &'static str,
    pub scope: Scope,
}

impl std::fmt::Debug for TokenCheck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCheck")
            .field("token_index", &self.token_index)
            .field("severity", &self.severity)
            .field("message", &self.message)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

impl TokenCheck {
    pub fn render_message(&self, token: &str) -> String {
        self.message.replace("{token}", token)
    }
}

/// Accepted line layout with its checks
#[derive(Debug, Clone)]
pub struct BodyShape {
    pub expected_token_count: usize,
    pub checks: Vec<TokenCheck>,
}

/// Validation rule for the body of one directive
#[derive(Debug, Clone)]
pub struct DirectiveRule {
    pub directive: Directive,
    /// Applied in order before whitespace normalization
    pub comment_markers: &'static [&'static str],
    pub invalid_entry_message: &'static str,
    pub shapes: Vec<BodyShape>,
}

impl DirectiveRule {
    pub fn label(&self) -> &'static str {
        self.directive.label()
    }

    /// Shape accepting exactly `token_count` tokens, if any
    pub fn shape_for(&self, token_count: usize) -> Option<&BodyShape> {
        self.shapes
            .iter()
            .find(|shape| shape.expected_token_count == token_count)
    }
}

fn not_uppercase(token: &str) -> bool {
    !starts_with_uppercase(token)
}

fn not_lowercase(token: &str) -> bool {
    !starts_with_lowercase(token)
}

fn unknown_encoding(token: &str) -> bool {
    EncodingType::from_symbol(token).is_none()
}

fn text_encoding(token: &str) -> bool {
    EncodingType::from_symbol(token).is_some_and(|encoding| encoding.is_text())
}

fn register_checks() -> Vec<TokenCheck> {
    vec![
        TokenCheck {
            token_index: 0,
            severity: Severity::Warning,
            fires: not_uppercase,
            message: TYPE_NAME_CASE_MESSAGE,
            scope: Scope::Token,
        },
        TokenCheck {
            token_index: 1,
            severity: Severity::Error,
            fires: unknown_encoding,
            message: INVALID_ENCODING_MESSAGE,
            scope: Scope::Token,
        },
    ]
}

/// `Name ENCODING` plus one or two OID/argument tokens.
///
/// Text encodings never take a trailing argument, so three tokens with a
/// text encoding is flagged across the whole line.
fn register_rule() -> DirectiveRule {
    let mut three = register_checks();
    three.push(TokenCheck {
        token_index: 1,
        severity: Severity::Error,
        fires: text_encoding,
        message: TEXT_ENCODING_ARGS_MESSAGE,
        scope: Scope::Line,
    });

    DirectiveRule {
        directive: Directive::Register,
        comment_markers: &["#", "-"],
        invalid_entry_message: "Invalid register entry",
        shapes: vec![
            BodyShape {
                expected_token_count: 3,
                checks: three,
            },
            BodyShape {
                expected_token_count: 4,
                checks: register_checks(),
            },
        ],
    }
}

fn type_rename_rule() -> DirectiveRule {
    DirectiveRule {
        directive: Directive::TypeRename,
        comment_markers: &["#"],
        invalid_entry_message: "Invalid type rename entry. Expected 2 tokens.",
        shapes: vec![BodyShape {
            expected_token_count: 2,
            checks: vec![TokenCheck {
                token_index: 1,
                severity: Severity::Warning,
                fires: not_uppercase,
                message: TYPE_NAME_CASE_MESSAGE,
                scope: Scope::Token,
            }],
        }],
    }
}

fn field_rename_rule() -> DirectiveRule {
    DirectiveRule {
        directive: Directive::FieldRename,
        comment_markers: &["#"],
        invalid_entry_message: "Invalid field rename entry. Expected 2 tokens.",
        shapes: vec![BodyShape {
            expected_token_count: 2,
            checks: vec![TokenCheck {
                token_index: 1,
                severity: Severity::Warning,
                fires: not_lowercase,
                message: FIELD_NAME_CASE_MESSAGE,
                scope: Scope::Token,
            }],
        }],
    }
}

/// Built-in rule table, in the order diagnostics are reported.
pub fn default_rules() -> Vec<DirectiveRule> {
    vec![register_rule(), type_rename_rule(), field_rename_rule()]
}
