//! LSP wire types
//!
//! Only the subset of the protocol this server speaks. Field names follow
//! the protocol's camelCase spelling on the wire.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Name reported in the `source` field of every diagnostic
pub const DIAGNOSTIC_SOURCE: &str = "cnf-lsp";

/// Position in a document (zero-based line, UTF-16 column)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

/// Range in a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    /// Range covering `start..end` columns of a single line
    pub fn on_line(line: u32, start: u32, end: u32) -> Self {
        Self {
            start: Position::new(line, start),
            end: Position::new(line, end),
        }
    }
}

/// Diagnostic severity. Only errors and warnings are ever produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    /// Protocol code (1 = Error, 2 = Warning)
    pub fn code(&self) -> u8 {
        match self {
            Self::Error => 1,
            Self::Warning => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
        }
    }
}

impl Serialize for Severity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

impl<'de> Deserialize<'de> for Severity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match u8::deserialize(deserializer)? {
            1 => Ok(Self::Error),
            2 => Ok(Self::Warning),
            other => Err(serde::de::Error::custom(format!(
                "unsupported diagnostic severity {}",
                other
            ))),
        }
    }
}

/// Diagnostic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub range: Range,
    pub severity: Severity,
    pub source: String,
    pub message: String,
}

impl Diagnostic {
    pub fn new(severity: Severity, range: Range, message: impl Into<String>) -> Self {
        Self {
            range,
            severity,
            source: DIAGNOSTIC_SOURCE.to_string(),
            message: message.into(),
        }
    }
}

/// Publish diagnostics params
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishDiagnosticsParams {
    pub uri: String,
    pub diagnostics: Vec<Diagnostic>,
}

/// Initialize request parameters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    pub process_id: Option<i64>,
    pub root_uri: Option<String>,
    #[serde(default)]
    pub capabilities: ClientCapabilities,
    pub initialization_options: Option<serde_json::Value>,
}

/// Client capabilities
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientCapabilities {
    pub text_document: Option<TextDocumentClientCapabilities>,
}

/// Text document capabilities
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextDocumentClientCapabilities {
    pub completion: Option<CompletionClientCapabilities>,
}

/// Completion capabilities
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionClientCapabilities {
    pub completion_item: Option<CompletionItemCapabilities>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionItemCapabilities {
    pub snippet_support: Option<bool>,
}

/// Initialize result
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    pub capabilities: ServerCapabilities,
    pub server_info: Option<ServerInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: Option<String>,
}

/// Server capabilities
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerCapabilities {
    pub text_document_sync: TextDocumentSyncOptions,
    pub completion_provider: Option<CompletionOptions>,
    pub hover_provider: Option<bool>,
}

/// Text document sync options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextDocumentSyncOptions {
    pub open_close: bool,
    pub change: u8, // 1 = Full, 2 = Incremental
    pub save: Option<SaveOptions>,
}

/// Save options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveOptions {
    pub include_text: bool,
}

/// Completion options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionOptions {
    pub trigger_characters: Vec<String>,
    pub resolve_provider: bool,
}

/// Text document item
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextDocumentItem {
    pub uri: String,
    pub language_id: String,
    pub version: i64,
    pub text: String,
}

/// Text document identifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextDocumentIdentifier {
    pub uri: String,
}

/// Versioned text document identifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionedTextDocumentIdentifier {
    pub uri: String,
    pub version: i64,
}

/// Text document change event (full sync only)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextDocumentContentChangeEvent {
    pub text: String,
}

/// Document open params
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DidOpenParams {
    pub text_document: TextDocumentItem,
}

/// Document change params
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DidChangeParams {
    pub text_document: VersionedTextDocumentIdentifier,
    pub content_changes: Vec<TextDocumentContentChangeEvent>,
}

/// Document close params
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DidCloseParams {
    pub text_document: TextDocumentIdentifier,
}

/// Document save params
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DidSaveParams {
    pub text_document: TextDocumentIdentifier,
    pub text: Option<String>,
}

/// Position params shared by completion and hover
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextDocumentPositionParams {
    pub text_document: TextDocumentIdentifier,
    pub position: Position,
}

/// Text edit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextEdit {
    pub range: Range,
    pub new_text: String,
}

/// Completion item kinds used by this server
pub mod completion_kind {
    pub const KEYWORD: u8 = 14;
    pub const CONSTANT: u8 = 21;
}

/// Insert text formats
pub mod insert_text_format {
    pub const PLAIN_TEXT: u8 = 1;
    pub const SNIPPET: u8 = 2;
}

/// Completion item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionItem {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documentation: Option<MarkupContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insert_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insert_text_format: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_edit: Option<TextEdit>,
}

/// Hover result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hover {
    pub contents: MarkupContent,
    pub range: Option<Range>,
}

/// Markup content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkupContent {
    pub kind: String,
    pub value: String,
}

impl MarkupContent {
    pub fn markdown(value: impl Into<String>) -> Self {
        Self {
            kind: "markdown".to_string(),
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_diagnostic_wire_format() {
        let diagnostic = Diagnostic::new(
            Severity::Warning,
            Range::on_line(1, 8, 15),
            "Field name should always start with a lowercase letter",
        );

        assert_eq!(
            serde_json::to_value(&diagnostic).unwrap(),
            json!({
                "range": {
                    "start": { "line": 1, "character": 8 },
                    "end": { "line": 1, "character": 15 }
                },
                "severity": 2,
                "source": "cnf-lsp",
                "message": "Field name should always start with a lowercase letter"
            })
        );
    }

    #[test]
    fn test_severity_rejects_unknown_codes() {
        assert_eq!(serde_json::from_value::<Severity>(json!(1)).unwrap(), Severity::Error);
        assert!(serde_json::from_value::<Severity>(json!(4)).is_err());
    }

    #[test]
    fn test_initialize_params_tolerate_missing_fields() {
        let params: InitializeParams = serde_json::from_value(json!({ "processId": null })).unwrap();
        assert!(params.capabilities.text_document.is_none());
        assert!(params.initialization_options.is_none());
    }
}
