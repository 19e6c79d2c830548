//! Conformance file LSP server implementation
//!
//! The server is a synchronous state machine: it takes one raw JSON-RPC
//! message and returns the actions the session has to carry out. It never
//! touches stdio or timers itself.

use super::completion::CompletionProvider;
use super::diagnostics::DiagnosticsProvider;
use super::hover::HoverProvider;
use super::types::*;
use crate::config::ServerConfig;
use crate::error::{CnfError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// JSON-RPC error codes
pub mod error_code {
    pub const PARSE_ERROR: i64 = -32700;
    pub const INVALID_REQUEST: i64 = -32600;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INVALID_PARAMS: i64 = -32602;
}

/// Request id, a number or a string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    Number(i64),
    String(String),
}

/// LSP messages handled by the server
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "method")]
pub enum LspMessage {
    #[serde(rename = "initialize")]
    Initialize { id: RequestId, params: InitializeParams },

    #[serde(rename = "initialized")]
    Initialized,

    #[serde(rename = "shutdown")]
    Shutdown { id: RequestId },

    #[serde(rename = "exit")]
    Exit,

    #[serde(rename = "textDocument/didOpen")]
    DidOpen { params: DidOpenParams },

    #[serde(rename = "textDocument/didChange")]
    DidChange { params: DidChangeParams },

    #[serde(rename = "textDocument/didClose")]
    DidClose { params: DidCloseParams },

    #[serde(rename = "textDocument/didSave")]
    DidSave { params: DidSaveParams },

    #[serde(rename = "textDocument/completion")]
    Completion {
        id: RequestId,
        params: TextDocumentPositionParams,
    },

    #[serde(rename = "completionItem/resolve")]
    CompletionResolve { id: RequestId, params: CompletionItem },

    #[serde(rename = "textDocument/hover")]
    Hover {
        id: RequestId,
        params: TextDocumentPositionParams,
    },
}

const KNOWN_METHODS: [&str; 11] = [
    "initialize",
    "initialized",
    "shutdown",
    "exit",
    "textDocument/didOpen",
    "textDocument/didChange",
    "textDocument/didClose",
    "textDocument/didSave",
    "textDocument/completion",
    "completionItem/resolve",
    "textDocument/hover",
];

/// Work the session has to do after a message was handled
#[derive(Debug, Clone, PartialEq)]
pub enum ServerAction {
    /// Write this message to the client
    Send(Value),
    /// Publish diagnostics for the document once it has settled
    Schedule(String),
    /// Forget any pending publish for the document
    Cancel(String),
    /// Stop the session
    Exit,
}

/// Document state
struct DocumentState {
    content: String,
    version: i64,
}

/// Conformance file language server
pub struct CnfLanguageServer {
    documents: HashMap<String, DocumentState>,
    completion_provider: CompletionProvider,
    hover_provider: HoverProvider,
    diagnostics_provider: DiagnosticsProvider,
    config: ServerConfig,
    snippet_support: bool,
    shutdown_requested: bool,
}

impl CnfLanguageServer {
    /// Create a new language server
    pub fn new(config: ServerConfig) -> Self {
        Self {
            documents: HashMap::new(),
            completion_provider: CompletionProvider::new(),
            hover_provider: HoverProvider::new(),
            diagnostics_provider: DiagnosticsProvider::new(),
            config,
            snippet_support: false,
            shutdown_requested: false,
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn is_open(&self, uri: &str) -> bool {
        self.documents.contains_key(uri)
    }

    /// Handle one raw JSON-RPC message
    pub fn handle_message(&mut self, raw: &str) -> Vec<ServerAction> {
        let value: Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(e) => {
                warn!("Dropping unparsable message: {}", e);
                return vec![ServerAction::Send(error_response(
                    &Value::Null,
                    error_code::PARSE_ERROR,
                    &format!("Parse error: {}", e),
                ))];
            }
        };

        let id = value.get("id").cloned();
        let method = match value.get("method").and_then(Value::as_str) {
            Some(method) => method.to_string(),
            None => {
                debug!("Ignoring client response {:?}", id);
                return Vec::new();
            }
        };

        if self.shutdown_requested && method != "exit" {
            return match id {
                Some(id) => vec![ServerAction::Send(error_response(
                    &id,
                    error_code::INVALID_REQUEST,
                    "Server is shutting down",
                ))],
                None => Vec::new(),
            };
        }

        match serde_json::from_value::<LspMessage>(value) {
            Ok(message) => self.dispatch(message),
            Err(e) => match id {
                Some(id) if KNOWN_METHODS.contains(&method.as_str()) => {
                    warn!("Invalid params for {}: {}", method, e);
                    vec![ServerAction::Send(error_response(
                        &id,
                        error_code::INVALID_PARAMS,
                        &format!("Invalid params for {}: {}", method, e),
                    ))]
                }
                Some(id) => {
                    debug!("Unhandled request {}", method);
                    vec![ServerAction::Send(error_response(
                        &id,
                        error_code::METHOD_NOT_FOUND,
                        &format!("Method not found: {}", method),
                    ))]
                }
                None => {
                    debug!("Ignoring notification {}", method);
                    Vec::new()
                }
            },
        }
    }

    fn dispatch(&mut self, message: LspMessage) -> Vec<ServerAction> {
        match message {
            LspMessage::Initialize { id, params } => {
                let result = self.initialize(&params);
                vec![ServerAction::Send(response(&id, json!(result)))]
            }
            LspMessage::Initialized => {
                info!("Client initialized");
                Vec::new()
            }
            LspMessage::Shutdown { id } => {
                info!("Shutdown requested");
                self.shutdown_requested = true;
                vec![ServerAction::Send(response(&id, Value::Null))]
            }
            LspMessage::Exit => vec![ServerAction::Exit],
            LspMessage::DidOpen { params } => {
                let uri = params.text_document.uri.clone();
                self.did_open(params);
                self.publish(&uri).map(ServerAction::Send).into_iter().collect()
            }
            LspMessage::DidChange { params } => {
                let uri = params.text_document.uri.clone();
                if self.did_change(params) {
                    vec![ServerAction::Schedule(uri)]
                } else {
                    Vec::new()
                }
            }
            LspMessage::DidSave { params } => {
                let uri = params.text_document.uri.clone();
                self.did_save(params);
                let mut actions = vec![ServerAction::Cancel(uri.clone())];
                actions.extend(self.publish(&uri).map(ServerAction::Send));
                actions
            }
            LspMessage::DidClose { params } => {
                let uri = params.text_document.uri.clone();
                self.did_close(&params);
                vec![
                    ServerAction::Cancel(uri.clone()),
                    ServerAction::Send(publish_notification(&uri, &[])),
                ]
            }
            LspMessage::Completion { id, params } => {
                let items = self.completion(&params);
                vec![ServerAction::Send(response(&id, json!(items)))]
            }
            LspMessage::CompletionResolve { id, params } => {
                let item = self.completion_provider.resolve(params);
                vec![ServerAction::Send(response(&id, json!(item)))]
            }
            LspMessage::Hover { id, params } => {
                let hover = self.hover(&params);
                vec![ServerAction::Send(response(&id, json!(hover)))]
            }
        }
    }

    /// Handle initialize request
    pub fn initialize(&mut self, params: &InitializeParams) -> InitializeResult {
        // Check for snippet support
        self.snippet_support = params
            .capabilities
            .text_document
            .as_ref()
            .and_then(|td| td.completion.as_ref())
            .and_then(|completion| completion.completion_item.as_ref())
            .and_then(|item| item.snippet_support)
            .unwrap_or(false);

        if let Some(options) = &params.initialization_options {
            if let Err(e) = self.config.merge_initialization_options(options) {
                warn!("Ignoring initialization options: {}", e);
            }
        }

        info!(
            root = params.root_uri.as_deref().unwrap_or("<none>"),
            snippets = self.snippet_support,
            "Initializing"
        );

        InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: TextDocumentSyncOptions {
                    open_close: true,
                    change: 1, // Full sync
                    save: Some(SaveOptions { include_text: true }),
                },
                completion_provider: Some(CompletionOptions {
                    trigger_characters: vec!["#".to_string(), ".".to_string()],
                    resolve_provider: true,
                }),
                hover_provider: Some(true),
            },
            server_info: Some(ServerInfo {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        }
    }

    /// Handle document open
    pub fn did_open(&mut self, params: DidOpenParams) {
        let doc = params.text_document;
        debug!(uri = %doc.uri, version = doc.version, "Opened document");
        self.documents.insert(
            doc.uri,
            DocumentState {
                content: doc.text,
                version: doc.version,
            },
        );
    }

    /// Handle document change. Returns false if nothing changed.
    pub fn did_change(&mut self, params: DidChangeParams) -> bool {
        let Some(change) = params.content_changes.into_iter().last() else {
            return false;
        };
        let uri = params.text_document.uri;
        debug!(uri = %uri, version = params.text_document.version, "Changed document");
        self.documents.insert(
            uri,
            DocumentState {
                content: change.text,
                version: params.text_document.version,
            },
        );
        true
    }

    /// Handle document save
    pub fn did_save(&mut self, params: DidSaveParams) {
        if let Some(text) = params.text {
            if let Some(doc) = self.documents.get_mut(&params.text_document.uri) {
                doc.content = text;
            }
        }
    }

    /// Handle document close
    pub fn did_close(&mut self, params: &DidCloseParams) {
        self.documents.remove(&params.text_document.uri);
    }

    /// Handle completion request
    pub fn completion(&self, params: &TextDocumentPositionParams) -> Vec<CompletionItem> {
        match self.document(&params.text_document.uri) {
            Ok(doc) => self.completion_provider.get_completions(
                &doc.content,
                params.position.line,
                params.position.character,
                self.snippet_support,
            ),
            Err(e) => {
                warn!("Completion: {}", e);
                Vec::new()
            }
        }
    }

    /// Handle hover request
    pub fn hover(&self, params: &TextDocumentPositionParams) -> Option<Hover> {
        match self.document(&params.text_document.uri) {
            Ok(doc) => self.hover_provider.get_hover(
                &doc.content,
                params.position.line,
                params.position.character,
            ),
            Err(e) => {
                warn!("Hover: {}", e);
                None
            }
        }
    }

    /// Diagnostics for an open document
    pub fn diagnostics(&self, uri: &str) -> Result<Vec<Diagnostic>> {
        let doc = self.document(uri)?;
        Ok(self.diagnostics_provider.validate_document(&doc.content))
    }

    /// `textDocument/publishDiagnostics` notification for an open document
    pub fn publish(&self, uri: &str) -> Option<Value> {
        match self.diagnostics(uri) {
            Ok(diagnostics) => {
                debug!(
                    uri,
                    version = ?self.documents.get(uri).map(|doc| doc.version),
                    count = diagnostics.len(),
                    "Publishing diagnostics"
                );
                Some(publish_notification(uri, &diagnostics))
            }
            Err(e) => {
                debug!("Skipping publish: {}", e);
                None
            }
        }
    }

    fn document(&self, uri: &str) -> Result<&DocumentState> {
        self.documents
            .get(uri)
            .ok_or_else(|| CnfError::DocumentNotFound(uri.to_string()))
    }
}

impl Default for CnfLanguageServer {
    fn default() -> Self {
        Self::new(ServerConfig::default())
    }
}

fn response(id: &RequestId, result: Value) -> Value {
    json!({ "jsonrpc": "2.0", "id": id, "result": result })
}

fn error_response(id: &Value, code: i64, message: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": { "code": code, "message": message }
    })
}

fn publish_notification(uri: &str, diagnostics: &[Diagnostic]) -> Value {
    let params = PublishDiagnosticsParams {
        uri: uri.to_string(),
        diagnostics: diagnostics.to_vec(),
    };
    json!({
        "jsonrpc": "2.0",
        "method": "textDocument/publishDiagnostics",
        "params": params
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const URI: &str = "file:///test/foo.cnf";

    fn open(server: &mut CnfLanguageServer, text: &str) -> Vec<ServerAction> {
        server.handle_message(
            &json!({
                "jsonrpc": "2.0",
                "method": "textDocument/didOpen",
                "params": {
                    "textDocument": {
                        "uri": URI,
                        "languageId": "asn1-cnf",
                        "version": 1,
                        "text": text
                    }
                }
            })
            .to_string(),
        )
    }

    fn request(server: &mut CnfLanguageServer, id: i64, method: &str, params: Value) -> Value {
        let actions = server.handle_message(
            &json!({ "jsonrpc": "2.0", "id": id, "method": method, "params": params }).to_string(),
        );
        match actions.as_slice() {
            [ServerAction::Send(value)] => value.clone(),
            other => panic!("unexpected actions {:?}", other),
        }
    }

    #[test]
    fn test_server_initialization() {
        let mut server = CnfLanguageServer::default();
        let reply = request(
            &mut server,
            1,
            "initialize",
            json!({
                "processId": 1234,
                "rootUri": "file:///test",
                "capabilities": {
                    "textDocument": { "completion": { "completionItem": { "snippetSupport": true } } }
                },
                "initializationOptions": { "debounceMs": 250 }
            }),
        );

        let capabilities = &reply["result"]["capabilities"];
        assert_eq!(capabilities["hoverProvider"], json!(true));
        assert_eq!(capabilities["textDocumentSync"]["change"], json!(1));
        assert_eq!(capabilities["completionProvider"]["resolveProvider"], json!(true));
        assert_eq!(
            capabilities["completionProvider"]["triggerCharacters"],
            json!(["#", "."])
        );
        assert!(server.snippet_support);
        assert_eq!(server.config().debounce_ms, 250);
    }

    #[test]
    fn test_document_open_publishes() {
        let mut server = CnfLanguageServer::default();
        let actions = open(&mut server, "#.REGISTER\nlower BER 1\n\n#.END");

        let [ServerAction::Send(notification)] = actions.as_slice() else {
            panic!("expected a single publish, got {:?}", actions);
        };
        assert_eq!(notification["method"], json!("textDocument/publishDiagnostics"));
        assert_eq!(notification["params"]["uri"], json!(URI));
        let diagnostics = notification["params"]["diagnostics"].as_array().unwrap();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0]["severity"], json!(2));
        assert_eq!(diagnostics[0]["source"], json!("cnf-lsp"));
    }

    #[test]
    fn test_document_change_schedules() {
        let mut server = CnfLanguageServer::default();
        open(&mut server, "");

        let actions = server.handle_message(
            &json!({
                "jsonrpc": "2.0",
                "method": "textDocument/didChange",
                "params": {
                    "textDocument": { "uri": URI, "version": 2 },
                    "contentChanges": [{ "text": "#.TYPE_RENAME\nA b\n\n" }]
                }
            })
            .to_string(),
        );
        assert_eq!(actions, vec![ServerAction::Schedule(URI.to_string())]);
        assert_eq!(server.diagnostics(URI).unwrap().len(), 1);
    }

    #[test]
    fn test_document_close_clears() {
        let mut server = CnfLanguageServer::default();
        open(&mut server, "#.REGISTER\nlower BER 1\n\n");

        let actions = server.handle_message(
            &json!({
                "jsonrpc": "2.0",
                "method": "textDocument/didClose",
                "params": { "textDocument": { "uri": URI } }
            })
            .to_string(),
        );
        assert_eq!(actions[0], ServerAction::Cancel(URI.to_string()));
        assert_eq!(actions[1], ServerAction::Send(publish_notification(URI, &[])));
        assert!(!server.is_open(URI));
        assert!(matches!(
            server.diagnostics(URI),
            Err(CnfError::DocumentNotFound(_))
        ));
    }

    #[test]
    fn test_completion_and_resolve() {
        let mut server = CnfLanguageServer::default();
        open(&mut server, "#.RE");

        let reply = request(
            &mut server,
            2,
            "textDocument/completion",
            json!({ "textDocument": { "uri": URI }, "position": { "line": 0, "character": 4 } }),
        );
        let items = reply["result"].as_array().unwrap();
        let register = items.iter().find(|i| i["label"] == "#.REGISTER").unwrap();
        assert_eq!(register["textEdit"]["range"]["start"]["character"], json!(0));

        let reply = request(&mut server, 3, "completionItem/resolve", register.clone());
        assert_eq!(reply["id"], json!(3));
        assert_eq!(reply["result"]["documentation"]["kind"], json!("markdown"));
    }

    #[test]
    fn test_completion_for_unknown_document() {
        let mut server = CnfLanguageServer::default();
        let reply = request(
            &mut server,
            2,
            "textDocument/completion",
            json!({ "textDocument": { "uri": "file:///nope" }, "position": { "line": 0, "character": 0 } }),
        );
        assert_eq!(reply["result"], json!([]));
    }

    #[test]
    fn test_hover() {
        let mut server = CnfLanguageServer::default();
        open(&mut server, "#.REGISTER\n");

        let reply = request(
            &mut server,
            4,
            "textDocument/hover",
            json!({ "textDocument": { "uri": URI }, "position": { "line": 0, "character": 3 } }),
        );
        assert!(reply["result"]["contents"]["value"]
            .as_str()
            .unwrap()
            .starts_with("### #.REGISTER"));

        let reply = request(
            &mut server,
            5,
            "textDocument/hover",
            json!({ "textDocument": { "uri": URI }, "position": { "line": 1, "character": 0 } }),
        );
        assert_eq!(reply["result"], Value::Null);
    }

    #[test]
    fn test_unknown_request_and_notification() {
        let mut server = CnfLanguageServer::default();
        let reply = request(&mut server, 7, "textDocument/definition", json!({}));
        assert_eq!(reply["error"]["code"], json!(error_code::METHOD_NOT_FOUND));

        let actions = server.handle_message(r#"{"jsonrpc":"2.0","method":"$/setTrace","params":{}}"#);
        assert!(actions.is_empty());
    }

    #[test]
    fn test_invalid_params() {
        let mut server = CnfLanguageServer::default();
        let reply = request(&mut server, 8, "textDocument/hover", json!({ "bogus": true }));
        assert_eq!(reply["error"]["code"], json!(error_code::INVALID_PARAMS));
    }

    #[test]
    fn test_parse_error() {
        let mut server = CnfLanguageServer::default();
        let actions = server.handle_message("{not json");
        let [ServerAction::Send(reply)] = actions.as_slice() else {
            panic!("expected an error reply");
        };
        assert_eq!(reply["error"]["code"], json!(error_code::PARSE_ERROR));
    }

    #[test]
    fn test_shutdown_then_exit() {
        let mut server = CnfLanguageServer::default();
        let reply = request(&mut server, 9, "shutdown", Value::Null);
        assert_eq!(reply["result"], Value::Null);

        let reply = request(&mut server, 10, "textDocument/hover", json!({}));
        assert_eq!(reply["error"]["code"], json!(error_code::INVALID_REQUEST));

        let actions = server.handle_message(r#"{"jsonrpc":"2.0","method":"exit"}"#);
        assert_eq!(actions, vec![ServerAction::Exit]);
    }

    #[test]
    fn test_string_request_ids() {
        let mut server = CnfLanguageServer::default();
        let actions = server.handle_message(r#"{"jsonrpc":"2.0","id":"abc","method":"shutdown"}"#);
        let [ServerAction::Send(reply)] = actions.as_slice() else {
            panic!("expected a reply");
        };
        assert_eq!(reply["id"], json!("abc"));
    }
}
