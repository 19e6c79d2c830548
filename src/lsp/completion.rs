//! Completion Provider for conformance files

use super::directives::{option_keyword_detail, Directive, EncodingType, OPTION_KEYWORDS};
use super::text::{split_lines, utf16_len, utf16_to_char_index, DIRECTIVE_SENTINEL};
use super::types::{
    completion_kind, insert_text_format, CompletionItem, MarkupContent, Position, Range, TextEdit,
};

/// One completable word with its documentation
#[derive(Debug, Clone)]
struct CatalogEntry {
    label: String,
    kind: u8,
    detail: String,
    documentation: String,
    snippet: Option<&'static str>,
}

/// Completion provider for conformance files
pub struct CompletionProvider {
    /// Directives, then option keywords, then encodings
    entries: Vec<CatalogEntry>,
}

impl CompletionProvider {
    /// Create a new completion provider
    pub fn new() -> Self {
        let directives = Directive::ALL.iter().map(|directive| CatalogEntry {
            label: directive.label().to_string(),
            kind: completion_kind::KEYWORD,
            detail: directive.detail().to_string(),
            documentation: directive.documentation().to_string(),
            snippet: directive.snippet(),
        });

        let options = OPTION_KEYWORDS.iter().map(|keyword| {
            let detail = option_keyword_detail(keyword).unwrap_or_default();
            CatalogEntry {
                label: keyword.to_string(),
                kind: completion_kind::CONSTANT,
                detail: detail.to_string(),
                documentation: format!("`{}` option keyword.\n\n{}", keyword, detail),
                snippet: None,
            }
        });

        let encodings = EncodingType::ALL.iter().map(|encoding| CatalogEntry {
            label: encoding.symbol().to_string(),
            kind: completion_kind::CONSTANT,
            detail: encoding.detail(),
            documentation: encoding.documentation(),
            snippet: None,
        });

        Self {
            entries: directives.chain(options).chain(encodings).collect(),
        }
    }

    /// Get completions at the given position.
    ///
    /// Every item replaces the text from the last `#.` before the cursor (or
    /// the start of the line) up to the cursor.
    pub fn get_completions(
        &self,
        content: &str,
        line: u32,
        character: u32,
        snippet_support: bool,
    ) -> Vec<CompletionItem> {
        let lines = split_lines(content);
        let current_line = lines.get(line as usize).copied().unwrap_or("");
        let range = replace_range(current_line, line, character);

        self.entries
            .iter()
            .map(|entry| {
                let (new_text, format) = match entry.snippet {
                    Some(snippet) if snippet_support => {
                        (snippet.to_string(), insert_text_format::SNIPPET)
                    }
                    _ => (entry.label.clone(), insert_text_format::PLAIN_TEXT),
                };
                CompletionItem {
                    label: entry.label.clone(),
                    kind: Some(entry.kind),
                    detail: None,
                    documentation: None,
                    insert_text: None,
                    insert_text_format: Some(format),
                    text_edit: Some(TextEdit { range, new_text }),
                }
            })
            .collect()
    }

    /// Fill in detail and documentation for a selected item.
    ///
    /// Items with an unknown label come back unchanged.
    pub fn resolve(&self, mut item: CompletionItem) -> CompletionItem {
        if let Some(entry) = self.entries.iter().find(|entry| entry.label == item.label) {
            item.kind = Some(entry.kind);
            item.detail = Some(entry.detail.clone());
            item.documentation = Some(MarkupContent::markdown(entry.documentation.clone()));
        }
        item
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for CompletionProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn replace_range(line_text: &str, line: u32, character: u32) -> Range {
    let character = character.min(utf16_len(line_text));
    let cursor = utf16_to_char_index(line_text, character);
    let prefix_end = line_text
        .char_indices()
        .nth(cursor)
        .map(|(idx, _)| idx)
        .unwrap_or(line_text.len());
    let prefix = &line_text[..prefix_end];

    let start = prefix
        .rfind(DIRECTIVE_SENTINEL)
        .map(|idx| utf16_len(&prefix[..idx]))
        .unwrap_or(0);

    Range {
        start: Position::new(line, start),
        end: Position::new(line, character),
    }
}
