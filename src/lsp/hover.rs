//! Hover Provider for conformance files

use super::directives::{option_keyword_detail, Directive, EncodingType};
use super::text::{split_lines, utf16_len, utf16_to_char_index, word_at};
use super::types::{Hover, MarkupContent, Range};

/// Hover provider for conformance files
pub struct HoverProvider {}

impl HoverProvider {
    /// Create a new hover provider
    pub fn new() -> Self {
        Self {}
    }

    /// Get hover information at the given position
    pub fn get_hover(&self, content: &str, line: u32, character: u32) -> Option<Hover> {
        let lines = split_lines(content);
        let current_line = lines.get(line as usize).copied()?;
        let index = utf16_to_char_index(current_line, character);
        let (offset, word) = word_at(current_line, index)?;
        let (detail, documentation) = describe(word)?;
        let start = utf16_len(&current_line[..offset]);

        Some(Hover {
            contents: MarkupContent::markdown(format!(
                "### {}\n\n{}\n\n{}",
                word, detail, documentation
            )),
            range: Some(Range::on_line(line, start, start + utf16_len(word))),
        })
    }
}

fn describe(word: &str) -> Option<(String, String)> {
    if let Some(directive) = Directive::from_label(word) {
        return Some((
            directive.detail().to_string(),
            directive.documentation().to_string(),
        ));
    }
    if let Some(encoding) = EncodingType::from_symbol(word) {
        return Some((encoding.detail(), encoding.documentation()));
    }
    option_keyword_detail(word)
        .map(|detail| (detail.to_string(), format!("`{}` option keyword.", word)))
}

impl Default for HoverProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hover_on_register() {
        let provider = HoverProvider::new();
        let content = "#.REGISTER\nFoo BER 1.2.3";

        let hover = provider.get_hover(content, 0, 4).unwrap();
        assert!(hover.contents.value.starts_with("### #.REGISTER\n\n"));
        assert!(hover
            .contents
            .value
            .contains(Directive::Register.documentation()));
        assert_eq!(hover.range, Some(Range::on_line(0, 0, 10)));
    }

    #[test]
    fn test_hover_on_encoding() {
        let provider = HoverProvider::new();
        let hover = provider.get_hover("#.REGISTER\nFoo BER 1.2.3", 1, 5).unwrap();

        assert!(hover.contents.value.contains("### BER"));
        assert!(hover.contents.value.contains("abbreviated as B"));
        assert_eq!(hover.range, Some(Range::on_line(1, 4, 7)));
    }

    #[test]
    fn test_hover_on_option_keyword() {
        let provider = HoverProvider::new();
        let hover = provider.get_hover("#.EXPORTS\nFoo WITH_VALS", 1, 6).unwrap();
        assert!(hover.contents.value.contains("### WITH_VALS"));
    }

    #[test]
    fn test_hover_on_whitespace_or_unknown() {
        let provider = HoverProvider::new();
        assert!(provider.get_hover("Foo BER 1.2.3", 0, 3).is_none());
        assert!(provider.get_hover("Foo BER 1.2.3", 0, 0).is_none());
        assert!(provider.get_hover("Foo", 3, 0).is_none());
    }

    #[test]
    fn test_hover_on_repeated_word_ranges_the_hovered_one() {
        let provider = HoverProvider::new();
        let hover = provider.get_hover("BER BER", 0, 5).unwrap();
        assert_eq!(hover.range, Some(Range::on_line(0, 4, 7)));
    }

    #[test]
    fn test_hover_columns_are_utf16() {
        let provider = HoverProvider::new();
        let hover = provider.get_hover("😀 #.END", 0, 4).unwrap();
        assert_eq!(hover.range, Some(Range::on_line(0, 3, 8)));
    }
}
