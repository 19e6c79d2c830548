//! Validation of a single directive block against its rule

use super::blocks::BlockRange;
use super::rules::{DirectiveRule, Scope};
use super::text::{normalize_whitespace, strip_comment, utf16_len};
use super::types::{Diagnostic, Range, Severity};

/// Validate every body line of `block`.
///
/// `lines` is the whole document. Diagnostics come back in line order, and
/// within a line in the order the shape lists its checks.
pub fn validate_block(lines: &[&str], block: BlockRange, rule: &DirectiveRule) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    if rule.shapes.is_empty() {
        return diagnostics;
    }

    for index in block.body(lines.len()) {
        let stripped = rule
            .comment_markers
            .iter()
            .fold(lines[index], |line, marker| strip_comment(line, marker));
        let line = normalize_whitespace(stripped);
        if line.trim().is_empty() {
            continue;
        }

        validate_line(&line, index as u32, rule, &mut diagnostics);
    }

    diagnostics
}

fn validate_line(line: &str, line_number: u32, rule: &DirectiveRule, out: &mut Vec<Diagnostic>) {
    let whole_line = Range::on_line(line_number, 0, utf16_len(line));
    let tokens: Vec<&str> = line.split(' ').collect();

    let Some(shape) = rule.shape_for(tokens.len()) else {
        out.push(Diagnostic::new(
            Severity::Error,
            whole_line,
            rule.invalid_entry_message,
        ));
        return;
    };

    for check in &shape.checks {
        let Some(token) = tokens.get(check.token_index) else {
            continue;
        };
        if !(check.fires)(token) {
            continue;
        }

        let range = match check.scope {
            Scope::Line => whole_line,
            Scope::Token => token_range(line, token, line_number),
        };
        out.push(Diagnostic::new(
            check.severity,
            range,
            check.render_message(token),
        ));
    }
}

/// Range of the first occurrence of `token` in `line`.
fn token_range(line: &str, token: &str, line_number: u32) -> Range {
    let byte_start = line.find(token).unwrap_or(0);
    let start = utf16_len(&line[..byte_start]);
    Range::on_line(line_number, start, start + utf16_len(token))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lsp::blocks::find_blocks;
    use crate::lsp::rules::default_rules;
    use crate::lsp::text::split_lines;

    fn register() -> DirectiveRule {
        default_rules().remove(0)
    }

    fn type_rename() -> DirectiveRule {
        default_rules().remove(1)
    }

    fn field_rename() -> DirectiveRule {
        default_rules().remove(2)
    }

    fn run(text: &str, rule: &DirectiveRule) -> Vec<Diagnostic> {
        let lines = split_lines(text);
        find_blocks(rule.label(), "#.", &lines)
            .into_iter()
            .flat_map(|block| validate_block(&lines, block, rule))
            .collect()
    }

    #[test]
    fn test_blank_and_comment_lines_skipped_for_every_rule() {
        for rule in default_rules() {
            let text = format!(
                "{}\n   \t \n# only a comment\n    # trailing comment only\n\n#.END",
                rule.label()
            );
            assert!(run(&text, &rule).is_empty(), "{}", rule.label());
        }
    }

    #[test]
    fn test_valid_register_entry() {
        let text = "#.REGISTER\nSomeType BER aaa bbb\n\n#.END";
        assert!(run(text, &register()).is_empty());
    }

    #[test]
    fn test_register_name_and_encoding_errors() {
        let text = "#.REGISTER\nsomeType INVALID aaa bbb\n\n#.END";
        let diagnostics = run(text, &register());

        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics[0].severity, Severity::Warning);
        assert_eq!(diagnostics[0].range, Range::on_line(1, 0, 8));
        assert_eq!(
            diagnostics[0].message,
            "Type name should always start with an uppercase letter"
        );
        assert_eq!(diagnostics[1].severity, Severity::Error);
        assert_eq!(diagnostics[1].range, Range::on_line(1, 9, 16));
        assert_eq!(
            diagnostics[1].message,
            "Invalid encoding type! Please use one of N, NUM, S, STR, B, BER, P, PER, O, OER."
        );
    }

    #[test]
    fn test_text_encoding_with_argument() {
        let text = "#.REGISTER\nSomeParameter NUM blablabla\n\n#.END";
        let diagnostics = run(text, &register());

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].severity, Severity::Error);
        assert_eq!(diagnostics[0].range, Range::on_line(1, 0, 27));
        assert_eq!(
            diagnostics[0].message,
            "Invalid number of arguments for encoding type NUM."
        );
    }

    #[test]
    fn test_binary_encoding_with_three_tokens_is_fine() {
        let text = "#.REGISTER\nMyType PER 1.2.3.4\n\n#.END";
        assert!(run(text, &register()).is_empty());
    }

    #[test]
    fn test_register_wrong_token_count() {
        let text = "#.REGISTER\nA B C D E\nLonely\n\n#.END";
        let diagnostics = run(text, &register());

        assert_eq!(diagnostics.len(), 2);
        for (diagnostic, line) in diagnostics.iter().zip([1u32, 2]) {
            assert_eq!(diagnostic.severity, Severity::Error);
            assert_eq!(diagnostic.message, "Invalid register entry");
            assert_eq!(diagnostic.range.start, crate::lsp::types::Position::new(line, 0));
        }
        assert_eq!(diagnostics[0].range.end.character, 9);
    }

    #[test]
    fn test_comments_and_blank_lines_are_skipped() {
        let text = "#.REGISTER\n# just a comment\n-- dashes too\n   \t \nFoo BER 1.2 # trailing\n\n#.END";
        assert!(run(text, &register()).is_empty());
    }

    #[test]
    fn test_dash_comment_only_stripped_for_register() {
        let text = "#.TYPE_RENAME\nFoo-Bar Baz -- note\n\n#.END";
        let diagnostics = run(text, &type_rename());
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].message,
            "Invalid type rename entry. Expected 2 tokens."
        );
    }

    #[test]
    fn test_whitespace_is_normalized_before_ranging() {
        let text = "#.REGISTER\n  lower\t\tBER   1.2\n\n#.END";
        let diagnostics = run(text, &register());
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].range, Range::on_line(1, 0, 5));
    }

    #[test]
    fn test_type_rename() {
        let text = "#.TYPE_RENAME\nSomeType SomeOtherType\nSomeType someOtherType\nOnlyOne\n\n#.END";
        let diagnostics = run(text, &type_rename());

        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics[0].severity, Severity::Warning);
        assert_eq!(diagnostics[0].range, Range::on_line(2, 9, 22));
        assert_eq!(
            diagnostics[0].message,
            "Type name should always start with an uppercase letter"
        );
        assert_eq!(diagnostics[1].severity, Severity::Error);
        assert_eq!(diagnostics[1].range, Range::on_line(3, 0, 7));
        assert_eq!(
            diagnostics[1].message,
            "Invalid type rename entry. Expected 2 tokens."
        );
    }

    #[test]
    fn test_field_rename() {
        let text = "#.FIELD_RENAME\nSomeField someOtherField\nSomeField SomeOtherField\na b c\n\n#.END";
        let diagnostics = run(text, &field_rename());

        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics[0].severity, Severity::Warning);
        assert_eq!(diagnostics[0].range, Range::on_line(2, 10, 24));
        assert_eq!(
            diagnostics[0].message,
            "Field name should always start with a lowercase letter"
        );
        assert_eq!(
            diagnostics[1].message,
            "Invalid field rename entry. Expected 2 tokens."
        );
    }

    #[test]
    fn test_line_before_terminator_is_not_validated() {
        let text = "#.REGISTER\nbad BER 1\n#.END";
        assert!(run(text, &register()).is_empty());
    }

    #[test]
    fn test_first_occurrence_ranging() {
        let text = "#.TYPE_RENAME\nxy x\n\n#.END";
        let diagnostics = run(text, &type_rename());
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].range, Range::on_line(1, 0, 1));
    }

    #[test]
    fn test_utf16_columns() {
        let text = "#.TYPE_RENAME\nÄ😀 ßlower\n\n#.END";
        let diagnostics = run(text, &type_rename());
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].range, Range::on_line(1, 4, 10));
    }

    #[test]
    fn test_rule_without_shapes_reports_nothing() {
        let mut rule = register();
        rule.shapes.clear();
        assert!(run("#.REGISTER\nA B C D E\n\n#.END", &rule).is_empty());
    }

    #[test]
    fn test_block_at_end_of_file_validates_last_line() {
        let text = "#.REGISTER\nlower BER 1";
        let diagnostics = run(text, &register());
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].range.start.line, 1);
    }
}
