/*!
 * Property-based tests for the lexer and translator
 */

use proptest::prelude::*;

use db2rst::conversion::{AliasTable, HeadingKind, Translator};
use db2rst::diagnostics::{Diagnostics, SourceLocation};
use db2rst::markup::{LogicalLine, QuoteScanner, TagTokenizer};

fn logical(text: &str) -> LogicalLine {
    let tokenized = TagTokenizer::default()
        .tokenize(text, &QuoteScanner::scan(text))
        .unwrap();
    LogicalLine::new(tokenized.line, tokenized.tags)
}

fn translate_all(lines: &[String]) -> (Translator, Vec<String>) {
    let mut translator = Translator::default();
    let aliases = AliasTable::new();
    let mut diagnostics = Diagnostics::new();
    let mut output = Vec::new();
    for (index, line) in lines.iter().enumerate() {
        let translation = translator
            .translate(&logical(line), &aliases, &SourceLocation::new("prop.xml", index + 1), &mut diagnostics)
            .unwrap();
        output.extend(translation.lines());
    }
    (translator, output)
}

fn body_piece() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z]{1,8}",
        Just("<para>".to_string()),
        Just("<emphasis>".to_string()),
        Just("</emphasis>".to_string()),
    ]
}

proptest! {
    #[test]
    fn prop_quoted_spans_shouldBeBoundedByMatchingQuotes(line in "[a-z \"'<>=]{0,60}") {
        let scan = QuoteScanner::scan(&line);
        let bytes = line.as_bytes();

        for span in &scan.spans {
            let quote = bytes[span.start];
            prop_assert!(quote == b'"' || quote == b'\'');
            prop_assert_eq!(bytes[span.end], quote);
            prop_assert!(span.end > span.start);
            prop_assert!(!bytes[span.start + 1..span.end].contains(&quote));
        }
        prop_assert_eq!(QuoteScanner::scan(&line), scan);
    }

    #[test]
    fn prop_ignored_tags_shouldNotSurviveRetokenizing(pieces in prop::collection::vec(body_piece(), 0..12)) {
        let line = pieces.join(" ");
        let tokenizer = TagTokenizer::default();

        let first = tokenizer.tokenize(&line, &QuoteScanner::scan(&line)).unwrap();
        let again = tokenizer.tokenize(&first.line, &QuoteScanner::scan(&first.line)).unwrap();

        prop_assert!(first.tags.iter().all(|tag| tag.name() != "para"));
        prop_assert!(again.tags.iter().all(|tag| tag.name() != "para"));
        prop_assert!(!first.line.contains("<para>"));
    }

    #[test]
    fn prop_balanced_notes_shouldRestoreIndentation(depth in 0usize..6, text in "[a-z]{1,10}") {
        let mut lines = Vec::new();
        for _ in 0..depth {
            lines.push("<note>".to_string());
            lines.push(text.clone());
        }
        for _ in 0..depth {
            lines.push("</note>".to_string());
        }

        let (translator, output) = translate_all(&lines);

        prop_assert_eq!(translator.indentation().depth(), 0);
        for line in output {
            let leading = line.len() - line.trim_start().len();
            prop_assert_eq!(leading % 2, 0);
        }
    }

    #[test]
    fn prop_heading_shouldAnchorThenDecorateTitle(
        kind in prop::sample::select(vec!["chapter", "sect1", "sect2", "sect3"]),
        id in "[a-z][a-z0-9_]{0,10}",
        title in "[A-Z][a-z]{0,12}",
    ) {
        let lines = vec![format!("<{} id=\"{}\">", kind, id), format!("<title>{}</title>", title)];
        let heading = HeadingKind::from_tag(kind).unwrap();

        let (translator, output) = translate_all(&lines);

        prop_assert_eq!(&output[1], &format!(".. _{}:", id));
        let title_at = output.iter().position(|line| line == &title).unwrap();
        prop_assert_eq!(output[title_at + 1].as_str(), heading.decoration());
        if heading.has_overbar() {
            prop_assert_eq!(output[title_at - 1].as_str(), heading.decoration());
        }
        prop_assert!(!translator.section().awaiting_title());
    }
}
