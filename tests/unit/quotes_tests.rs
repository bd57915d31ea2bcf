/*!
 * Tests for quoted span detection
 */

use db2rst::markup::{QuoteScanner, QuotedSpan};

/// Test that a line without quotes has no spans
#[test]
fn test_scan_withNoQuotes_shouldReturnEmptyScan() {
    let scan = QuoteScanner::scan("<para>plain text</para>");

    assert!(scan.spans.is_empty());
    assert!(!scan.is_incomplete());
}

/// Test that attribute values are reported as inclusive spans
#[test]
fn test_scan_withAttributeValues_shouldReportInclusiveSpans() {
    let line = r#"<ulink url="a>b" role='x'>"#;
    let scan = QuoteScanner::scan(line);

    assert_eq!(
        scan.spans,
        vec![QuotedSpan { start: 11, end: 15 }, QuotedSpan { start: 22, end: 24 }]
    );
    assert_eq!(scan.spans[0].as_str(line), "\"a>b\"");
    assert!(scan.is_quoted(13));
    assert!(!scan.is_quoted(17));
}

/// Test that an apostrophe in prose opens a quote that never closes
#[test]
fn test_scan_withApostrophe_shouldLeaveLineIncomplete() {
    let scan = QuoteScanner::scan("the model's output");

    assert_eq!(scan.open_at, Some(9));
    assert!(scan.is_incomplete());
}

/// Test that scanning the same line twice yields the same result
#[test]
fn test_scan_withSameLine_shouldBeIdempotent() {
    let line = r#"<a href="x" title='y "z"'> text "open"#;

    assert_eq!(QuoteScanner::scan(line), QuoteScanner::scan(line));
}
