/*!
 * Tests for logical line translation
 */

use db2rst::conversion::{AliasTable, HeadingKind, Indentation, Translation, Translator, LINE_BREAK};
use db2rst::diagnostics::{Diagnostics, SourceLocation};
use db2rst::errors::ConversionError;
use db2rst::markup::{LogicalLine, QuoteScanner, TagTokenizer};

const CHAPTER_RULE: &str = "################################################";
const SECT1_RULE: &str = "------------------------------------------------";
const SECT2_RULE: &str = "^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^";

fn logical(text: &str) -> LogicalLine {
    let tokenized = TagTokenizer::default()
        .tokenize(text, &QuoteScanner::scan(text))
        .unwrap();
    LogicalLine::new(tokenized.line, tokenized.tags)
}

struct Fixture {
    translator: Translator,
    aliases: AliasTable,
    diagnostics: Diagnostics,
}

impl Fixture {
    fn new() -> Self {
        Self {
            translator: Translator::default(),
            aliases: AliasTable::new(),
            diagnostics: Diagnostics::new(),
        }
    }

    fn translate(&mut self, text: &str) -> Result<Translation, ConversionError> {
        self.translator.translate(
            &logical(text),
            &self.aliases,
            &SourceLocation::new("test.xml", 1),
            &mut self.diagnostics,
        )
    }

    fn lines(&mut self, text: &str) -> Vec<String> {
        self.translate(text).unwrap().lines()
    }
}

/// Test that a chapter heading produces an anchor between blank lines
#[test]
fn test_translate_withChapterHeading_shouldEmitAnchor() {
    let mut fixture = Fixture::new();

    assert_eq!(fixture.lines(r#"<chapter id="intro">"#), vec!["", ".. _intro:", ""]);
    assert_eq!(fixture.translator.section().current(), Some(HeadingKind::Chapter));
    assert!(fixture.translator.section().awaiting_title());
}

/// Test that an overbar heading title is decorated on both sides
#[test]
fn test_translate_withChapterTitle_shouldDecorateBothSides() {
    let mut fixture = Fixture::new();
    fixture.lines(r#"<chapter id="intro">"#);

    let lines = fixture.lines("<title>Introduction</title>");

    assert_eq!(lines, vec![CHAPTER_RULE, "Introduction", CHAPTER_RULE]);
    assert!(!fixture.translator.section().awaiting_title());
}

/// Test that a sect2 title is only underlined
#[test]
fn test_translate_withSect2Title_shouldUnderlineOnly() {
    let mut fixture = Fixture::new();
    fixture.lines(r#"<sect2 id="setup">"#);

    assert_eq!(fixture.lines("<title>Setup</title>"), vec!["Setup", SECT2_RULE]);
}

/// Test that a title split across lines keeps the section open in between
#[test]
fn test_translate_withSplitTitle_shouldDecorateEachPart() {
    let mut fixture = Fixture::new();
    fixture.lines(r#"<chapter id="intro">"#);

    assert_eq!(fixture.lines("<title>Getting"), vec![CHAPTER_RULE, "Getting"]);
    assert!(fixture.translator.section().awaiting_title());
    assert_eq!(fixture.lines("Started</title>"), vec!["Started", CHAPTER_RULE]);
}

/// Test that a heading without id is fatal
#[test]
fn test_translate_withHeadingWithoutId_shouldFail() {
    let mut fixture = Fixture::new();

    let error = fixture.translate("<chapter><title>Introduction</title>").unwrap_err();

    assert!(matches!(error, ConversionError::MissingSectionId { .. }));
    assert_eq!(error.to_string(), "line 1 of test.xml: chapter tag with missing id");
}

/// Test that a heading with its title on the same line is anchored then decorated
#[test]
fn test_translate_withHeadingAndTitleOnOneLine_shouldDecorateTitle() {
    let mut fixture = Fixture::new();

    let lines = fixture.lines(r#"<sect1 id="a"><title>Overview</title>"#);

    assert_eq!(lines, vec!["", ".. _a:", "", SECT1_RULE, "Overview", SECT1_RULE]);
    assert!(fixture.diagnostics.is_empty());
    assert_eq!(fixture.translator.section().current(), None);
}

/// Test that a later title is not taken for the finished heading
#[test]
fn test_translate_withTitleAfterOneLineHeading_shouldNotDecorateIt() {
    let mut fixture = Fixture::new();

    let lines = fixture.lines(r#"<chapter id="intro"><title>Introduction</title>"#);
    assert_eq!(lines, vec!["", ".. _intro:", "", CHAPTER_RULE, "Introduction", CHAPTER_RULE]);

    let error = fixture.translate("<figure><title>Fig</title></figure>").unwrap_err();
    assert!(matches!(error, ConversionError::TitleOutsideSection { .. }));
}

/// Test that other tags on a heading line are warned about and stripped
#[test]
fn test_translate_withHeadingAndOtherTags_shouldWarnAndStripThem() {
    let mut fixture = Fixture::new();

    let lines = fixture.lines(r#"<sect2 id="b"><emphasis>Setup</emphasis> notes"#);

    assert_eq!(lines, vec!["", ".. _b:", "", "*Setup* notes"]);
    assert!(fixture.diagnostics.contains("<sect2> should be on its own line"));
    assert_eq!(fixture.translator.section().current(), Some(HeadingKind::Sect2));
}

/// Test that a title without a heading is fatal
#[test]
fn test_translate_withTitleOutsideSection_shouldFail() {
    let mut fixture = Fixture::new();

    let error = fixture.translate("<title>Lost</title>").unwrap_err();

    assert!(matches!(error, ConversionError::TitleOutsideSection { .. }));
}

/// Test that a note indents the following lines until it closes
#[test]
fn test_translate_withNoteBlock_shouldIndentContent() {
    let mut fixture = Fixture::new();

    assert_eq!(fixture.lines("<note>"), vec![".. note::"]);
    assert_eq!(fixture.translator.indentation().depth(), 1);
    assert_eq!(fixture.lines("Remember this."), vec!["  Remember this."]);
    fixture.lines("</note>");
    assert_eq!(fixture.translator.indentation(), Indentation::default());
}

/// Test that a note opened and closed on one line puts its body on an indented line
#[test]
fn test_translate_withOneLineNote_shouldIndentBody() {
    let mut fixture = Fixture::new();

    let lines = fixture.lines("<note>Check inputs first.</note>");

    assert_eq!(lines, vec![".. note::", "  Check inputs first."]);
    assert_eq!(fixture.translator.indentation(), Indentation::default());
}

/// Test that a one-line warning is rendered like a note
#[test]
fn test_translate_withOneLineWarning_shouldIndentBody() {
    let mut fixture = Fixture::new();

    let lines = fixture.lines("<warning>Back up first.</warning>");

    assert_eq!(lines, vec![".. warning::", "  Back up first."]);
    assert_eq!(fixture.translator.indentation().depth(), 0);
}

/// Test that admonitions other than note become directives
#[test]
fn test_translate_withWarningOpen_shouldStartDirective() {
    let mut fixture = Fixture::new();

    let lines = fixture.lines("<warning>Check the paths");

    assert_eq!(lines, vec![".. warning::", "  Check the paths"]);
    assert_eq!(fixture.translator.indentation().width(), 2);
}

/// Test that closing an admonition that never opened is fatal
#[test]
fn test_translate_withUnmatchedClose_shouldFail() {
    let mut fixture = Fixture::new();

    let error = fixture.translate("</note>").unwrap_err();

    assert!(matches!(error, ConversionError::UnbalancedIndentation { .. }));
}

/// Test that ulink becomes an external hyperlink
#[test]
fn test_translate_withUlink_shouldEmitHyperlink() {
    let mut fixture = Fixture::new();

    let lines = fixture.lines(r#"See <ulink url="http://www.cesm.ucar.edu">the site</ulink> now"#);

    assert_eq!(lines, vec!["See `the site <http://www.cesm.ucar.edu>`_ now"]);
}

/// Test that link and xref become references
#[test]
fn test_translate_withLinkAndXref_shouldEmitReferences() {
    let mut fixture = Fixture::new();

    assert_eq!(
        fixture.lines(r#"<link linkend="setup">Setup</link>"#),
        vec![":ref:`Setup <setup>`"]
    );
    assert_eq!(fixture.lines(r#"see <xref linkend="setup"/>"#), vec!["see :ref:`setup`"]);
}

/// Test that aliases are applied after the literal table
#[test]
fn test_translate_withAlias_shouldReplaceReference() {
    let mut fixture = Fixture::new();
    fixture.aliases.insert("model", "**CESM**");

    assert_eq!(fixture.lines("The &model; model"), vec!["The **CESM** model"]);
}

/// Test that escaped tags stay literal
#[test]
fn test_translate_withEscapedTag_shouldStayLiteral() {
    let mut fixture = Fixture::new();

    assert_eq!(fixture.lines("&lt;x&gt;"), vec!["<x>"]);
}

/// Test that a paragraph close inside the line breaks it
#[test]
fn test_translate_withParagraphCloseMidLine_shouldSplitLine() {
    let mut fixture = Fixture::new();

    assert_eq!(fixture.lines("<para>Text.</para>"), vec!["Text."]);
    assert_eq!(fixture.lines("<para>First.</para> Second."), vec!["First.", "Second."]);
}

/// Test that end of document reports unfinished state
#[test]
fn test_finish_withOpenHeadingAndNote_shouldWarnTwice() {
    let mut fixture = Fixture::new();
    fixture.lines(r#"<sect3 id="deep">"#);
    fixture.lines("<note>");

    fixture
        .translator
        .finish(&SourceLocation::new("test.xml", 9), &mut fixture.diagnostics);

    assert!(fixture.diagnostics.contains("<sect3> heading never received a title"));
    assert!(fixture.diagnostics.contains("still open at end of document"));
}

/// Test that the break marker and newlines both split output lines
#[test]
fn test_lines_withMarkers_shouldIndentContinuations() {
    let translation = Translation {
        text: format!("first{}second\nthird", LINE_BREAK),
        indent: Indentation::default(),
        next_indent: Indentation::default(),
        body_indent: Indentation::default().indented(),
    };

    assert_eq!(translation.lines(), vec!["first", "  second", "  third"]);
    assert_eq!(translation.render(), "first\n  second\n  third");
}
