/*!
 * Tests for DOCTYPE entity handling
 */

use std::path::PathBuf;

use db2rst::conversion::entities::{closes_doctype, AliasTable, EntityResolver};
use db2rst::conversion::SubstitutionTable;
use db2rst::diagnostics::{Diagnostics, SourceLocation};
use db2rst::errors::ConversionError;
use db2rst::markup::{LogicalLine, QuoteScanner, TagTokenizer};

fn logical(text: &str) -> LogicalLine {
    let tokenized = TagTokenizer::default()
        .tokenize(text, &QuoteScanner::scan(text))
        .unwrap();
    LogicalLine::new(tokenized.line, tokenized.tags)
}

struct Fixture {
    resolver: EntityResolver,
    aliases: AliasTable,
    substitutions: SubstitutionTable,
    diagnostics: Diagnostics,
    location: SourceLocation,
}

impl Fixture {
    fn open() -> Self {
        let location = SourceLocation::new("book.xml", 2);
        let mut resolver = EntityResolver::new();
        resolver.open(&location).unwrap();
        Self {
            resolver,
            aliases: AliasTable::new(),
            substitutions: SubstitutionTable::default(),
            diagnostics: Diagnostics::new(),
            location,
        }
    }

    fn process(&mut self, text: &str) -> Result<(), ConversionError> {
        self.resolver.process(
            &logical(text),
            &mut self.aliases,
            &self.substitutions,
            &self.location,
            &mut self.diagnostics,
        )
    }
}

/// Test that a SYSTEM entity registers a sub-document
#[test]
fn test_process_withSystemEntity_shouldRecordSubDocument() {
    let mut fixture = Fixture::open();

    fixture.process(r#"<!ENTITY intro SYSTEM "intro.xml">"#).unwrap();

    let record = fixture.resolver.find("intro").unwrap();
    assert_eq!(record.source, PathBuf::from("intro.xml"));
    assert_eq!(record.declared_at.line, 2);
    assert!(fixture.aliases.is_empty());
}

/// Test that a PUBLIC entity uses its system identifier as the path
#[test]
fn test_process_withPublicEntity_shouldRecordSystemId() {
    let mut fixture = Fixture::open();

    fixture.process(r#"<!ENTITY ch PUBLIC "-//Org//Chapter//EN" "chapters/ch.xml">"#).unwrap();

    assert_eq!(fixture.resolver.records().len(), 1);
    assert_eq!(fixture.resolver.records()[0].source, PathBuf::from("chapters/ch.xml"));
}

/// Test that an inline entity becomes a translated alias
#[test]
fn test_process_withLiteralEntity_shouldTranslateAlias() {
    let mut fixture = Fixture::open();

    fixture.process(r#"<!ENTITY model "<acronym>CESM</acronym>">"#).unwrap();

    assert_eq!(fixture.aliases.get("&model;"), Some("**CESM**"));
    assert!(fixture.resolver.records().is_empty());
}

/// Test that the close marker ends the region, even after a declaration
#[test]
fn test_process_withCloseOnDeclarationLine_shouldDeclareAndClose() {
    let mut fixture = Fixture::open();

    fixture.process(r#"<!ENTITY ver "1.2"> ]>"#).unwrap();

    assert_eq!(fixture.aliases.get("&ver;"), Some("1.2"));
    assert!(!fixture.resolver.is_active());
}

/// Test that unknown content only warns
#[test]
fn test_process_withUnknownLine_shouldWarn() {
    let mut fixture = Fixture::open();

    fixture.process("stray text").unwrap();
    fixture.process("").unwrap();

    assert_eq!(fixture.diagnostics.len(), 1);
    assert!(fixture.diagnostics.contains("unknown line in DOCTYPE section"));
    assert!(fixture.resolver.is_active());
}

/// Test that a declaration without a name warns
#[test]
fn test_process_withEmptyEntity_shouldWarnMalformed() {
    let mut fixture = Fixture::open();

    fixture.process("<!ENTITY>").unwrap();

    assert!(fixture.diagnostics.contains("malformed !ENTITY tag"));
}

/// Test that a SYSTEM entity without a path warns
#[test]
fn test_process_withSystemEntityMissingPath_shouldWarnMalformed() {
    let mut fixture = Fixture::open();

    fixture.process("<!ENTITY intro SYSTEM>").unwrap();

    assert!(fixture.diagnostics.contains("malformed !ENTITY tag"));
    assert!(fixture.resolver.records().is_empty());
}

/// Test that parameter entities are skipped silently
#[test]
fn test_process_withParameterEntity_shouldSkip() {
    let mut fixture = Fixture::open();

    fixture.process(r#"<!ENTITY % common SYSTEM "common.ent">"#).unwrap();

    assert!(fixture.resolver.records().is_empty());
    assert!(fixture.diagnostics.is_empty());
}

/// Test that a second declaration tag on the line is reported
#[test]
fn test_process_withTwoTags_shouldWarnAndUseFirst() {
    let mut fixture = Fixture::open();

    fixture.process(r#"<!ENTITY a "A"><!ENTITY b "B">"#).unwrap();

    assert!(fixture.diagnostics.contains("should be on a line by itself"));
    assert_eq!(fixture.aliases.len(), 1);
    assert_eq!(fixture.aliases.get("&a;"), Some("A"));
}

/// Test that opening twice is fatal
#[test]
fn test_open_withActiveRegion_shouldFail() {
    let mut fixture = Fixture::open();
    let location = fixture.location.clone();

    let error = fixture.resolver.open(&location).unwrap_err();

    assert!(matches!(error, ConversionError::NestedDoctype { .. }));
    assert_eq!(error.to_string(), "line 2 of book.xml: nested DOCTYPE tags");
}

/// Test that processing without an open region is fatal
#[test]
fn test_process_withoutRegion_shouldFail() {
    let mut resolver = EntityResolver::new();
    let mut aliases = AliasTable::new();
    let mut diagnostics = Diagnostics::new();

    let error = resolver
        .process(
            &logical("]>"),
            &mut aliases,
            &SubstitutionTable::default(),
            &SourceLocation::new("book.xml", 9),
            &mut diagnostics,
        )
        .unwrap_err();

    assert!(matches!(error, ConversionError::DoctypeCloseWithoutOpen { .. }));
}

/// Test that the close marker inside an attribute value does not count
#[test]
fn test_closesDoctype_withQuotedMarker_shouldIgnoreIt() {
    assert!(closes_doctype(&logical("]>")));
    assert!(!closes_doctype(&logical(r#"<!ENTITY x "]>">"#)));
}
