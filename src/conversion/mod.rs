/*!
 * DocBook to reStructuredText conversion.
 *
 * - `substitutions`: literal find/replace table for inline tags
 * - `entities`: DOCTYPE entity declarations, aliases and sub-documents
 * - `translator`: per-line translation with heading and indentation state
 * - `document`: file driver and the breadth-first sub-document queue
 */

pub mod document;
pub mod entities;
pub mod substitutions;
pub mod translator;

// Re-export main types
pub use document::{
    toctree_preamble, ConversionOptions, ConversionSummary, ConvertedDocument, DocumentConverter, QueuedDocument,
    SubDocumentQueue,
};
pub use entities::{AliasTable, EntityResolver, SubDocRecord};
pub use substitutions::{Substituted, Substitution, SubstitutionTable};
pub use translator::{HeadingKind, Indentation, SectionState, Translation, Translator, LINE_BREAK};
