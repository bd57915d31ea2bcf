/*!
 * Streaming markup lexer.
 *
 * Turns a line-oriented DocBook stream into logical lines with their tags:
 * - `quotes`: quoted span detection for one line
 * - `tags`: quote-aware tag tokenizer with an ignore list
 * - `assembler`: joins physical lines until quotes, nesting and atomic
 *   tag pairs are all closed
 */

pub mod assembler;
pub mod quotes;
pub mod tags;

// Re-export main types
pub use assembler::{Assembly, LineAssembler, LogicalLine, ATOMIC_TAGS};
pub use quotes::{QuoteScan, QuoteScanner, QuotedSpan};
pub use tags::{strip_quotes, Tag, TagTokenizer, TokenizedLine, DEFAULT_IGNORED_TAGS};
