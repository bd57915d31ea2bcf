//! Logical line assembly.
//!
//! Physical lines are joined until the accumulated text has no open quote,
//! balanced tag nesting, and no open atomic tag pair. Only then is the text
//! released to the caller. A blank physical line outside any accumulation is
//! released as an empty logical line.

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::diagnostics::{Diagnostics, SourceLocation};
use crate::errors::ConversionError;
use crate::markup::quotes::{QuoteScan, QuoteScanner};
use crate::markup::tags::{Tag, TagTokenizer};

/// Tags whose open and close must land in the same logical line
pub const ATOMIC_TAGS: [&str; 3] = ["link", "ulink", "bookinfo"];

/// Default limit on the number of physical lines in one logical line
pub const DEFAULT_MAX_SPAN: usize = 500;

static DOCTYPE_OPENING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*<!DOCTYPE\s").expect("Invalid DOCTYPE regex")
});

/// Whether `text` starts a DOCTYPE declaration
pub fn starts_doctype(text: &str) -> bool {
    DOCTYPE_OPENING.is_match(text)
}

/// A complete unit of input, ready for translation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalLine {
    pub text: String,
    pub tags: Vec<Tag>,
    /// Physical line where the accumulation began
    pub first_line: usize,
    /// Physical line that completed it
    pub last_line: usize,
}

impl LogicalLine {
    pub fn new(text: impl Into<String>, tags: Vec<Tag>) -> Self {
        Self {
            text: text.into(),
            tags,
            first_line: 1,
            last_line: 1,
        }
    }

    pub fn tag_names(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(Tag::name)
    }

    pub fn has_tag(&self, name: &str) -> bool {
        self.tag_names().any(|tag| tag == name)
    }

    /// The text with every tag's markup removed
    pub fn text_outside_tags(&self) -> String {
        self.tags
            .iter()
            .fold(self.text.clone(), |text, tag| text.replacen(tag.markup(), " ", 1))
    }
}

/// What the assembler did with a physical line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assembly {
    /// More input is needed
    Pending,
    /// A logical line is ready
    Complete(LogicalLine),
    /// A DOCTYPE opening that reached its internal subset; tags are still open
    DoctypeOpening(LogicalLine),
}

/// Open/close bookkeeping for atomic tag pairs
#[derive(Debug, Default)]
struct AtomicPairs {
    open: [bool; 3],
    warnings: Vec<String>,
}

impl AtomicPairs {
    fn scan(tags: &[Tag]) -> Self {
        let mut pairs = Self::default();
        for tag in tags.iter().filter(|t| !t.is_self_closing()) {
            let (name, closing) = match tag.name().strip_prefix('/') {
                Some(name) => (name, true),
                None => (tag.name(), false),
            };
            let Some(slot) = ATOMIC_TAGS.iter().position(|atomic| *atomic == name) else {
                continue;
            };
            match (closing, pairs.open[slot]) {
                (false, false) => pairs.open[slot] = true,
                (false, true) => pairs.warnings.push(format!("nested <{}> open tag before close", name)),
                (true, true) => pairs.open[slot] = false,
                (true, false) => pairs.warnings.push(format!("close tag before open tag for <{}>", name)),
            }
        }
        pairs
    }

    fn is_closed(&self) -> bool {
        !self.open.iter().any(|open| *open)
    }
}

/// Accumulates physical lines into logical lines
#[derive(Debug)]
pub struct LineAssembler {
    tokenizer: TagTokenizer,
    buffer: String,
    started_at: Option<usize>,
    span: usize,
    max_span: usize,
}

impl Default for LineAssembler {
    fn default() -> Self {
        Self::new(TagTokenizer::default(), DEFAULT_MAX_SPAN)
    }
}

impl LineAssembler {
    pub fn new(tokenizer: TagTokenizer, max_span: usize) -> Self {
        Self {
            tokenizer,
            buffer: String::new(),
            started_at: None,
            span: 0,
            max_span: max_span.max(1),
        }
    }

    /// Whether some text is waiting for more input
    pub fn is_pending(&self) -> bool {
        self.started_at.is_some()
    }

    /// The accumulated text so far
    pub fn pending_text(&self) -> &str {
        self.buffer.trim()
    }

    /// Feed one physical line
    pub fn push(
        &mut self,
        physical: &str,
        location: &SourceLocation,
        diagnostics: &mut Diagnostics,
    ) -> Result<Assembly, ConversionError> {
        let trimmed = physical.trim();
        if self.started_at.is_none() {
            if trimmed.is_empty() {
                return Ok(Assembly::Complete(LogicalLine {
                    text: String::new(),
                    tags: Vec::new(),
                    first_line: location.line,
                    last_line: location.line,
                }));
            }
            self.started_at = Some(location.line);
        }
        self.buffer.push(' ');
        self.buffer.push_str(trimmed);
        self.span += 1;

        let candidate = self.buffer.trim();
        let quotes = QuoteScanner::scan(candidate);

        if !quotes.is_incomplete() {
            let tokenized = self
                .tokenizer
                .tokenize(candidate, &quotes)
                .map_err(|e| ConversionError::malformed(location, e.to_string()))?;

            if !tokenized.unbalanced {
                let pairs = AtomicPairs::scan(&tokenized.tags);
                if pairs.is_closed() {
                    for warning in pairs.warnings {
                        diagnostics.warn(location, warning);
                    }
                    let text = tokenized.line.trim().to_string();
                    return Ok(Assembly::Complete(self.take(text, tokenized.tags, location)));
                }
                debug!("{}: holding line for atomic tag close", location);
            } else if starts_doctype(candidate) && has_unquoted(candidate, &quotes, b'[') {
                let text = candidate.to_string();
                return Ok(Assembly::DoctypeOpening(self.take(text, Vec::new(), location)));
            }
        }

        if self.span >= self.max_span {
            let started = location.at_line(self.started_at.unwrap_or(location.line));
            return Err(ConversionError::malformed(
                &started,
                format!("tag or quote still open after {} lines", self.span),
            ));
        }

        Ok(Assembly::Pending)
    }

    /// Check for input left over at end of file
    pub fn finish(&mut self, location: &SourceLocation) -> Result<(), ConversionError> {
        match self.started_at {
            Some(line) => {
                let started = location.at_line(line);
                let pending: String = self.pending_text().chars().take(60).collect();
                Err(ConversionError::malformed(
                    &started,
                    format!("tag never closes before end of input: {}", pending),
                ))
            }
            None => Ok(()),
        }
    }

    fn take(&mut self, text: String, tags: Vec<Tag>, location: &SourceLocation) -> LogicalLine {
        let first_line = self.started_at.take().unwrap_or(location.line);
        self.buffer.clear();
        self.span = 0;
        LogicalLine {
            text,
            tags,
            first_line,
            last_line: location.line,
        }
    }
}

fn has_unquoted(text: &str, quotes: &QuoteScan, needle: u8) -> bool {
    text.bytes()
        .enumerate()
        .any(|(index, byte)| byte == needle && !quotes.is_quoted(index))
}
