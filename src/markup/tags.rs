//! Quote-aware tag tokenizer.
//!
//! Tag boundaries are found by walking the line byte by byte, treating `<`
//! and `>` as delimiters only outside quoted spans. A tag is emitted when the
//! nesting depth returns to zero; tags on the ignore list are cut out of the
//! line instead.

use std::collections::HashSet;

use crate::errors::MarkupError;
use crate::markup::quotes::QuoteScan;

/// Container tags whose markup carries no meaning for the output
pub const DEFAULT_IGNORED_TAGS: [&str; 6] = ["?xml", "para", "/chapter", "/sect1", "/sect2", "/sect3"];

/// One tag: name first, then attribute words and quoted values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    parts: Vec<String>,
    markup: String,
}

impl Tag {
    /// Build a tag from its parts; `parts` must hold at least the name
    pub(crate) fn new(parts: Vec<String>, markup: impl Into<String>) -> Self {
        debug_assert!(!parts.is_empty(), "a tag needs a name");
        Self {
            parts,
            markup: markup.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.parts[0]
    }

    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    pub fn attributes(&self) -> &[String] {
        &self.parts[1..]
    }

    /// Exact source text of the tag, delimiters included
    pub fn markup(&self) -> &str {
        &self.markup
    }

    pub fn is_closing(&self) -> bool {
        self.name().starts_with('/')
    }

    pub fn is_declaration(&self) -> bool {
        self.name().starts_with('!')
    }

    /// `<tag .../>`
    pub fn is_self_closing(&self) -> bool {
        self.markup.ends_with("/>")
    }

    /// Value of `key`, from either `key "value"` or `key=value` parts, quotes removed
    pub fn attribute(&self, key: &str) -> Option<&str> {
        let attributes = self.attributes();
        attributes
            .iter()
            .enumerate()
            .find_map(|(index, part)| {
                if part == key {
                    attributes.get(index + 1).map(|value| strip_quotes(value))
                } else {
                    part.strip_prefix(key)
                        .and_then(|rest| rest.strip_prefix('='))
                        .map(strip_quotes)
                }
            })
            .filter(|value| !value.is_empty())
    }
}

/// Remove one pair of matching surrounding quotes, if present
pub fn strip_quotes(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == last && (first == b'"' || first == b'\'') {
            return &value[1..value.len() - 1];
        }
    }
    value
}

/// Output of tokenizing one (possibly assembled) line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenizedLine {
    /// The line with ignored tags excised
    pub line: String,
    pub tags: Vec<Tag>,
    /// Nesting or quoting left open at end of line
    pub unbalanced: bool,
}

/// Tag scanner with a configurable ignore list
#[derive(Debug, Clone)]
pub struct TagTokenizer {
    ignored: HashSet<String>,
}

impl Default for TagTokenizer {
    fn default() -> Self {
        Self::with_ignored(DEFAULT_IGNORED_TAGS)
    }
}

impl TagTokenizer {
    pub fn with_ignored<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ignored: tags.into_iter().map(Into::into).collect(),
        }
    }

    /// Comments are always dropped along with the configured tags
    pub fn is_ignored(&self, name: &str) -> bool {
        name.starts_with("!--") || self.ignored.contains(name)
    }

    pub fn tokenize(&self, line: &str, quotes: &QuoteScan) -> Result<TokenizedLine, MarkupError> {
        let bytes = line.as_bytes();
        let mut output = String::with_capacity(line.len());
        let mut tags = Vec::new();
        let mut depth = 0usize;
        let mut tag_start = 0usize;
        let mut copied_to = 0usize;
        let mut index = 0usize;

        while index < bytes.len() {
            if let Some(span) = quotes.span_at(index) {
                index = span.end + 1;
                continue;
            }
            if quotes.open_at.is_some_and(|open| index >= open) {
                break;
            }

            match bytes[index] {
                b'<' => {
                    if depth == 0 {
                        tag_start = index;
                    }
                    depth += 1;
                }
                b'>' if depth > 0 => {
                    depth -= 1;
                    if depth == 0 {
                        let tag = read_tag(line, tag_start, index, quotes)?;
                        if self.is_ignored(tag.name()) {
                            output.push_str(&line[copied_to..tag_start]);
                            output.truncate(output.trim_end().len());
                            output.push(' ');

                            let mut next = index + 1;
                            while next < bytes.len() && bytes[next].is_ascii_whitespace() {
                                next += 1;
                            }
                            copied_to = next;
                            index = next;
                            continue;
                        }
                        tags.push(tag);
                    }
                }
                _ => {}
            }
            index += 1;
        }

        output.push_str(&line[copied_to..]);

        Ok(TokenizedLine {
            line: output,
            tags,
            unbalanced: depth != 0 || quotes.is_incomplete(),
        })
    }
}

/// Split the markup between `start` (`<`) and `end` (`>`) into tag parts
fn read_tag(line: &str, start: usize, end: usize, quotes: &QuoteScan) -> Result<Tag, MarkupError> {
    let mut parts = Vec::new();
    let mut cursor = start + 1;

    for span in quotes.spans.iter().filter(|s| s.start > start && s.end < end) {
        let unquoted = line[cursor..span.start].trim_end();
        let unquoted = unquoted.strip_suffix('=').unwrap_or(unquoted);
        parts.extend(unquoted.split_whitespace().map(str::to_string));
        parts.push(span.as_str(line).to_string());
        cursor = span.end + 1;
    }
    parts.extend(line[cursor..end].split_whitespace().map(str::to_string));

    if parts.is_empty() {
        return Err(MarkupError::EmptyTag { column: start });
    }

    Ok(Tag::new(parts, &line[start..=end]))
}
