/*!
 * Logical line translation from DocBook to reStructuredText.
 *
 * The translator owns the per-document state: the heading currently waiting
 * for its title, and the indentation of admonition blocks. One instance
 * translates exactly one document.
 */

use std::fmt;

use crate::conversion::entities::AliasTable;
use crate::conversion::substitutions::SubstitutionTable;
use crate::diagnostics::{Diagnostics, SourceLocation};
use crate::errors::ConversionError;
use crate::markup::{LogicalLine, Tag};

/// Embedded line break, expanded when the translation is rendered
pub const LINE_BREAK: char = '\u{E000}';

/// Block tags rendered as directives with indented content
pub const ADMONITIONS: [&str; 5] = ["note", "warning", "tip", "important", "caution"];

/// Document structure levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeadingKind {
    Chapter,
    Sect1,
    Sect2,
    Sect3,
}

impl HeadingKind {
    pub fn from_tag(name: &str) -> Option<Self> {
        match name {
            "chapter" => Some(Self::Chapter),
            "sect1" => Some(Self::Sect1),
            "sect2" => Some(Self::Sect2),
            "sect3" => Some(Self::Sect3),
            _ => None,
        }
    }

    pub fn tag_name(self) -> &'static str {
        match self {
            Self::Chapter => "chapter",
            Self::Sect1 => "sect1",
            Self::Sect2 => "sect2",
            Self::Sect3 => "sect3",
        }
    }

    /// Horizontal rule drawn around the title
    pub fn decoration(self) -> &'static str {
        match self {
            Self::Chapter => "################################################",
            Self::Sect1 => "------------------------------------------------",
            Self::Sect2 => "^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^",
            Self::Sect3 => "\"\"\"\"\"\"\"\"\"\"\"\"\"\"\"\"\"\"\"\"\"\"\"\"\"\"\"\"\"\"\"\"\"\"\"\"\"\"\"\"\"\"\"\"\"\"\"\"",
        }
    }

    /// Whether the decoration also appears above the title
    pub fn has_overbar(self) -> bool {
        matches!(self, Self::Chapter | Self::Sect1)
    }
}

/// The heading whose title has not been closed yet
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SectionState {
    current: Option<HeadingKind>,
}

impl SectionState {
    pub fn current(&self) -> Option<HeadingKind> {
        self.current
    }

    pub fn awaiting_title(&self) -> bool {
        self.current.is_some()
    }

    fn enter(&mut self, kind: HeadingKind) {
        self.current = Some(kind);
    }

    fn clear(&mut self) {
        self.current = None;
    }
}

/// Block indentation, two spaces per level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Indentation {
    depth: usize,
}

impl Indentation {
    pub const STEP: &'static str = "  ";

    pub fn depth(self) -> usize {
        self.depth
    }

    /// Width in spaces
    pub fn width(self) -> usize {
        self.depth * Self::STEP.len()
    }

    pub fn indented(self) -> Self {
        Self {
            depth: self.depth + 1,
        }
    }

    /// One level less, or `None` at the left margin
    pub fn dedented(self) -> Option<Self> {
        self.depth.checked_sub(1).map(|depth| Self { depth })
    }
}

impl fmt::Display for Indentation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for _ in 0..self.depth {
            f.write_str(Self::STEP)?;
        }
        Ok(())
    }
}

/// Translated text for one logical line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    pub text: String,
    /// Indentation in effect before this line
    pub indent: Indentation,
    /// Indentation in effect after this line
    pub next_indent: Indentation,
    /// Indentation of continuation lines: the deepest level reached on this line
    pub body_indent: Indentation,
}

impl Translation {
    /// Physical output lines
    pub fn lines(&self) -> Vec<String> {
        self.text
            .split(|c| c == LINE_BREAK || c == '\n')
            .enumerate()
            .map(|(index, segment)| {
                if segment.trim().is_empty() {
                    String::new()
                } else if index == 0 {
                    format!("{}{}", self.indent, segment)
                } else {
                    format!("{}{}", self.body_indent, segment.trim_start())
                }
            })
            .collect()
    }

    pub fn render(&self) -> String {
        self.lines().join("\n")
    }
}

/// Per-document DocBook to reStructuredText translator
#[derive(Debug, Clone, Default)]
pub struct Translator {
    substitutions: SubstitutionTable,
    section: SectionState,
    indentation: Indentation,
}

impl Translator {
    pub fn new(substitutions: SubstitutionTable) -> Self {
        Self {
            substitutions,
            section: SectionState::default(),
            indentation: Indentation::default(),
        }
    }

    pub fn section(&self) -> SectionState {
        self.section
    }

    pub fn indentation(&self) -> Indentation {
        self.indentation
    }

    pub fn substitutions(&self) -> &SubstitutionTable {
        &self.substitutions
    }

    pub fn translate(
        &mut self,
        line: &LogicalLine,
        aliases: &AliasTable,
        location: &SourceLocation,
        diagnostics: &mut Diagnostics,
    ) -> Result<Translation, ConversionError> {
        let indent = self.indentation;
        let mut next_indent = self.indentation;

        let substituted = self.substitutions.apply(&line.text);
        for _ in 0..substituted.indents {
            next_indent = next_indent.indented();
        }
        let mut text = aliases.apply(&substituted.text);
        let mut body_indent = next_indent;

        let heading = line
            .tags
            .iter()
            .find_map(|tag| HeadingKind::from_tag(tag.name()).map(|kind| (kind, tag)));

        if let Some((kind, tag)) = heading {
            text = self.translate_heading(kind, tag, &line.tags, &text, location, diagnostics)?;
        } else {
            text = rewrite_links(&text, &line.tags);
            for tag in &line.tags {
                text = self.apply_tag(tag, text, &mut next_indent, location)?;
                if next_indent.depth() > body_indent.depth() {
                    body_indent = next_indent;
                }
            }
        }

        // A directive opening at the end of the line needs no blank line after it
        let text = text.trim();
        let text = text
            .strip_suffix(LINE_BREAK)
            .filter(|head| head.ends_with("::"))
            .unwrap_or(text);

        self.indentation = next_indent;
        Ok(Translation {
            text: text.to_string(),
            indent,
            next_indent,
            body_indent,
        })
    }

    /// Warn about blocks still open at end of document
    pub fn finish(&self, location: &SourceLocation, diagnostics: &mut Diagnostics) {
        if let Some(kind) = self.section.current() {
            diagnostics.warn(location, format!("<{}> heading never received a title", kind.tag_name()));
        }
        if self.indentation.depth() > 0 {
            diagnostics.warn(
                location,
                format!("{} indented block(s) still open at end of document", self.indentation.depth()),
            );
        }
    }

    fn translate_heading(
        &mut self,
        kind: HeadingKind,
        tag: &Tag,
        tags: &[Tag],
        text: &str,
        location: &SourceLocation,
        diagnostics: &mut Diagnostics,
    ) -> Result<String, ConversionError> {
        let (titles, others): (Vec<&Tag>, Vec<&Tag>) = tags
            .iter()
            .filter(|t| !std::ptr::eq(*t, tag))
            .partition(|t| matches!(t.name(), "title" | "/title"));
        if !others.is_empty() {
            diagnostics.warn(
                location,
                format!("<{}> should be on its own line, ignoring other tags", kind.tag_name()),
            );
        }
        let id = tag.attribute("id").ok_or_else(|| ConversionError::MissingSectionId {
            location: location.clone(),
            tag: kind.tag_name().to_string(),
        })?;
        self.section.enter(kind);

        let rest = others
            .iter()
            .fold(text.replacen(tag.markup(), " ", 1), |acc, t| acc.replacen(t.markup(), " ", 1));
        let mut rest = rest.split_whitespace().collect::<Vec<_>>().join(" ");
        for title in titles {
            rest = self.apply_title(title, rest, location)?;
        }

        let mut anchor = format!("{LINE_BREAK}.. _{id}:{LINE_BREAK}");
        if !rest.is_empty() {
            anchor.push(LINE_BREAK);
            anchor.push_str(&rest);
        }
        Ok(anchor)
    }

    fn apply_tag(
        &mut self,
        tag: &Tag,
        text: String,
        next_indent: &mut Indentation,
        location: &SourceLocation,
    ) -> Result<String, ConversionError> {
        let name = tag.name();
        match name {
            "title" | "/title" => self.apply_title(tag, text, location),
            _ if ADMONITIONS.contains(&name) && text.contains(tag.markup()) => {
                *next_indent = next_indent.indented();
                Ok(text.replacen(tag.markup(), &format!(".. {}::{}", name, LINE_BREAK), 1))
            }
            _ if name.strip_prefix('/').is_some_and(|open| ADMONITIONS.contains(&open)) => {
                *next_indent = next_indent.dedented().ok_or_else(|| ConversionError::UnbalancedIndentation {
                    location: location.clone(),
                    tag: name.to_string(),
                })?;
                Ok(text.trim().replace(tag.markup(), ""))
            }
            _ => Ok(text),
        }
    }

    /// Decorate a title with the rule of the heading waiting for it
    fn apply_title(&mut self, tag: &Tag, text: String, location: &SourceLocation) -> Result<String, ConversionError> {
        let kind = self.require_section(tag.name(), location)?;
        let title = text.trim().replace(tag.markup(), "");
        if tag.name() == "/title" {
            self.section.clear();
            return Ok(format!("{}\n{}", title.trim(), kind.decoration()));
        }
        if kind.has_overbar() {
            Ok(format!("{}\n{}", kind.decoration(), title.trim()))
        } else {
            Ok(title)
        }
    }

    fn require_section(&self, tag: &str, location: &SourceLocation) -> Result<HeadingKind, ConversionError> {
        self.section.current().ok_or_else(|| ConversionError::TitleOutsideSection {
            location: location.clone(),
            tag: tag.to_string(),
        })
    }
}

/// Rewrite `ulink`, `link` and `xref` markup into reStructuredText references
fn rewrite_links(text: &str, tags: &[Tag]) -> String {
    let mut result = text.to_string();

    for (index, tag) in tags.iter().enumerate() {
        if tag.name() == "xref" {
            if let Some(target) = tag.attribute("linkend") {
                result = result.replacen(tag.markup(), &format!(":ref:`{}`", target), 1);
            }
            continue;
        }

        let (attribute, closing) = match tag.name() {
            "ulink" => ("url", "/ulink"),
            "link" => ("linkend", "/link"),
            _ => continue,
        };
        let Some(target) = tag.attribute(attribute) else {
            continue;
        };

        if tag.is_self_closing() {
            let reference = reference_markup(tag.name(), "", target);
            result = result.replacen(tag.markup(), &reference, 1);
            continue;
        }

        let Some(close) = tags[index + 1..].iter().find(|t| t.name() == closing) else {
            continue;
        };
        let Some(open_at) = result.find(tag.markup()) else {
            continue;
        };
        let inner_start = open_at + tag.markup().len();
        let Some(close_offset) = result[inner_start..].find(close.markup()) else {
            continue;
        };
        let close_at = inner_start + close_offset;

        let label = result[inner_start..close_at].split_whitespace().collect::<Vec<_>>().join(" ");
        let reference = reference_markup(tag.name(), &label, target);
        result.replace_range(open_at..close_at + close.markup().len(), &reference);
    }

    result
}

fn reference_markup(kind: &str, label: &str, target: &str) -> String {
    match (kind, label.is_empty()) {
        ("ulink", true) => format!("`<{}>`_", target),
        ("ulink", false) => format!("`{} <{}>`_", label, target),
        (_, true) => format!(":ref:`{}`", target),
        (_, false) => format!(":ref:`{} <{}>`", label, target),
    }
}
