/*!
 * Entity declarations from the DOCTYPE preamble.
 *
 * While the DOCTYPE region is open, `<!ENTITY ...>` declarations either
 * register a sub-document (`SYSTEM`/`PUBLIC` form) or an alias with an
 * inline literal value. Aliases are applied to body text later on.
 */

use std::collections::BTreeMap;
use std::path::PathBuf;

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::conversion::substitutions::SubstitutionTable;
use crate::diagnostics::{Diagnostics, SourceLocation};
use crate::errors::ConversionError;
use crate::markup::{strip_quotes, LogicalLine, Tag};

/// Marker closing the DOCTYPE internal subset
pub const DOCTYPE_CLOSE: &str = "]>";

static ENTITY_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&([A-Za-z_][\w.\-]*);").expect("Invalid entity reference regex")
});

/// Names of every `&name;` reference in `text`, in order
pub fn entity_references(text: &str) -> impl Iterator<Item = &str> {
    ENTITY_REFERENCE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
}

/// Whether a complete line carries the DOCTYPE close marker outside any tag
pub fn closes_doctype(line: &LogicalLine) -> bool {
    line.text_outside_tags().contains(DOCTYPE_CLOSE)
}

/// A sub-document declared with an external entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubDocRecord {
    /// Entity name used as `&reference;` in the body
    pub reference: String,
    /// Path as written in the declaration
    pub source: PathBuf,
    /// Where the declaration was found
    pub declared_at: SourceLocation,
}

/// Entity references resolved to literal text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasTable {
    entries: BTreeMap<String, String>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `&name;` as `value`
    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        self.entries.insert(format!("&{};", name), value.into());
    }

    /// Replacement for a full reference such as `&name;`
    pub fn get(&self, reference: &str) -> Option<&str> {
        self.entries.get(reference).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn apply(&self, text: &str) -> String {
        self.entries
            .iter()
            .filter(|(reference, _)| text.contains(reference.as_str()))
            .fold(text.to_string(), |acc, (reference, value)| acc.replace(reference.as_str(), value))
    }
}

/// DOCTYPE region state for one document
#[derive(Debug, Default)]
pub struct EntityResolver {
    active: bool,
    records: Vec<SubDocRecord>,
}

impl EntityResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Enter the DOCTYPE region
    pub fn open(&mut self, location: &SourceLocation) -> Result<(), ConversionError> {
        if self.active {
            return Err(ConversionError::NestedDoctype {
                location: location.clone(),
            });
        }
        debug!("{}: entering DOCTYPE section", location);
        self.active = true;
        Ok(())
    }

    /// Handle one complete line while the region is open
    pub fn process(
        &mut self,
        line: &LogicalLine,
        aliases: &mut AliasTable,
        substitutions: &SubstitutionTable,
        location: &SourceLocation,
        diagnostics: &mut Diagnostics,
    ) -> Result<(), ConversionError> {
        if !self.active {
            return Err(ConversionError::DoctypeCloseWithoutOpen {
                location: location.clone(),
            });
        }

        let entity = line.tags.iter().find(|tag| tag.name() == "!ENTITY");
        if let Some(entity) = entity {
            if line.tags.len() > 1 {
                diagnostics.warn(location, "<!ENTITY> should be on a line by itself, ignoring other tags");
            }
            self.declare(entity, aliases, substitutions, location, diagnostics);
        }

        if closes_doctype(line) {
            debug!("{}: leaving DOCTYPE section", location);
            self.active = false;
        } else if entity.is_none() && !line.text.trim().is_empty() {
            diagnostics.warn(location, "unknown line in DOCTYPE section");
        }
        Ok(())
    }

    fn declare(
        &mut self,
        tag: &Tag,
        aliases: &mut AliasTable,
        substitutions: &SubstitutionTable,
        location: &SourceLocation,
        diagnostics: &mut Diagnostics,
    ) {
        let parts = tag.attributes();
        let Some(name) = parts.first() else {
            diagnostics.warn(location, "malformed !ENTITY tag");
            return;
        };

        if name == "%" {
            debug!("{}: skipping parameter entity", location);
            return;
        }

        let external = match parts.get(1).map(String::as_str) {
            Some("SYSTEM") => parts.get(2),
            Some("PUBLIC") => parts.get(3),
            _ => None,
        };

        match (external, parts.get(1)) {
            (Some(path), _) => {
                debug!("{}: sub-document &{}; -> {}", location, name, strip_quotes(path));
                self.records.push(SubDocRecord {
                    reference: name.clone(),
                    source: PathBuf::from(strip_quotes(path)),
                    declared_at: location.clone(),
                });
            }
            (None, Some(value)) if value != "SYSTEM" && value != "PUBLIC" => {
                let translated = substitutions.apply(value);
                aliases.insert(name, strip_quotes(translated.text.trim()));
            }
            _ => diagnostics.warn(location, "malformed !ENTITY tag"),
        }
    }

    /// Sub-documents declared so far, in declaration order
    pub fn records(&self) -> &[SubDocRecord] {
        &self.records
    }

    /// The sub-document registered under `reference`
    pub fn find(&self, reference: &str) -> Option<&SubDocRecord> {
        self.records.iter().find(|record| record.reference == reference)
    }

    pub fn into_records(self) -> Vec<SubDocRecord> {
        self.records
    }
}
