/*!
 * Document conversion driver.
 *
 * Feeds physical lines through the line assembler, routes each logical line
 * to the entity resolver, the book handling or the translator, and writes the
 * result. Sub-documents declared by a document are queued and converted
 * breadth-first once it is done.
 */

use std::collections::{HashSet, VecDeque};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::conversion::entities::{closes_doctype, entity_references, AliasTable, EntityResolver, SubDocRecord};
use crate::conversion::substitutions::SubstitutionTable;
use crate::conversion::translator::Translator;
use crate::diagnostics::{Diagnostics, SourceLocation};
use crate::errors::ConversionError;
use crate::file_utils::FileManager;
use crate::markup::{Assembly, LineAssembler, LogicalLine, TagTokenizer, DEFAULT_IGNORED_TAGS};
use crate::markup::assembler::DEFAULT_MAX_SPAN;

/// Default depth of the generated table of contents
pub const DEFAULT_TOCTREE_MAXDEPTH: u32 = 3;

/// Indentation of table of contents entries
pub const TOC_ENTRY_INDENT: &str = "   ";

/// Table of contents directive written when the master book opens
pub fn toctree_preamble(maxdepth: u32) -> String {
    format!("\n.. toctree::\n   :maxdepth: {}\n   :titlesonly:\n   :glob:\n", maxdepth)
}

/// Settings for one conversion run
#[derive(Debug, Clone)]
pub struct ConversionOptions {
    pub output_dir: PathBuf,
    /// Extension of generated files, dot included
    pub suffix: String,
    pub ignored_tags: Vec<String>,
    pub max_span: usize,
    pub substitutions: SubstitutionTable,
    pub toctree_maxdepth: u32,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            suffix: ".rst".to_string(),
            ignored_tags: DEFAULT_IGNORED_TAGS.iter().map(|t| t.to_string()).collect(),
            max_span: DEFAULT_MAX_SPAN,
            substitutions: SubstitutionTable::default(),
            toctree_maxdepth: DEFAULT_TOCTREE_MAXDEPTH,
        }
    }
}

/// A sub-document waiting to be converted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedDocument {
    pub record: SubDocRecord,
    /// Directory of the document that declared it
    pub parent_dir: PathBuf,
}

/// FIFO of pending sub-documents
#[derive(Debug, Default)]
pub struct SubDocumentQueue {
    items: VecDeque<QueuedDocument>,
}

impl SubDocumentQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue every record of one document, keeping declaration order
    pub fn enqueue_all(&mut self, records: Vec<SubDocRecord>, parent_dir: &Path) {
        self.items.extend(records.into_iter().map(|record| QueuedDocument {
            record,
            parent_dir: parent_dir.to_path_buf(),
        }));
    }

    pub fn pop(&mut self) -> Option<QueuedDocument> {
        self.items.pop_front()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A source file and the file written for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedDocument {
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// Result of a full run
#[derive(Debug, Default)]
pub struct ConversionSummary {
    /// Converted documents, in conversion order
    pub documents: Vec<ConvertedDocument>,
    pub diagnostics: Diagnostics,
}

impl ConversionSummary {
    pub fn warning_count(&self) -> usize {
        self.diagnostics.len()
    }
}

/// Per-document state
struct DocumentPass {
    resolver: EntityResolver,
    translator: Translator,
    in_book: bool,
    master: bool,
}

/// Converts a master document and everything it references
pub struct DocumentConverter {
    options: ConversionOptions,
    aliases: AliasTable,
    queue: SubDocumentQueue,
    diagnostics: Diagnostics,
    visited: HashSet<PathBuf>,
    converted: Vec<ConvertedDocument>,
}

impl DocumentConverter {
    pub fn new(options: ConversionOptions) -> Self {
        Self {
            options,
            aliases: AliasTable::new(),
            queue: SubDocumentQueue::new(),
            diagnostics: Diagnostics::new(),
            visited: HashSet::new(),
            converted: Vec::new(),
        }
    }

    pub fn options(&self) -> &ConversionOptions {
        &self.options
    }

    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Convert `master_path` and, breadth-first, every sub-document it pulls in
    pub fn run(mut self, master_path: &Path) -> Result<ConversionSummary, ConversionError> {
        let records = self.convert_document(master_path, true)?;
        self.queue.enqueue_all(records, &parent_dir(master_path));

        while let Some(queued) = self.queue.pop() {
            let record = &queued.record;
            let path = FileManager::resolve_subdocument(&record.source, &queued.parent_dir).ok_or_else(|| {
                ConversionError::SubDocumentNotFound {
                    location: record.declared_at.clone(),
                    path: record.source.clone(),
                }
            })?;
            if path != record.source {
                info!("Replacing {:?} with {:?}", record.source, path);
            }

            if self.visited.contains(&canonical(&path)) {
                self.diagnostics.warn(
                    &record.declared_at,
                    format!("sub-document {:?} was already converted, skipping", path),
                );
                continue;
            }

            let records = self.convert_document(&path, false)?;
            self.queue.enqueue_all(records, &parent_dir(&path));
        }

        Ok(ConversionSummary {
            documents: self.converted,
            diagnostics: self.diagnostics,
        })
    }

    /// Convert one file into the output directory
    pub fn convert_document(&mut self, source: &Path, master: bool) -> Result<Vec<SubDocRecord>, ConversionError> {
        let destination = FileManager::destination_path(source, &self.options.output_dir, &self.options.suffix);
        info!("Converting {:?} -> {:?}", source, destination);

        self.visited.insert(canonical(source));
        fs::create_dir_all(&self.options.output_dir)?;
        FileManager::remove_file_if_exists(&destination)?;

        let reader = BufReader::new(File::open(source)?);
        let mut writer = BufWriter::new(File::create(&destination)?);
        let name = FileManager::display_name(source);
        let records = self.convert_reader(reader, &mut writer, &name, master)?;

        self.converted.push(ConvertedDocument {
            source: source.to_path_buf(),
            destination,
        });
        Ok(records)
    }

    /// Convert a stream; `name` is used in messages
    pub fn convert_reader<R: BufRead, W: Write>(
        &mut self,
        reader: R,
        writer: &mut W,
        name: &str,
        master: bool,
    ) -> Result<Vec<SubDocRecord>, ConversionError> {
        let tokenizer = TagTokenizer::with_ignored(self.options.ignored_tags.iter().cloned());
        let mut assembler = LineAssembler::new(tokenizer, self.options.max_span);
        let mut pass = DocumentPass {
            resolver: EntityResolver::new(),
            translator: Translator::new(self.options.substitutions.clone()),
            in_book: false,
            master,
        };
        let mut location = SourceLocation::new(name, 0);

        for (index, physical) in reader.lines().enumerate() {
            let physical = physical?;
            location.line = index + 1;

            match assembler.push(&physical, &location, &mut self.diagnostics)? {
                Assembly::Pending => {}
                Assembly::DoctypeOpening(_) => pass.resolver.open(&location)?,
                Assembly::Complete(line) => self.dispatch(&line, &mut pass, writer, &location)?,
            }
        }

        assembler.finish(&location)?;
        pass.translator.finish(&location, &mut self.diagnostics);
        if pass.resolver.is_active() {
            self.diagnostics.warn(&location, "DOCTYPE section never closed");
        }
        writer.flush()?;

        debug!("{}: {} sub-document(s) declared", name, pass.resolver.records().len());
        Ok(pass.resolver.into_records())
    }

    fn dispatch<W: Write>(
        &mut self,
        line: &LogicalLine,
        pass: &mut DocumentPass,
        writer: &mut W,
        location: &SourceLocation,
    ) -> Result<(), ConversionError> {
        if line.has_tag("!DOCTYPE") {
            if pass.resolver.is_active() {
                return Err(ConversionError::NestedDoctype {
                    location: location.clone(),
                });
            }
            let inline_subset = line
                .tags
                .iter()
                .any(|tag| tag.name() == "!DOCTYPE" && tag.markup().contains('['));
            if inline_subset {
                self.diagnostics
                    .warn(location, "DOCTYPE internal subset on a single line is not supported, skipping it");
            }
            return Ok(());
        }

        if pass.resolver.is_active() {
            return pass.resolver.process(
                line,
                &mut self.aliases,
                &self.options.substitutions,
                location,
                &mut self.diagnostics,
            );
        }

        if closes_doctype(line) {
            return Err(ConversionError::DoctypeCloseWithoutOpen {
                location: location.clone(),
            });
        }

        if line.has_tag("book") {
            if pass.in_book {
                return Err(ConversionError::NestedBook {
                    location: location.clone(),
                });
            }
            self.warn_single_tag("book", line, location);
            pass.in_book = true;
            if pass.master {
                writeln!(writer, "{}", toctree_preamble(self.options.toctree_maxdepth))?;
            }
            writeln!(writer)?;
            return Ok(());
        }

        if line.has_tag("/book") {
            if !pass.in_book {
                return Err(ConversionError::BookCloseWithoutOpen {
                    location: location.clone(),
                });
            }
            self.warn_single_tag("/book", line, location);
            pass.in_book = false;
            return Ok(());
        }

        if pass.in_book {
            let record = entity_references(&line.text).find_map(|reference| pass.resolver.find(reference));
            if let Some(record) = record {
                let entry = FileManager::translated_file_name(&record.source, &self.options.suffix);
                writeln!(writer, "{}{}", TOC_ENTRY_INDENT, entry)?;
                return Ok(());
            }
        }

        let translation = pass
            .translator
            .translate(line, &self.aliases, location, &mut self.diagnostics)?;
        for output in translation.lines() {
            writeln!(writer, "{}", output)?;
        }
        Ok(())
    }

    fn warn_single_tag(&mut self, tag: &str, line: &LogicalLine, location: &SourceLocation) {
        if line.tags.len() > 1 {
            self.diagnostics
                .warn(location, format!("<{}> should be on a line by itself, ignoring other tags", tag));
        }
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    path.parent().map(Path::to_path_buf).unwrap_or_default()
}

fn canonical(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
