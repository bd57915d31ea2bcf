use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::default::Default;
use std::path::PathBuf;

use crate::markup::DEFAULT_IGNORED_TAGS;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Documentation project scaffold
    #[serde(default)]
    pub scaffold: ScaffoldConfig,

    /// DocBook conversion settings
    #[serde(default)]
    pub conversion: ConversionConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Sphinx extensions the scaffold tool knows how to enable
pub const KNOWN_EXTENSIONS: [&str; 10] = [
    "autodoc",
    "doctest",
    "intersphinx",
    "todo",
    "coverage",
    "imgmath",
    "mathjax",
    "ifconfig",
    "viewcode",
    "githubpages",
];

/// Settings passed to the project scaffold tool
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ScaffoldConfig {
    /// Run the scaffold tool before converting
    #[serde(default = "default_true")]
    pub enabled: bool,

    // @field: Executable name or path
    #[serde(default = "default_program")]
    pub program: String,

    /// Project name, also the default master document name
    #[serde(default = "String::new")]
    pub project: String,

    /// Copyright holder
    #[serde(default = "default_author")]
    pub author: String,

    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default = "default_version")]
    pub release: String,

    /// Document language
    #[serde(default = "default_language")]
    pub language: String,

    /// Source file suffix, dot included
    #[serde(default = "default_suffix")]
    pub suffix: String,

    /// Master document name; the project name when unset
    #[serde(default)]
    pub master: Option<String>,

    /// Separate source and build directories
    #[serde(default = "default_true")]
    pub separate_source: bool,

    /// Replacement for the dot in `_templates` and friends
    #[serde(default = "default_dot")]
    pub dot: String,

    #[serde(default)]
    pub epub: bool,

    // @field: Extension names from KNOWN_EXTENSIONS
    #[serde(default)]
    pub extensions: Vec<String>,

    #[serde(default = "default_true")]
    pub makefile: bool,

    #[serde(default)]
    pub batchfile: bool,

    /// Make-mode for the generated Makefile; left to the tool when unset
    #[serde(default)]
    pub use_make_mode: Option<bool>,
}

impl ScaffoldConfig {
    // @returns: Master document name
    pub fn master_name(&self) -> &str {
        self.master.as_deref().unwrap_or(&self.project)
    }
}

impl Default for ScaffoldConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            program: default_program(),
            project: String::new(),
            author: default_author(),
            version: default_version(),
            release: default_version(),
            language: default_language(),
            suffix: default_suffix(),
            master: None,
            separate_source: true,
            dot: default_dot(),
            epub: false,
            extensions: Vec::new(),
            makefile: true,
            batchfile: false,
            use_make_mode: None,
        }
    }
}

/// DocBook conversion settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ConversionConfig {
    /// Directory of the generated documentation project
    #[serde(default = "default_destination")]
    pub destination: String,

    /// Name of the source directory inside a separated project
    #[serde(default = "default_source_dir")]
    pub source_dir: String,

    /// Tags whose markup is removed without effect
    #[serde(default = "default_ignored_tags")]
    pub ignored_tags: Vec<String>,

    /// Physical lines one logical line may span before the input is rejected
    #[serde(default = "default_max_logical_line_span")]
    pub max_logical_line_span: usize,

    #[serde(default = "default_toctree_maxdepth")]
    pub toctree_maxdepth: u32,

    /// Extra literal substitutions, applied after the built-in inline rules
    #[serde(default)]
    pub extra_substitutions: BTreeMap<String, String>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            destination: default_destination(),
            source_dir: default_source_dir(),
            ignored_tags: default_ignored_tags(),
            max_logical_line_span: default_max_logical_line_span(),
            toctree_maxdepth: default_toctree_maxdepth(),
            extra_substitutions: BTreeMap::new(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_program() -> String {
    "sphinx-quickstart".to_string()
}

fn default_author() -> String {
    "Unknown".to_string()
}

fn default_version() -> String {
    "1.0.0".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

fn default_suffix() -> String {
    ".rst".to_string()
}

fn default_dot() -> String {
    "_".to_string()
}

fn default_destination() -> String {
    "doc".to_string()
}

fn default_source_dir() -> String {
    "source".to_string()
}

fn default_ignored_tags() -> Vec<String> {
    DEFAULT_IGNORED_TAGS.iter().map(|tag| tag.to_string()).collect()
}

fn default_max_logical_line_span() -> usize {
    500
}

fn default_toctree_maxdepth() -> u32 {
    3
}

impl Config {
    /// Directory the converted documents are written to
    pub fn output_dir(&self) -> PathBuf {
        let destination = PathBuf::from(&self.conversion.destination);
        if self.scaffold.separate_source {
            destination.join(&self.conversion.source_dir)
        } else {
            destination
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.scaffold.project.trim().is_empty() {
            return Err(anyhow!("Project name is required"));
        }

        if !self.scaffold.suffix.starts_with('.') || self.scaffold.suffix.len() < 2 {
            return Err(anyhow!("Suffix must start with '.': {}", self.scaffold.suffix));
        }

        if let Some(unknown) = self
            .scaffold
            .extensions
            .iter()
            .find(|ext| !KNOWN_EXTENSIONS.contains(&ext.as_str()))
        {
            return Err(anyhow!("Unknown extension: {}", unknown));
        }

        if self.conversion.max_logical_line_span == 0 {
            return Err(anyhow!("max_logical_line_span must be greater than zero"));
        }

        if self.conversion.toctree_maxdepth == 0 {
            return Err(anyhow!("toctree_maxdepth must be greater than zero"));
        }

        if self.conversion.destination.trim().is_empty() {
            return Err(anyhow!("Destination directory is required"));
        }

        Ok(())
    }
}
