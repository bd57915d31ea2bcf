use anyhow::{anyhow, Result};
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::app_config::Config;
use crate::conversion::{ConversionOptions, ConversionSummary, DocumentConverter, SubstitutionTable};
use crate::errors::AppError;
use crate::file_utils::FileManager;
use crate::scaffold::ScaffoldRunner;

// @module: Application controller for DocBook conversion

/// Main application controller: scaffold first, then convert
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    /// Create a new controller for test purposes with default configuration
    pub fn new_for_test() -> Result<Self> {
        let mut config = Config::default();
        config.scaffold.project = "test".to_string();
        config.scaffold.enabled = false;
        Self::with_config(config)
    }

    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Conversion settings derived from the configuration
    pub fn conversion_options(&self) -> ConversionOptions {
        let conversion = &self.config.conversion;
        ConversionOptions {
            output_dir: self.config.output_dir(),
            suffix: self.config.scaffold.suffix.clone(),
            ignored_tags: conversion.ignored_tags.clone(),
            max_span: conversion.max_logical_line_span,
            substitutions: SubstitutionTable::with_extra(&conversion.extra_substitutions),
            toctree_maxdepth: conversion.toctree_maxdepth,
        }
    }

    /// Run the workflow; returns `None` when there was no document to convert
    pub fn run(&self, docbook_source: Option<&Path>) -> Result<Option<ConversionSummary>> {
        let start_time = Instant::now();
        let destination = PathBuf::from(&self.config.conversion.destination);

        if self.config.scaffold.enabled {
            ScaffoldRunner::run(&self.config.scaffold, &destination)
                .map_err(|e| AppError::Scaffold(e.to_string()))?;
        }

        let output_dir = self.config.output_dir();
        FileManager::ensure_dir(&output_dir)?;

        let Some(source) = docbook_source else {
            info!("No DocBook source given, only the project skeleton was prepared");
            return Ok(None);
        };
        if !FileManager::file_exists(source) {
            return Err(anyhow!("DocBook source does not exist: {:?}", source));
        }

        let summary = DocumentConverter::new(self.conversion_options())
            .run(source)
            .map_err(AppError::from)?;

        if summary.warning_count() > 0 {
            warn!("Conversion finished with {} warning(s)", summary.warning_count());
        }
        info!(
            "Converted {} document(s) into {:?} in {:.2?}",
            summary.documents.len(),
            output_dir,
            start_time.elapsed()
        );

        Ok(Some(summary))
    }
}
