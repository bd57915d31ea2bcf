use anyhow::{Context, Result};
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};

// @module: File and directory utilities

/// Extension replaced by the output suffix
pub const SOURCE_EXTENSION: &str = "xml";

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    /// Output file name for a DocBook source
    ///
    /// A trailing `.xml` (any case) is replaced by `suffix`; any other
    /// extension is kept and `suffix` is appended.
    pub fn translated_file_name<P: AsRef<Path>>(source: P, suffix: &str) -> String {
        let source = source.as_ref();
        let base = source
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();

        let is_xml = source
            .extension()
            .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(SOURCE_EXTENSION));

        match (is_xml, source.file_stem()) {
            (true, Some(stem)) => format!("{}{}", stem.to_string_lossy(), suffix),
            _ => format!("{}{}", base, suffix),
        }
    }

    // @generates: Output path for a converted document
    pub fn destination_path<P1: AsRef<Path>, P2: AsRef<Path>>(source: P1, output_dir: P2, suffix: &str) -> PathBuf {
        output_dir
            .as_ref()
            .join(Self::translated_file_name(source, suffix))
    }

    /// Remove a file if it is there; returns whether something was removed
    pub fn remove_file_if_exists<P: AsRef<Path>>(path: P) -> std::io::Result<bool> {
        let path = path.as_ref();
        if !Self::file_exists(path) {
            return Ok(false);
        }
        fs::remove_file(path)?;
        debug!("Removed existing file {:?}", path);
        Ok(true)
    }

    /// Remove a directory tree, logging instead of failing
    pub fn remove_dir_if_exists<P: AsRef<Path>>(path: P) -> bool {
        let path = path.as_ref();
        if !Self::dir_exists(path) {
            return false;
        }
        match fs::remove_dir_all(path) {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to remove existing directory {:?}: {}", path, e);
                false
            }
        }
    }

    /// Locate a declared sub-document
    ///
    /// The path is tried as written first, then relative to the directory of
    /// the document that declared it.
    pub fn resolve_subdocument<P1: AsRef<Path>, P2: AsRef<Path>>(declared: P1, parent_dir: P2) -> Option<PathBuf> {
        let declared = declared.as_ref();
        if Self::file_exists(declared) {
            return Some(declared.to_path_buf());
        }
        if declared.is_absolute() {
            return None;
        }
        let relative = parent_dir.as_ref().join(declared);
        Self::file_exists(&relative).then_some(relative)
    }

    /// Base name used in diagnostics
    pub fn display_name<P: AsRef<Path>>(path: P) -> String {
        let path = path.as_ref();
        path.file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string())
    }
}
