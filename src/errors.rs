/*!
 * Error types for the db2rst application.
 *
 * Fatal conversion conditions carry the source location they were found at,
 * using the thiserror crate for ergonomic error definitions.
 */

use std::path::PathBuf;
use thiserror::Error;

use crate::diagnostics::SourceLocation;

/// Errors raised while scanning the markup of a single logical line
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarkupError {
    /// A `<>` pair with nothing between the delimiters
    #[error("empty tag at column {column}")]
    EmptyTag {
        /// Byte offset of the opening delimiter
        column: usize,
    },
}

/// Fatal conditions that halt a conversion run
#[derive(Error, Debug)]
pub enum ConversionError {
    /// A DOCTYPE opening while a DOCTYPE region is already active
    #[error("{location}: nested DOCTYPE tags")]
    NestedDoctype { location: SourceLocation },

    /// A `]>` marker with no DOCTYPE region open
    #[error("{location}: DOCTYPE close before any open")]
    DoctypeCloseWithoutOpen { location: SourceLocation },

    /// A `<book>` inside another book
    #[error("{location}: nested book tags")]
    NestedBook { location: SourceLocation },

    /// A `</book>` with no matching `<book>`
    #[error("{location}: end book tag found before opening tag")]
    BookCloseWithoutOpen { location: SourceLocation },

    /// A heading tag without its identifier attribute
    #[error("{location}: {tag} tag with missing id")]
    MissingSectionId { location: SourceLocation, tag: String },

    /// A `title` or `/title` tag with no heading in progress
    #[error("{location}: <{tag}> tag with no preceding section tag")]
    TitleOutsideSection { location: SourceLocation, tag: String },

    /// A block close tag that would shrink the indentation below zero
    #[error("{location}: <{tag}> without a matching open tag")]
    UnbalancedIndentation { location: SourceLocation, tag: String },

    /// A declared sub-document that cannot be found on disk
    #[error("{location}: referenced sub-document \"{path}\" is not found")]
    SubDocumentNotFound { location: SourceLocation, path: PathBuf },

    /// Lexically broken input, e.g. a tag that never closes
    #[error("{location}: {message}")]
    MalformedInput { location: SourceLocation, message: String },

    /// Error reading a source or writing a destination
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConversionError {
    /// Build a `MalformedInput` error at the given location
    pub fn malformed(location: &SourceLocation, message: impl Into<String>) -> Self {
        Self::MalformedInput {
            location: location.clone(),
            message: message.into(),
        }
    }

    /// Source location of the failure, when there is one
    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            Self::NestedDoctype { location }
            | Self::DoctypeCloseWithoutOpen { location }
            | Self::NestedBook { location }
            | Self::BookCloseWithoutOpen { location }
            | Self::MissingSectionId { location, .. }
            | Self::TitleOutsideSection { location, .. }
            | Self::UnbalancedIndentation { location, .. }
            | Self::SubDocumentNotFound { location, .. }
            | Self::MalformedInput { location, .. } => Some(location),
            Self::Io(_) => None,
        }
    }
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// The project scaffold could not be generated
    #[error("Scaffold error: {0}")]
    Scaffold(String),

    /// A fatal condition in the document conversion
    #[error("Conversion error: {0}")]
    Conversion(#[from] ConversionError),

    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
