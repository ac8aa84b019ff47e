//! Custom error types for yaba
//!
//! This module defines the error hierarchy for the crate using thiserror.
//! Schema and row errors are fatal to the file being imported, storage errors
//! are fatal to the operation that triggered them.

use thiserror::Error;

/// The main error type for yaba operations
#[derive(Error, Debug)]
pub enum YabaError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Validation errors for data models and request parameters
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// The header row lacks a mandatory column
    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),

    /// The header row contains a column the importer does not know (strict policy)
    #[error("unrecognized column '{0}'")]
    UnrecognizedColumn(String),

    /// The file has no header row at all
    #[error("file is empty, expected a header row")]
    EmptyFile,

    /// A date value matched none of the supported formats
    #[error("line {line}: date '{value}' must have format YYYY-MM-DD or DD Mon YYYY")]
    InvalidDate { line: u64, value: String },

    /// An amount value could not be parsed as a decimal number
    #[error("line {line}: failed to parse dollars from '{value}'")]
    InvalidAmount { line: u64, value: String },

    /// Low-level CSV failures (wrong field count, unreadable stream)
    #[error("CSV error: {0}")]
    Csv(String),

    /// A file could not be read into expenditures
    #[error("failed to import '{file}': {source}")]
    Import {
        file: String,
        #[source]
        source: Box<YabaError>,
    },

    /// A file was read but its expenditures could not be saved
    #[error("failed to save '{file}': {source}")]
    Persist {
        file: String,
        #[source]
        source: Box<YabaError>,
    },

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// A caller broke an invariant the operation relies on
    #[error("Precondition violated: {0}")]
    Precondition(String),
}

impl YabaError {
    /// Wrap an error as a file-level import failure
    pub fn import(file: impl Into<String>, source: YabaError) -> Self {
        Self::Import {
            file: file.into(),
            source: Box::new(source),
        }
    }

    /// Wrap an error as a file-level persistence failure
    pub fn persist(file: impl Into<String>, source: YabaError) -> Self {
        Self::Persist {
            file: file.into(),
            source: Box::new(source),
        }
    }

    /// Create a "not found" error for budgets
    pub fn budget_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Budget",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this error stems from the header row of an import
    pub fn is_schema(&self) -> bool {
        match self {
            Self::MissingColumn(_) | Self::UnrecognizedColumn(_) | Self::EmptyFile => true,
            Self::Import { source, .. } => source.is_schema(),
            _ => false,
        }
    }
}

impl From<std::io::Error> for YabaError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for YabaError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<csv::Error> for YabaError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err.to_string())
    }
}

/// Result type alias for yaba operations
pub type YabaResult<T> = Result<T, YabaError>;
