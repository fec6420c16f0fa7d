//! Error types for graph merge operations
//!
//! Per-item failures (one unparseable file, one bad translation row) are
//! normally recorded in a report and skipped; the variants here surface when a
//! caller asks for a single item directly, or when the whole run has to stop.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Result type alias for graph merge operations
pub type OntologyResult<T> = Result<T, OntologyError>;

/// Error type for graph merge operations
#[derive(Debug)]
pub enum OntologyError {
    // =========================================================================
    // Loading Errors
    // =========================================================================
    /// Input file does not exist
    InputMissing { path: PathBuf },

    /// Turtle file could not be parsed
    TurtleParseFailed { path: PathBuf, reason: String },

    /// Every requested data file failed to load
    NoUsableInput { attempted: usize },

    // =========================================================================
    // Vocabulary Errors
    // =========================================================================
    /// Class is not declared in the loaded vocabulary
    UndeclaredClass { class: String },

    /// Entity kind is unknown
    UnknownEntityKind { value: String },

    // =========================================================================
    // Translation Errors
    // =========================================================================
    /// Translation table could not be read
    TranslationTableFailed { path: PathBuf, reason: String },

    /// Language name has no tag mapping
    UnknownLanguage { value: String },

    /// Translation row is missing a column
    MalformedRow { line: u64, reason: String },

    // =========================================================================
    // Record Errors
    // =========================================================================
    /// Scraped record could not be decoded
    RecordParseFailed {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    // =========================================================================
    // Serialization Errors
    // =========================================================================
    /// Output graph could not be written
    SerializationFailed { path: PathBuf, reason: String },

    /// JSON serialization failed
    JsonSerializationFailed { reason: String },

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid configuration value
    InvalidConfig {
        field: String,
        value: String,
        reason: String,
    },

    /// Missing required configuration
    MissingConfig { field: String },

    // =========================================================================
    // I/O Errors
    // =========================================================================
    /// File I/O error
    IoError {
        operation: String,
        path: Option<PathBuf>,
        source: io::Error,
    },

    // =========================================================================
    // Generic Errors
    // =========================================================================
    /// Generic error with context
    Other {
        context: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl fmt::Display for OntologyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Loading
            OntologyError::InputMissing { path } => {
                write!(f, "Input file not found: {path:?}")
            }
            OntologyError::TurtleParseFailed { path, reason } => {
                write!(f, "Failed to parse Turtle file {path:?}: {reason}")
            }
            OntologyError::NoUsableInput { attempted } => {
                write!(f, "None of the {attempted} input files could be loaded")
            }

            // Vocabulary
            OntologyError::UndeclaredClass { class } => {
                write!(f, "Class <{class}> is not declared in the vocabulary")
            }
            OntologyError::UnknownEntityKind { value } => {
                write!(f, "Unknown entity kind: '{value}'")
            }

            // Translation
            OntologyError::TranslationTableFailed { path, reason } => {
                write!(f, "Failed to read translation table {path:?}: {reason}")
            }
            OntologyError::UnknownLanguage { value } => {
                write!(f, "Unrecognized language: '{value}'")
            }
            OntologyError::MalformedRow { line, reason } => {
                write!(f, "Malformed translation row at line {line}: {reason}")
            }

            // Records
            OntologyError::RecordParseFailed { path, line, reason } => {
                write!(f, "Bad record in {path:?} at line {line}: {reason}")
            }

            // Serialization
            OntologyError::SerializationFailed { path, reason } => {
                write!(f, "Failed to write graph to {path:?}: {reason}")
            }
            OntologyError::JsonSerializationFailed { reason } => {
                write!(f, "JSON serialization failed: {reason}")
            }

            // Configuration
            OntologyError::InvalidConfig {
                field,
                value,
                reason,
            } => {
                write!(f, "Invalid config '{field}' = '{value}': {reason}")
            }
            OntologyError::MissingConfig { field } => {
                write!(f, "Missing required config: '{field}'")
            }

            // I/O
            OntologyError::IoError {
                operation,
                path,
                source,
            } => {
                if let Some(p) = path {
                    write!(f, "I/O error during {operation} on {p:?}: {source}")
                } else {
                    write!(f, "I/O error during {operation}: {source}")
                }
            }

            // Generic
            OntologyError::Other { context, source } => {
                if let Some(src) = source {
                    write!(f, "{context}: {src}")
                } else {
                    write!(f, "{context}")
                }
            }
        }
    }
}

impl std::error::Error for OntologyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OntologyError::IoError { source, .. } => Some(source),
            OntologyError::Other {
                source: Some(src), ..
            } => Some(src.as_ref()),
            _ => None,
        }
    }
}

// ============================================================================
// Conversion implementations
// ============================================================================

impl From<io::Error> for OntologyError {
    fn from(err: io::Error) -> Self {
        OntologyError::IoError {
            operation: "unknown".to_string(),
            path: None,
            source: err,
        }
    }
}

impl From<serde_json::Error> for OntologyError {
    fn from(err: serde_json::Error) -> Self {
        OntologyError::JsonSerializationFailed {
            reason: err.to_string(),
        }
    }
}

// ============================================================================
// Helper constructors
// ============================================================================

impl OntologyError {
    /// Create a Turtle parse error
    pub fn parse_failed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        OntologyError::TurtleParseFailed {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization_failed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        OntologyError::SerializationFailed {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an undeclared-class error
    pub fn undeclared_class(class: impl Into<String>) -> Self {
        OntologyError::UndeclaredClass {
            class: class.into(),
        }
    }

    /// Create an I/O error with context
    pub fn io_error(
        operation: impl Into<String>,
        path: Option<PathBuf>,
        source: io::Error,
    ) -> Self {
        OntologyError::IoError {
            operation: operation.into(),
            path,
            source,
        }
    }

    /// Create a config validation error
    pub fn invalid_config(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        OntologyError::InvalidConfig {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a generic error with context
    pub fn other(context: impl Into<String>) -> Self {
        OntologyError::Other {
            context: context.into(),
            source: None,
        }
    }

    /// Whether the pipeline can skip the failing item and continue
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            OntologyError::InputMissing { .. }
                | OntologyError::TurtleParseFailed { .. }
                | OntologyError::UnknownLanguage { .. }
                | OntologyError::MalformedRow { .. }
                | OntologyError::RecordParseFailed { .. }
                | OntologyError::UnknownEntityKind { .. }
        )
    }
}
