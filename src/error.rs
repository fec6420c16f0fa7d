//! Unified error handling for the dexgraph crate
//!
//! This module provides a unified error type that wraps the domain errors of
//! the merge pipeline together with the I/O and format errors of the outer
//! layers.
//!
//! # Architecture
//!
//! - [`DexgraphErrorTrait`] - Common interface implemented by all error types
//! - [`ErrorCategory`] - Classification of errors for handling strategies
//! - [`Error`] - Unified error enum wrapping all domain-specific errors
//!
//! # Usage
//!
//! ```rust,ignore
//! use dexgraph::error::{DexgraphErrorTrait, Error};
//!
//! fn report(err: &Error) {
//!     if err.is_recoverable() {
//!         tracing::warn!(category = ?err.category(), "{}", err.user_message());
//!     } else {
//!         eprintln!("Fatal error: {err}");
//!     }
//! }
//! ```

use std::io;
use thiserror::Error;

pub use crate::ontology::error::OntologyError;

/// Common trait for all dexgraph error types
pub trait DexgraphErrorTrait: std::error::Error {
    /// Whether the run can skip the failing item and continue
    fn is_recoverable(&self) -> bool;

    /// Short description for user-facing messages
    fn user_message(&self) -> String;

    /// Get the error category for handling strategies
    fn category(&self) -> ErrorCategory;
}

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Missing or unreadable input files
    Input,
    /// Vocabulary and reference resolution errors
    Linking,
    /// Translation table errors
    Translation,
    /// Output and I/O errors
    Storage,
    /// Configuration and validation errors
    Config,
    /// Other/unknown errors
    Other,
}

impl ErrorCategory {
    pub fn description(&self) -> &'static str {
        match self {
            Self::Input => "input error",
            Self::Linking => "linking error",
            Self::Translation => "translation error",
            Self::Storage => "storage error",
            Self::Config => "configuration error",
            Self::Other => "error",
        }
    }
}

impl DexgraphErrorTrait for OntologyError {
    fn is_recoverable(&self) -> bool {
        OntologyError::is_recoverable(self)
    }

    fn user_message(&self) -> String {
        format!("{}: {self}", self.category().description())
    }

    fn category(&self) -> ErrorCategory {
        match self {
            OntologyError::InputMissing { .. }
            | OntologyError::TurtleParseFailed { .. }
            | OntologyError::NoUsableInput { .. }
            | OntologyError::RecordParseFailed { .. } => ErrorCategory::Input,
            OntologyError::UndeclaredClass { .. } | OntologyError::UnknownEntityKind { .. } => {
                ErrorCategory::Linking
            }
            OntologyError::TranslationTableFailed { .. }
            | OntologyError::UnknownLanguage { .. }
            | OntologyError::MalformedRow { .. } => ErrorCategory::Translation,
            OntologyError::SerializationFailed { .. }
            | OntologyError::JsonSerializationFailed { .. }
            | OntologyError::IoError { .. } => ErrorCategory::Storage,
            OntologyError::InvalidConfig { .. } | OntologyError::MissingConfig { .. } => {
                ErrorCategory::Config
            }
            OntologyError::Other { .. } => ErrorCategory::Other,
        }
    }
}

/// Unified error type for the dexgraph crate
#[derive(Error, Debug)]
pub enum Error {
    /// Merge pipeline errors
    #[error("Ontology error: {0}")]
    Ontology(#[from] OntologyError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML configuration parse errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// Command failure outside the categories above
    #[error("{0}")]
    Other(String),
}

impl DexgraphErrorTrait for Error {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Ontology(e) => e.is_recoverable(),
            Self::Io(_) => false,
            Self::Json(_) => false,
            Self::Toml(_) => false,
            Self::Config(_) => false,
            Self::Other(_) => false,
        }
    }

    fn user_message(&self) -> String {
        match self {
            Self::Ontology(e) => e.user_message(),
            Self::Other(message) => message.clone(),
            other => format!("{}: {other}", other.category().description()),
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Ontology(e) => e.category(),
            Self::Io(_) => ErrorCategory::Storage,
            Self::Json(_) => ErrorCategory::Storage,
            Self::Toml(_) | Self::Config(_) => ErrorCategory::Config,
            Self::Other(_) => ErrorCategory::Other,
        }
    }
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

// Commands report through anyhow; recover the typed error underneath any
// added context so the category survives.
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        let err = match err.downcast::<Error>() {
            Ok(e) => return e,
            Err(err) => err,
        };
        let err = match err.downcast::<OntologyError>() {
            Ok(e) => return Self::Ontology(e),
            Err(err) => err,
        };
        let err = match err.downcast::<toml::de::Error>() {
            Ok(e) => return Self::Toml(e),
            Err(err) => err,
        };
        let err = match err.downcast::<serde_json::Error>() {
            Ok(e) => return Self::Json(e),
            Err(err) => err,
        };
        match err.downcast::<io::Error>() {
            Ok(e) => Self::Io(e),
            Err(err) => Self::Other(format!("{err:#}")),
        }
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;
