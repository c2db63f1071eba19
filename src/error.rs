//! Error types for Rampart.
//!
//! This module defines the error hierarchy using `thiserror`. Every variant
//! records the Rampart source location that raised it (`src_path` and
//! `src_line`), filled in automatically by the [`err!`](crate::err) macro.
//!
//! # Error Categories
//!
//! - **IO errors**: file system operations
//! - **Parse errors**: HCL and CloudFormation syntax failures
//! - **Config errors**: invalid configuration files
//! - **Registry errors**: duplicate or malformed rule definitions
//! - **Report errors**: serialization failures
//!
//! Only IO, config and registry errors ever reach the caller of a scan.
//! Parse errors are turned into diagnostics by the scanner so that sibling
//! documents keep processing.
//!
//! # Example
//!
//! ```rust
//! use rampart::error::{RampartError, Result};
//!
//! fn read_template(path: &str) -> Result<String> {
//!     std::fs::read_to_string(path)
//!         .map_err(|e| RampartError::io(path, e, file!(), line!()))
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Macro to create errors with automatic source location tracking.
///
/// Usage:
/// ```ignore
/// return Err(err!(DuplicateRule { id: "AVD-AWS-0081".to_string() }));
/// ```
#[macro_export]
macro_rules! err {
    ($variant:ident { $($field:ident: $value:expr),* $(,)? }) => {
        $crate::error::RampartError::$variant {
            $($field: $value,)*
            src_path: file!(),
            src_line: line!(),
        }
    };
}

/// A specialized Result type for Rampart operations.
pub type Result<T> = std::result::Result<T, RampartError>;

/// The main error type for Rampart.
#[derive(Error, Debug)]
pub enum RampartError {
    // =========================================================================
    // I/O and File System Errors
    // =========================================================================
    /// I/O error with path context.
    #[error("I/O error at '{path}' ({src_path}:{src_line}): {source}")]
    Io {
        /// The path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
        /// Source file path
        src_path: &'static str,
        /// Source line number
        src_line: u32,
    },

    /// Directory not found.
    #[error("Directory not found: {path} ({src_path}:{src_line})")]
    DirectoryNotFound {
        /// The missing directory path
        path: PathBuf,
        /// Source file path
        src_path: &'static str,
        /// Source line number
        src_line: u32,
    },

    // =========================================================================
    // Parsing Errors
    // =========================================================================
    /// HCL parsing error.
    #[error("Failed to parse HCL in '{file}' ({src_path}:{src_line}): {message}")]
    HclParse {
        /// The file being parsed
        file: PathBuf,
        /// Error message
        message: String,
        /// Source file path
        src_path: &'static str,
        /// Source line number
        src_line: u32,
    },

    /// CloudFormation template (YAML or JSON) parsing error.
    #[error("Failed to parse template '{file}' ({src_path}:{src_line}): {message}")]
    TemplateParse {
        /// The template being parsed
        file: PathBuf,
        /// Error message
        message: String,
        /// Line number (if available)
        line: Option<usize>,
        /// Source file path
        src_path: &'static str,
        /// Source line number
        src_line: u32,
    },

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Configuration parsing error.
    #[error("Failed to parse configuration ({src_path}:{src_line}): {message}")]
    ConfigParse {
        /// Error message
        message: String,
        /// The underlying error (if any)
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        /// Source file path
        src_path: &'static str,
        /// Source line number
        src_line: u32,
    },

    /// Invalid configuration value.
    #[error("Invalid configuration value for '{key}' ({src_path}:{src_line}): {message}")]
    ConfigValue {
        /// The configuration key
        key: String,
        /// Error message
        message: String,
        /// Source file path
        src_path: &'static str,
        /// Source line number
        src_line: u32,
    },

    // =========================================================================
    // Rule Registry Errors
    // =========================================================================
    /// A rule with the same identifier is already registered.
    #[error("Rule '{id}' is already registered ({src_path}:{src_line})")]
    DuplicateRule {
        /// The conflicting rule identifier
        id: String,
        /// Source file path
        src_path: &'static str,
        /// Source line number
        src_line: u32,
    },

    /// A rule definition is missing required metadata.
    #[error("Invalid rule definition '{id}' ({src_path}:{src_line}): {message}")]
    InvalidRule {
        /// The rule identifier
        id: String,
        /// Error message
        message: String,
        /// Source file path
        src_path: &'static str,
        /// Source line number
        src_line: u32,
    },

    // =========================================================================
    // Report Errors
    // =========================================================================
    /// Report generation error.
    #[error("Failed to generate report ({src_path}:{src_line}): {message}")]
    ReportGeneration {
        /// Error message
        message: String,
        /// Source file path
        src_path: &'static str,
        /// Source line number
        src_line: u32,
    },

    // =========================================================================
    // Generic Errors
    // =========================================================================
    /// Multiple errors occurred.
    #[error("Multiple errors occurred ({count} total)")]
    Multiple {
        /// Number of errors
        count: usize,
        /// The individual errors
        errors: Vec<RampartError>,
    },
}

impl RampartError {
    /// Creates an `Io` error.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error, src_path: &'static str, src_line: u32) -> Self {
        Self::Io { path: path.into(), source, src_path, src_line }
    }

    /// Creates a `ConfigParse` error.
    #[must_use]
    pub fn config_parse(message: String, source: Option<Box<dyn std::error::Error + Send + Sync>>, src_path: &'static str, src_line: u32) -> Self {
        Self::ConfigParse { message, source, src_path, src_line }
    }

    /// The file this error is about, when there is one.
    #[must_use]
    pub fn file(&self) -> Option<&std::path::Path> {
        match self {
            Self::Io { path, .. } | Self::DirectoryNotFound { path, .. } => Some(path),
            Self::HclParse { file, .. } | Self::TemplateParse { file, .. } => Some(file),
            _ => None,
        }
    }

    /// Returns the appropriate exit code for the error.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Io { source, .. } if source.kind() == std::io::ErrorKind::PermissionDenied => 13,
            Self::DirectoryNotFound { .. } => 15,
            Self::ConfigParse { .. } => 18,
            Self::ConfigValue { .. } => 19,
            Self::DuplicateRule { .. } | Self::InvalidRule { .. } => 20,
            Self::Multiple { .. } => 21,
            _ => 1,
        }
    }

    /// Consolidates multiple errors into a single `RampartError::Multiple` if there's more than one.
    /// Otherwise, returns the single error or `Ok(())` if no errors.
    pub fn collect(mut errors: Vec<Self>) -> Result<()> {
        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            count => Err(Self::Multiple { count, errors }),
        }
    }
}

/// Extension trait for `Result` to add context to errors.
pub trait ResultExt<T, E> {
    /// Adds a file path context to an I/O error.
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T, E> ResultExt<T, E> for std::result::Result<T, E>
where
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|e| RampartError::Io {
            path: path.into(),
            source: *e.into().downcast::<std::io::Error>().unwrap_or_else(|e| {
                Box::new(std::io::Error::new(std::io::ErrorKind::Other, e))
            }),
            src_path: file!(),
            src_line: line!(),
        })
    }
}

impl From<std::io::Error> for RampartError {
    fn from(source: std::io::Error) -> Self {
        // Prefer RampartError::io(path, ..) when the path is known
        Self::Io {
            path: PathBuf::new(),
            source,
            src_path: file!(),
            src_line: line!(),
        }
    }
}

impl From<serde_json::Error> for RampartError {
    fn from(source: serde_json::Error) -> Self {
        Self::ReportGeneration {
            message: format!("JSON serialization error: {source}"),
            src_path: file!(),
            src_line: line!(),
        }
    }
}

/// A utility for collecting multiple errors during parsing or registration.
#[derive(Debug, Default)]
pub struct ErrorCollector {
    errors: Vec<RampartError>,
}

impl ErrorCollector {
    /// Create a new error collector.
    #[must_use]
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Add an error to the collection.
    pub fn add(&mut self, error: RampartError) {
        self.errors.push(error);
    }

    /// Get the number of collected errors.
    #[must_use]
    pub fn count(&self) -> usize {
        self.errors.len()
    }

    /// Check if there are any errors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Convert to a Result, returning Multiple error if there are any errors.
    pub fn into_result(self) -> Result<()> {
        RampartError::collect(self.errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_err_macro_records_location() {
        let error = crate::err!(DuplicateRule { id: "AVD-AWS-0081".to_string() });
        match error {
            RampartError::DuplicateRule { id, src_path, src_line } => {
                assert_eq!(id, "AVD-AWS-0081");
                assert!(src_path.ends_with("error.rs"));
                assert!(src_line > 0);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_collect_single_and_multiple() {
        let duplicate = |id: &str| crate::err!(DuplicateRule { id: id.to_string() });
        assert!(RampartError::collect(Vec::new()).is_ok());

        let single = RampartError::collect(vec![duplicate("a")]);
        assert!(matches!(single, Err(RampartError::DuplicateRule { .. })));

        let multiple = RampartError::collect(vec![duplicate("a"), duplicate("b")]);
        assert!(matches!(multiple, Err(RampartError::Multiple { count: 2, .. })));
    }

    #[test]
    fn test_file_and_exit_code() {
        let error = crate::err!(HclParse {
            file: PathBuf::from("main.tf"),
            message: "unexpected token".to_string(),
        });
        assert_eq!(error.file(), Some(std::path::Path::new("main.tf")));
        assert_eq!(error.exit_code(), 1);

        let error = crate::err!(DuplicateRule { id: "x".to_string() });
        assert_eq!(error.file(), None);
        assert_eq!(error.exit_code(), 20);
    }

    #[test]
    fn test_with_path() {
        let result: std::result::Result<(), std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        match result.with_path("rampart.yaml") {
            Err(RampartError::Io { path, source, .. }) => {
                assert_eq!(path, PathBuf::from("rampart.yaml"));
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_error_collector() {
        let mut collector = ErrorCollector::new();
        assert!(collector.is_empty());
        collector.add(crate::err!(InvalidRule {
            id: String::new(),
            message: "missing id".to_string(),
        }));
        assert_eq!(collector.count(), 1);
        assert!(collector.into_result().is_err());
    }
}
