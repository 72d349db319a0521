//! Error types for world data loading.

use thiserror::Error;

/// Errors that can occur when loading enemy or encounter data.
#[derive(Debug, Error)]
pub enum DataLoadError {
    /// File could not be found.
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// File could not be read.
    #[error("Failed to read file '{path}': {details}")]
    ReadError { path: String, details: String },

    /// RON parsing failed.
    #[error("Parse error in '{path}': {details}")]
    ParseError { path: String, details: String },

    /// An encounter references an enemy type with no definition.
    #[error("Unknown enemy type '{0}'")]
    UnknownEnemyType(String),
}
