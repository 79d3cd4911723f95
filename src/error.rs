//! Error types for rust-aseddl

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading models or generating DDL
#[derive(Error, Debug)]
pub enum AseDdlError {
    #[error("Unsupported change: {kind}")]
    UnsupportedChange { kind: String },

    #[error("Table not found in model: {table}")]
    MissingTable { table: String },

    #[error("Column {column} not found in table {table}")]
    MissingColumn { table: String, column: String },

    #[error("No native ASE type for column {column} of type {type_code}")]
    UnmappedType { column: String, type_code: String },

    #[error("Failed to read model file: {path}")]
    ModelReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse model file: {path}")]
    ModelParseError {
        path: PathBuf,
        #[source]
        source: roxmltree::Error,
    },

    #[error("Invalid model file format: {message}")]
    InvalidModelFormat { message: String },

    #[error("Failed to write model: {message}")]
    ModelWriteError { message: String },
}

/// Result alias for DDL generation
pub type Result<T> = std::result::Result<T, AseDdlError>;
