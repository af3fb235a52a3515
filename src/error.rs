//! Error handling for air-quality export processing.
//!
//! Only structural problems are errors: missing inputs, missing identifier
//! columns, unreadable files and failed exports. Data-quality issues inside
//! the tables (bad numbers, impossible dates) never surface here; they become
//! missing values in the records instead.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AirQualityError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Workbook error: {0}")]
    Workbook(#[from] rust_xlsxwriter::XlsxError),

    #[error("No input files matching '{pattern}' found in: {dir}")]
    NoInputFound { dir: PathBuf, pattern: String },

    #[error("Missing required columns: {}", missing.join(", "))]
    MissingRequiredColumns { missing: Vec<String> },

    #[error("Invalid source file: {path} - {reason}")]
    InvalidFormat { path: PathBuf, reason: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Export failed for {path}: {reason}")]
    Export { path: PathBuf, reason: String },

    #[error("Background read task failed: {reason}")]
    TaskJoin { reason: String },
}

pub type Result<T> = std::result::Result<T, AirQualityError>;
