//! Configuration management and validation.
//!
//! There is no process-wide default input directory: callers build a
//! [`ProcessorConfig`] from an explicit data directory and adjust it with the
//! `with_*` builders before handing it to the processor.

use crate::constants::{
    DEFAULT_DELIMITER, DEFAULT_FILE_EXTENSION, DEFAULT_FILE_PREFIX, DEFAULT_SAMPLE_ROWS,
    DEFAULT_WORKBOOK_NAME, DEFAULT_WORKBOOK_SAMPLE_LIMIT, MAX_CONCURRENT_FILES,
};
use crate::error::{AirQualityError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Configuration for one processing run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessorConfig {
    /// Directory holding the source exports
    pub data_dir: PathBuf,

    /// Required prefix of source file names
    pub file_prefix: String,

    /// Required extension of source file names (including the dot)
    pub file_extension: String,

    /// Field delimiter of the source files
    pub delimiter: u8,

    /// Maximum number of source files read at the same time
    pub max_concurrent_files: usize,

    /// Rows shown for each sample table
    pub sample_rows: usize,

    /// Row cap of the sample sheets in the workbook
    pub workbook_sample_limit: usize,

    /// Directory receiving exports (defaults to `data_dir`)
    pub output_dir: Option<PathBuf>,

    /// Workbook file name inside the output directory
    pub workbook_name: String,

    /// Show a progress bar while reading files
    pub show_progress: bool,
}

impl ProcessorConfig {
    /// Create configuration for the given data directory
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            file_prefix: DEFAULT_FILE_PREFIX.to_string(),
            file_extension: DEFAULT_FILE_EXTENSION.to_string(),
            delimiter: DEFAULT_DELIMITER,
            max_concurrent_files: num_cpus::get().clamp(1, MAX_CONCURRENT_FILES),
            sample_rows: DEFAULT_SAMPLE_ROWS,
            workbook_sample_limit: DEFAULT_WORKBOOK_SAMPLE_LIMIT,
            output_dir: None,
            workbook_name: DEFAULT_WORKBOOK_NAME.to_string(),
            show_progress: true,
        }
    }

    pub fn with_file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.file_prefix = prefix.into();
        self
    }

    pub fn with_file_extension(mut self, extension: impl Into<String>) -> Self {
        self.file_extension = extension.into();
        self
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set maximum concurrent file reads
    pub fn with_max_concurrent_files(mut self, max_files: usize) -> Self {
        self.max_concurrent_files = max_files;
        self
    }

    pub fn with_sample_rows(mut self, rows: usize) -> Self {
        self.sample_rows = rows;
        self
    }

    pub fn with_workbook_sample_limit(mut self, limit: usize) -> Self {
        self.workbook_sample_limit = limit;
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    pub fn with_workbook_name(mut self, name: impl Into<String>) -> Self {
        self.workbook_name = name.into();
        self
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Glob-style description of accepted file names, for messages
    pub fn file_pattern(&self) -> String {
        format!("{}*{}", self.file_prefix, self.file_extension)
    }

    /// Directory receiving exports
    pub fn output_dir(&self) -> &Path {
        self.output_dir.as_deref().unwrap_or(&self.data_dir)
    }

    /// Full path of the workbook
    pub fn workbook_path(&self) -> PathBuf {
        self.output_dir().join(&self.workbook_name)
    }

    /// Check the configuration before any file is touched
    pub fn validate(&self) -> Result<()> {
        if self.file_prefix.is_empty() {
            return Err(AirQualityError::Configuration {
                message: "file prefix must not be empty".to_string(),
            });
        }
        if self.max_concurrent_files == 0 {
            return Err(AirQualityError::Configuration {
                message: "max_concurrent_files must be at least 1".to_string(),
            });
        }
        if !self.delimiter.is_ascii() || self.delimiter == b'\n' || self.delimiter == b'"' {
            return Err(AirQualityError::Configuration {
                message: format!("unsupported delimiter byte: {:#04x}", self.delimiter),
            });
        }
        if self.workbook_name.trim().is_empty() {
            return Err(AirQualityError::Configuration {
                message: "workbook name must not be empty".to_string(),
            });
        }

        debug!(
            "Configuration valid: dir={}, pattern={}, concurrency={}",
            self.data_dir.display(),
            self.file_pattern(),
            self.max_concurrent_files
        );
        Ok(())
    }
}
