//! Source file discovery
//!
//! Finds the export files of a data directory by name pattern and returns
//! them in sorted file-name order, which fixes the row order of the union.

use crate::config::ProcessorConfig;
use crate::error::{AirQualityError, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// File discovery component for export directories
#[derive(Debug)]
pub struct FileDiscovery {
    data_dir: PathBuf,
    file_prefix: String,
    file_extension: String,
}

impl FileDiscovery {
    /// Create a discovery instance from the run configuration
    pub fn new(config: &ProcessorConfig) -> Self {
        Self {
            data_dir: config.data_dir.clone(),
            file_prefix: config.file_prefix.clone(),
            file_extension: config.file_extension.clone(),
        }
    }

    fn pattern(&self) -> String {
        format!("{}*{}", self.file_prefix, self.file_extension)
    }

    /// Discover all matching files, sorted by file name.
    ///
    /// Fails with `NoInputFound` when the directory is missing or nothing
    /// matches.
    pub fn discover_source_files(&self) -> Result<Vec<PathBuf>> {
        if !self.data_dir.is_dir() {
            return Err(self.no_input());
        }

        let pattern = format!(
            "{}/{}*{}",
            glob::Pattern::escape(&self.data_dir.to_string_lossy()),
            glob::Pattern::escape(&self.file_prefix),
            glob::Pattern::escape(&self.file_extension)
        );
        debug!("Searching for source files with pattern: {}", pattern);

        let entries = glob::glob(&pattern).map_err(|e| AirQualityError::Configuration {
            message: format!("Invalid file pattern '{}': {}", pattern, e),
        })?;

        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .filter(|path| path.is_file() && self.matches(path))
            .collect();
        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

        if files.is_empty() {
            return Err(self.no_input());
        }

        debug!(
            "Found {} source files in {}",
            files.len(),
            self.data_dir.display()
        );
        Ok(files)
    }

    /// Check the file name itself, independent of the glob match
    fn matches(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| {
                name.starts_with(&self.file_prefix) && name.ends_with(&self.file_extension)
            })
    }

    fn no_input(&self) -> AirQualityError {
        AirQualityError::NoInputFound {
            dir: self.data_dir.clone(),
            pattern: self.pattern(),
        }
    }
}
