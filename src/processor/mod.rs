//! Processing pipeline with modular stages.
//!
//! Orchestrates the full run: file discovery, concurrent ingestion and
//! union, schema filtering, wide-to-long reshape, date synthesis, then
//! cleaning and sorting. Each stage materialises its whole output before the
//! next one starts.

pub mod clean;
pub mod dates;
pub mod discovery;
pub mod ingest;
pub mod reshape;

#[cfg(test)]
pub mod tests;

use self::{discovery::FileDiscovery, ingest::SourceLoader};

use crate::config::ProcessorConfig;
use crate::error::Result;
use crate::models::{FilteredTable, LongRecord, PipelineStats, RawTable, ValidRecord};
use crate::schema::filter_columns;

use std::time::Instant;
use tracing::{debug, info, warn};

/// Tables produced by one pipeline run
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub filtered: FilteredTable,
    pub long: Vec<LongRecord>,
    pub valid: Vec<ValidRecord>,
    pub stats: PipelineStats,
}

/// Main processor for a directory of monitoring exports
#[derive(Debug)]
pub struct EmissionsProcessor {
    config: ProcessorConfig,
    file_discovery: FileDiscovery,
    source_loader: SourceLoader,
}

impl EmissionsProcessor {
    /// Create a processor, validating the configuration up front
    pub fn new(config: ProcessorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            file_discovery: FileDiscovery::new(&config),
            source_loader: SourceLoader::new(&config),
            config,
        })
    }

    /// Run every stage from discovery to the sorted valid records.
    ///
    /// Fails before producing any table when no source file matches or the
    /// identifier columns are missing.
    pub async fn run(&self) -> Result<PipelineOutput> {
        let start_time = Instant::now();

        let files = self.file_discovery.discover_source_files()?;
        info!(
            "Found {} source files in {}",
            files.len(),
            self.config.data_dir.display()
        );

        let raw = self.source_loader.load(&files).await?;
        let mut output = transform(&raw)?;
        output.stats.files_read = files.len();
        output.stats.processing_time_ms = start_time.elapsed().as_millis();

        debug!("Pipeline finished: {:?}", output.stats);
        Ok(output)
    }
}

/// Run the in-memory stages over an already unified raw table
pub fn transform(raw: &RawTable) -> Result<PipelineOutput> {
    let filtered = filter_columns(raw)?;
    info!(
        "Filtered: {} rows, {} day columns",
        filtered.height(),
        filtered.day_columns.len()
    );

    let long = dates::assign_dates(reshape::melt(&filtered));
    let missing_values = long.iter().filter(|record| record.value.is_none()).count();
    let invalid_dates = long.iter().filter(|record| record.date.is_none()).count();
    info!("Long format: {} records", long.len());
    if missing_values > 0 {
        warn!("{} records have no numeric value", missing_values);
    }
    if invalid_dates > 0 {
        warn!("{} records have no valid calendar date", invalid_dates);
    }

    let valid = clean::clean_and_sort(long.clone());
    info!("Valid records: {}", valid.len());

    let stats = PipelineStats {
        files_read: 0,
        raw_rows: raw.height(),
        filtered_rows: filtered.height(),
        day_columns: filtered.day_columns.len(),
        long_records: long.len(),
        missing_values,
        invalid_dates,
        valid_records: valid.len(),
        processing_time_ms: 0,
    };

    Ok(PipelineOutput {
        filtered,
        long,
        valid,
        stats,
    })
}
