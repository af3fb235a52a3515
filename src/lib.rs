//! Air-quality export processor
//!
//! Consolidates daily monitoring exports (one row per station, pollutant,
//! year and month with day columns `D01`..`D31`) into a dated long-format
//! table, then summarizes, pivots, exports and charts it.
//!
//! - Discovering and reading every `emisiones-*.csv` file of a directory
//! - Filtering to identifier and day columns and reshaping to long format
//! - Building calendar dates and dropping impossible ones
//! - Summary statistics, monthly pivots and a catalog of identifiers
//! - CSV and workbook exports, terminal charts

pub mod aggregation;
pub mod coerce;
pub mod config;
pub mod constants;
pub mod error;
pub mod export;
pub mod models;
pub mod plot;
pub mod processor;
pub mod schema;

pub mod cli {
    pub mod args;
    pub mod commands;
}

pub use config::ProcessorConfig;
pub use error::{AirQualityError, Result};
pub use models::{
    Catalog, Code, LongRecord, MonthlyByPollutantPivot, MonthlyByStationPivot, PipelineStats,
    SummaryRow, ValidRecord,
};
pub use processor::{EmissionsProcessor, PipelineOutput};
