//! Export of pipeline tables to CSV files and a multi-sheet workbook.
//!
//! Tables are converted to polars DataFrames first (see [`frames`]); CSVs
//! are written with polars' `CsvWriter`, the workbook with `rust_xlsxwriter`.
//! Missing values end up as empty cells in both formats.

pub mod frames;

use crate::config::ProcessorConfig;
use crate::constants::{FILTERED_CSV_NAME, SUMMARY_CSV_NAME, VALID_LONG_CSV_NAME, sheets};
use crate::error::{AirQualityError, Result};
use crate::models::SummaryRow;
use crate::processor::PipelineOutput;

use polars::prelude::*;
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use std::fs::{self, File};
use std::path::PathBuf;
use tracing::{debug, info};

/// Writes the CSV exports and the workbook into one output directory
#[derive(Debug, Clone)]
pub struct ExportWriter {
    output_dir: PathBuf,
    workbook_path: PathBuf,
    sample_limit: usize,
}

impl ExportWriter {
    pub fn new(config: &ProcessorConfig) -> Self {
        Self {
            output_dir: config.output_dir().to_path_buf(),
            workbook_path: config.workbook_path(),
            sample_limit: config.workbook_sample_limit,
        }
    }

    /// Write every export, returning the written paths in write order
    pub fn write_all(&self, output: &PipelineOutput, summary: &[SummaryRow]) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(&self.output_dir)?;

        let mut filtered = frames::filtered_frame(&output.filtered)?;
        let long = frames::long_frame(&output.long)?;
        let mut valid = frames::valid_frame(&output.valid)?;
        let mut summary = frames::summary_frame(summary)?;

        let mut written = vec![
            self.write_csv(&mut filtered, FILTERED_CSV_NAME)?,
            self.write_csv(&mut valid, VALID_LONG_CSV_NAME)?,
            self.write_csv(&mut summary, SUMMARY_CSV_NAME)?,
        ];

        let sample = |df: &DataFrame| df.head(Some(self.sample_limit));
        let workbook_sheets = [
            (sheets::FILTERED, sample(&filtered)),
            (sheets::LONG, sample(&long)),
            (sheets::VALID, sample(&valid)),
            (sheets::SUMMARY, summary),
        ];
        written.push(self.write_workbook(&workbook_sheets)?);

        info!(
            "Exported {} files to {}",
            written.len(),
            self.output_dir.display()
        );
        Ok(written)
    }

    /// Write one frame as comma-separated CSV with a header row
    pub fn write_csv(&self, df: &mut DataFrame, file_name: &str) -> Result<PathBuf> {
        let path = self.output_dir.join(file_name);
        let mut file = File::create(&path).map_err(|e| AirQualityError::Export {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        CsvWriter::new(&mut file)
            .include_header(true)
            .with_separator(b',')
            .finish(df)?;

        debug!("Wrote {} rows to {}", df.height(), path.display());
        Ok(path)
    }

    /// Write named frames as sheets of one workbook
    pub fn write_workbook(&self, frames: &[(&str, DataFrame)]) -> Result<PathBuf> {
        let mut workbook = Workbook::new();
        let header_format = Format::new().set_bold();

        for (name, df) in frames {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(*name)?;
            write_sheet(worksheet, df, &header_format)?;
            debug!("Sheet '{}': {} rows", name, df.height());
        }

        workbook
            .save(&self.workbook_path)
            .map_err(|e| AirQualityError::Export {
                path: self.workbook_path.clone(),
                reason: e.to_string(),
            })?;
        Ok(self.workbook_path.clone())
    }
}

fn is_numeric(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Float64
            | DataType::Float32
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt32
            | DataType::UInt64
    )
}

/// Header row, then one cell per value; nulls are left empty
fn write_sheet(worksheet: &mut Worksheet, df: &DataFrame, header_format: &Format) -> Result<()> {
    for (index, column) in df.get_columns().iter().enumerate() {
        let col = index as u16;
        worksheet.write_string_with_format(0, col, column.name().as_str(), header_format)?;

        let series = column.as_materialized_series();
        if is_numeric(series.dtype()) {
            let values = series.cast(&DataType::Float64)?;
            for (row, value) in values.f64()?.into_iter().enumerate() {
                if let Some(value) = value {
                    worksheet.write_number(row as u32 + 1, col, value)?;
                }
            }
        } else {
            let values = series.cast(&DataType::String)?;
            for (row, value) in values.str()?.into_iter().enumerate() {
                if let Some(value) = value {
                    worksheet.write_string(row as u32 + 1, col, value)?;
                }
            }
        }
    }
    Ok(())
}
