//! Source file ingestion and union
//!
//! Reads every discovered export with polars' CSV reader (all columns as
//! text), tags rows with their file name and concatenates the files into one
//! [`RawTable`]. Files are read concurrently on the blocking pool, but the
//! union always follows the sorted file order handed in by discovery.

use crate::config::ProcessorConfig;
use crate::error::{AirQualityError, Result};
use crate::models::{RawRow, RawTable};

use futures::stream::{self, StreamExt, TryStreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use polars::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::task;
use tracing::{debug, info};

/// Cells of one source file, before the union
#[derive(Debug, Clone, PartialEq)]
pub struct SourceTable {
    pub file_name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl SourceTable {
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.columns.len())
    }
}

/// Loader for a set of same-shaped export files
#[derive(Debug)]
pub struct SourceLoader {
    delimiter: u8,
    max_concurrent_files: usize,
    show_progress: bool,
}

impl SourceLoader {
    pub fn new(config: &ProcessorConfig) -> Self {
        Self {
            delimiter: config.delimiter,
            max_concurrent_files: config.max_concurrent_files.max(1),
            show_progress: config.show_progress,
        }
    }

    /// Read `files` concurrently and union them in the given order
    pub async fn load(&self, files: &[PathBuf]) -> Result<RawTable> {
        let pb = if self.show_progress {
            ProgressBar::new(files.len() as u64)
        } else {
            ProgressBar::hidden()
        };
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        pb.set_message("Reading source files");

        let concurrent_limit = self.max_concurrent_files.min(files.len()).max(1);
        debug!(
            "Reading {} files with concurrency {}",
            files.len(),
            concurrent_limit
        );

        let delimiter = self.delimiter;
        let tables: Vec<SourceTable> = stream::iter(files.iter().cloned())
            .map(|path| {
                let pb = pb.clone();
                async move {
                    let table = task::spawn_blocking(move || read_source_table(&path, delimiter))
                        .await
                        .map_err(|e| AirQualityError::TaskJoin {
                            reason: e.to_string(),
                        })??;
                    pb.inc(1);
                    Ok::<SourceTable, AirQualityError>(table)
                }
            })
            // `buffered` yields in input order, unlike `buffer_unordered`
            .buffered(concurrent_limit)
            .try_collect()
            .await?;

        pb.finish_and_clear();

        for table in &tables {
            let (rows, columns) = table.shape();
            info!("Read {}: {} rows x {} columns", table.file_name, rows, columns);
        }

        let raw = union_tables(tables);
        let (rows, columns) = raw.shape();
        info!("Concatenated: {} rows x {} columns", rows, columns);
        Ok(raw)
    }
}

/// Read one delimited file with every column as text.
///
/// Header names are trimmed (and a UTF-8 byte order mark removed); blank
/// cells become `None`. A row with more fields than the header makes the
/// whole file invalid.
pub fn read_source_table(path: &Path, delimiter: u8) -> Result<SourceTable> {
    let invalid = |reason: String| AirQualityError::InvalidFormat {
        path: path.to_path_buf(),
        reason,
    };

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .with_parse_options(CsvParseOptions::default().with_separator(delimiter))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|e| invalid(e.to_string()))?
        .finish()
        .map_err(|e| invalid(e.to_string()))?;

    let columns: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.trim_start_matches('\u{feff}').trim().to_string())
        .collect();
    if columns.is_empty() {
        return Err(invalid("no header row".to_string()));
    }

    let mut rows: Vec<Vec<Option<String>>> = vec![vec![None; columns.len()]; df.height()];
    for (column_index, column) in df.get_columns().iter().enumerate() {
        let series = column.as_materialized_series().cast(&DataType::String)?;
        for (row_index, value) in series.str()?.into_iter().enumerate() {
            rows[row_index][column_index] = value
                .map(str::trim)
                .filter(|text| !text.is_empty())
                .map(str::to_string);
        }
    }

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    debug!("Parsed {} ({} rows)", file_name, rows.len());
    Ok(SourceTable {
        file_name,
        columns,
        rows,
    })
}

/// Concatenate tables in order.
///
/// The unified column list is the union of all headers in first-encounter
/// order; cells of columns a file lacks are `None`.
pub fn union_tables(tables: Vec<SourceTable>) -> RawTable {
    let mut columns: Vec<String> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    for table in &tables {
        for column in &table.columns {
            if !positions.contains_key(column) {
                positions.insert(column.clone(), columns.len());
                columns.push(column.clone());
            }
        }
    }

    let total_rows = tables.iter().map(|table| table.rows.len()).sum();
    let mut rows = Vec::with_capacity(total_rows);
    for table in tables {
        let mapping: Vec<usize> = table
            .columns
            .iter()
            .map(|column| positions[column])
            .collect();
        for source_row in table.rows {
            let mut cells = vec![None; columns.len()];
            for (cell, target) in source_row.into_iter().zip(&mapping) {
                cells[*target] = cell;
            }
            rows.push(RawRow {
                source_file: table.file_name.clone(),
                cells,
            });
        }
    }

    RawTable { columns, rows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn source(file_name: &str, columns: &[&str], rows: &[&[&str]]) -> SourceTable {
        SourceTable {
            file_name: file_name.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: rows
                .iter()
                .map(|row| row.iter().map(|cell| Some(cell.to_string())).collect())
                .collect(),
        }
    }

    #[test]
    fn test_read_semicolon_file_as_text() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("emisiones-2016.csv");
        fs::write(
            &path,
            "ESTACION;MAGNITUD;ANO;MES;D01;D02\n4;1;2016;1;12;N/D\n4;1;2016;2; ;7\n",
        )
        .unwrap();

        let table = read_source_table(&path, b';').unwrap();
        assert_eq!(table.file_name, "emisiones-2016.csv");
        assert_eq!(table.columns, vec!["ESTACION", "MAGNITUD", "ANO", "MES", "D01", "D02"]);
        assert_eq!(table.shape(), (2, 6));
        assert_eq!(table.rows[0][4].as_deref(), Some("12"));
        assert_eq!(table.rows[0][5].as_deref(), Some("N/D"));
        assert_eq!(table.rows[1][4], None);
    }

    #[test]
    fn test_read_empty_file_is_invalid_format() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("emisiones-empty.csv");
        fs::write(&path, "").unwrap();

        assert!(matches!(
            read_source_table(&path, b';'),
            Err(AirQualityError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_read_row_wider_than_header_is_invalid_format() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("emisiones-ragged.csv");
        fs::write(
            &path,
            "ESTACION;MAGNITUD;ANO;MES;D01\n4;1;2016;1;5\n4;1;2016;2;7;99\n",
        )
        .unwrap();

        match read_source_table(&path, b';') {
            Err(AirQualityError::InvalidFormat { path: reported, .. }) => {
                assert_eq!(reported, path)
            }
            other => panic!("expected InvalidFormat, got {:?}", other),
        }
    }

    #[test]
    fn test_union_preserves_file_then_row_order() {
        let first = source("a.csv", &["ESTACION", "D01"], &[&["1", "10"], &["2", "20"]]);
        let second = source("b.csv", &["ESTACION", "D01"], &[&["3", "30"]]);

        let raw = union_tables(vec![first, second]);
        assert_eq!(raw.columns, vec!["ESTACION", "D01"]);
        let stations: Vec<&str> = raw
            .rows
            .iter()
            .map(|row| row.cells[0].as_deref().unwrap())
            .collect();
        assert_eq!(stations, vec!["1", "2", "3"]);
        assert_eq!(raw.rows[2].source_file, "b.csv");
    }

    #[test]
    fn test_union_aligns_differing_columns() {
        let first = source("a.csv", &["ESTACION", "D01"], &[&["1", "10"]]);
        let second = source("b.csv", &["D02", "ESTACION"], &[&["22", "2"]]);

        let raw = union_tables(vec![first, second]);
        assert_eq!(raw.columns, vec!["ESTACION", "D01", "D02"]);
        assert_eq!(
            raw.rows[0].cells,
            vec![Some("1".to_string()), Some("10".to_string()), None]
        );
        assert_eq!(
            raw.rows[1].cells,
            vec![Some("2".to_string()), None, Some("22".to_string())]
        );
    }

    #[tokio::test]
    async fn test_load_keeps_sorted_order_under_concurrency() {
        let temp_dir = TempDir::new().unwrap();
        let mut files = Vec::new();
        for year in 2010..2020 {
            let path = temp_dir.path().join(format!("emisiones-{}.csv", year));
            fs::write(&path, format!("ESTACION;MAGNITUD;ANO;MES;D01\n4;1;{};1;5\n", year))
                .unwrap();
            files.push(path);
        }

        let config = ProcessorConfig::new(temp_dir.path()).with_max_concurrent_files(4);
        let raw = SourceLoader::new(&config).load(&files).await.unwrap();

        let years: Vec<&str> = raw
            .rows
            .iter()
            .map(|row| row.cells[2].as_deref().unwrap())
            .collect();
        let expected: Vec<String> = (2010..2020).map(|year| year.to_string()).collect();
        assert_eq!(years, expected);
    }
}
