//! Schema filtering and day-column discovery.
//!
//! Projects the unified raw table down to the four identifier columns and
//! the day-slot columns, with day slots ordered by their numeric suffix.

use crate::constants::{
    DAY_COLUMN_PATTERN, IDENTIFIER_COLUMNS, MONTH_COLUMN, POLLUTANT_COLUMN, STATION_COLUMN,
    YEAR_COLUMN,
};
use crate::error::{AirQualityError, Result};
use crate::models::{Code, DayColumn, FilteredRow, FilteredTable, RawTable};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

static DAY_COLUMN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(DAY_COLUMN_PATTERN).expect("day column pattern is valid"));

/// Day number of a day-slot column label (`"D07"` → `Some(7)`).
///
/// Only `D` followed by exactly two digits matches; the number is not checked
/// against any month length, so `"D00"` and `"D45"` also parse.
pub fn parse_day_column(label: &str) -> Option<u32> {
    DAY_COLUMN_RE
        .captures(label)
        .and_then(|captures| captures.get(1))
        .and_then(|digits| digits.as_str().parse().ok())
}

/// Day-slot columns of `columns` with their positions, ordered by day number.
///
/// Ties (impossible with unique column names) keep source order.
pub fn discover_day_columns(columns: &[String]) -> Vec<(usize, DayColumn)> {
    let mut day_columns: Vec<(usize, DayColumn)> = columns
        .iter()
        .enumerate()
        .filter_map(|(index, label)| {
            parse_day_column(label).map(|day| {
                (
                    index,
                    DayColumn {
                        label: label.clone(),
                        day,
                    },
                )
            })
        })
        .collect();
    day_columns.sort_by_key(|(_, column)| column.day);
    day_columns
}

/// Identifier columns absent from `columns`, in canonical order
pub fn missing_identifier_columns(columns: &[String]) -> Vec<String> {
    IDENTIFIER_COLUMNS
        .iter()
        .filter(|required| !columns.iter().any(|column| column == *required))
        .map(|required| required.to_string())
        .collect()
}

/// Reduce the raw table to identifiers plus ordered day columns
pub fn filter_columns(raw: &RawTable) -> Result<FilteredTable> {
    let missing = missing_identifier_columns(&raw.columns);
    if !missing.is_empty() {
        return Err(AirQualityError::MissingRequiredColumns { missing });
    }

    let index_of = |name: &str| {
        raw.column_index(name)
            .ok_or_else(|| AirQualityError::MissingRequiredColumns {
                missing: vec![name.to_string()],
            })
    };
    let station_idx = index_of(STATION_COLUMN)?;
    let pollutant_idx = index_of(POLLUTANT_COLUMN)?;
    let year_idx = index_of(YEAR_COLUMN)?;
    let month_idx = index_of(MONTH_COLUMN)?;

    let day_columns = discover_day_columns(&raw.columns);
    debug!(
        "Discovered {} day columns: {:?}",
        day_columns.len(),
        day_columns
            .iter()
            .map(|(_, column)| column.label.as_str())
            .collect::<Vec<_>>()
    );

    let rows = raw
        .rows
        .iter()
        .map(|row| {
            let cell = |index: usize| row.cells.get(index).cloned().flatten();
            FilteredRow {
                station: Code::new(cell(station_idx).as_deref().unwrap_or_default()),
                pollutant: Code::new(cell(pollutant_idx).as_deref().unwrap_or_default()),
                year: cell(year_idx),
                month: cell(month_idx),
                days: day_columns.iter().map(|(index, _)| cell(*index)).collect(),
            }
        })
        .collect();

    Ok(FilteredTable {
        day_columns: day_columns.into_iter().map(|(_, column)| column).collect(),
        rows,
    })
}
