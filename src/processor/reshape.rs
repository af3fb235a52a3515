//! Wide-to-long reshape
//!
//! Every filtered row expands into exactly one [`LongRecord`] per day column,
//! whatever the cell holds, so the output length is always
//! `rows × day_columns`.

use crate::coerce::{parse_month, parse_value, parse_year};
use crate::models::{FilteredTable, LongRecord};
use tracing::debug;

/// Melt the day columns of `table` into long records.
///
/// Records come out row by row, days in column order. Dates are left unset
/// for the date synthesis stage.
pub fn melt(table: &FilteredTable) -> Vec<LongRecord> {
    let mut records = Vec::with_capacity(table.rows.len() * table.day_columns.len());

    for row in &table.rows {
        let year = parse_year(row.year.as_deref());
        let month = parse_month(row.month.as_deref());

        for (column, cell) in table.day_columns.iter().zip(&row.days) {
            records.push(LongRecord {
                station: row.station.clone(),
                pollutant: row.pollutant.clone(),
                year,
                month,
                day: column.day,
                day_label: column.label.clone(),
                value: parse_value(cell.as_deref()),
                date: None,
            });
        }
    }

    debug!(
        "Reshaped {} rows x {} day columns into {} records",
        table.rows.len(),
        table.day_columns.len(),
        records.len()
    );
    records
}
