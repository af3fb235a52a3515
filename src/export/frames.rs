//! Conversion of pipeline tables into polars DataFrames.
//!
//! Column order follows the long-format layout used by every export:
//! identifiers, `DIA_STR`, `VALOR`, `DIA`, then `FECHA`. Missing values
//! become nulls; dates are written as ISO `YYYY-MM-DD` strings.

use crate::constants::{
    DATE_COLUMN, DAY_COLUMN, DAY_LABEL_COLUMN, MONTH_COLUMN, POLLUTANT_COLUMN, STATION_COLUMN,
    SUMMARY_COLUMNS, VALUE_COLUMN, YEAR_COLUMN,
};
use crate::error::Result;
use crate::models::{Code, FilteredTable, LongRecord, SummaryRow, ValidRecord};
use polars::prelude::*;

fn code_column<'a>(name: &str, codes: impl Iterator<Item = &'a Code>) -> Column {
    Column::new(
        name.into(),
        codes.map(Code::to_string).collect::<Vec<String>>(),
    )
}

/// Identifier columns as read plus one text column per day slot
pub fn filtered_frame(table: &FilteredTable) -> Result<DataFrame> {
    let rows = &table.rows;
    let mut columns = vec![
        code_column(STATION_COLUMN, rows.iter().map(|row| &row.station)),
        code_column(POLLUTANT_COLUMN, rows.iter().map(|row| &row.pollutant)),
        Column::new(
            YEAR_COLUMN.into(),
            rows.iter().map(|row| row.year.clone()).collect::<Vec<_>>(),
        ),
        Column::new(
            MONTH_COLUMN.into(),
            rows.iter().map(|row| row.month.clone()).collect::<Vec<_>>(),
        ),
    ];

    for (index, day_column) in table.day_columns.iter().enumerate() {
        let cells: Vec<Option<String>> = rows
            .iter()
            .map(|row| row.days.get(index).cloned().flatten())
            .collect();
        columns.push(Column::new(day_column.label.as_str().into(), cells));
    }

    Ok(DataFrame::new(columns)?)
}

/// Borrowed view of one long-format row, shared by both long layouts
struct LongRow<'a> {
    station: &'a Code,
    pollutant: &'a Code,
    year: Option<i32>,
    month: Option<u32>,
    day_label: &'a str,
    value: Option<f64>,
    day: u32,
    date: Option<String>,
}

impl<'a> From<&'a LongRecord> for LongRow<'a> {
    fn from(r: &'a LongRecord) -> Self {
        Self {
            station: &r.station,
            pollutant: &r.pollutant,
            year: r.year,
            month: r.month,
            day_label: &r.day_label,
            value: r.value,
            day: r.day,
            date: r.date.map(|date| date.to_string()),
        }
    }
}

impl<'a> From<&'a ValidRecord> for LongRow<'a> {
    fn from(r: &'a ValidRecord) -> Self {
        Self {
            station: &r.station,
            pollutant: &r.pollutant,
            year: Some(r.year),
            month: Some(r.month),
            day_label: &r.day_label,
            value: r.value,
            day: r.day,
            date: Some(r.date.to_string()),
        }
    }
}

fn long_layout(rows: &[LongRow<'_>]) -> Result<DataFrame> {
    let df = DataFrame::new(vec![
        code_column(STATION_COLUMN, rows.iter().map(|r| r.station)),
        code_column(POLLUTANT_COLUMN, rows.iter().map(|r| r.pollutant)),
        Column::new(
            YEAR_COLUMN.into(),
            rows.iter().map(|r| r.year).collect::<Vec<_>>(),
        ),
        Column::new(
            MONTH_COLUMN.into(),
            rows.iter().map(|r| r.month).collect::<Vec<_>>(),
        ),
        Column::new(
            DAY_LABEL_COLUMN.into(),
            rows.iter().map(|r| r.day_label).collect::<Vec<_>>(),
        ),
        Column::new(
            VALUE_COLUMN.into(),
            rows.iter().map(|r| r.value).collect::<Vec<_>>(),
        ),
        Column::new(
            DAY_COLUMN.into(),
            rows.iter().map(|r| r.day).collect::<Vec<_>>(),
        ),
        Column::new(
            DATE_COLUMN.into(),
            rows.iter().map(|r| r.date.clone()).collect::<Vec<_>>(),
        ),
    ])?;
    Ok(df)
}

/// Every reshaped record, dated or not
pub fn long_frame(records: &[LongRecord]) -> Result<DataFrame> {
    long_layout(&records.iter().map(LongRow::from).collect::<Vec<_>>())
}

/// Cleaned and sorted records
pub fn valid_frame(records: &[ValidRecord]) -> Result<DataFrame> {
    long_layout(&records.iter().map(LongRow::from).collect::<Vec<_>>())
}

/// Per station/pollutant statistics
pub fn summary_frame(rows: &[SummaryRow]) -> Result<DataFrame> {
    let [count, mean, std_dev, min, max] = SUMMARY_COLUMNS;
    let stat = |name: &str, field: fn(&SummaryRow) -> Option<f64>| {
        Column::new(name.into(), rows.iter().map(field).collect::<Vec<_>>())
    };

    let df = DataFrame::new(vec![
        code_column(STATION_COLUMN, rows.iter().map(|r| &r.station)),
        code_column(POLLUTANT_COLUMN, rows.iter().map(|r| &r.pollutant)),
        Column::new(
            count.into(),
            rows.iter().map(|r| r.count as u64).collect::<Vec<_>>(),
        ),
        stat(mean, |r| r.mean),
        stat(std_dev, |r| r.std_dev),
        stat(min, |r| r.min),
        stat(max, |r| r.max),
    ])?;
    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DayColumn, FilteredRow};
    use chrono::NaiveDate;

    fn valid(day: u32, value: Option<f64>) -> ValidRecord {
        ValidRecord {
            station: Code::new("4"),
            pollutant: Code::new("1"),
            year: 2016,
            month: 2,
            day,
            day_label: format!("D{:02}", day),
            value,
            date: NaiveDate::from_ymd_opt(2016, 2, day).unwrap(),
        }
    }

    #[test]
    fn test_valid_frame_layout() {
        let df = valid_frame(&[valid(1, Some(2.5)), valid(2, None)]).unwrap();

        let names: Vec<&str> = df.get_column_names().iter().map(|n| n.as_str()).collect();
        assert_eq!(
            names,
            vec!["ESTACION", "MAGNITUD", "ANO", "MES", "DIA_STR", "VALOR", "DIA", "FECHA"]
        );
        assert_eq!(df.height(), 2);

        let values = df.column(VALUE_COLUMN).unwrap();
        assert_eq!(values.null_count(), 1);

        let dates = df
            .column(DATE_COLUMN)
            .unwrap()
            .as_materialized_series()
            .str()
            .unwrap()
            .clone();
        assert_eq!(dates.get(0), Some("2016-02-01"));
    }

    #[test]
    fn test_long_frame_keeps_undated_rows() {
        let record = LongRecord {
            station: Code::new("4"),
            pollutant: Code::new("1"),
            year: Some(2016),
            month: Some(2),
            day: 30,
            day_label: "D30".to_string(),
            value: Some(1.0),
            date: None,
        };
        let df = long_frame(&[record]).unwrap();
        assert_eq!(df.height(), 1);
        assert_eq!(df.column(DATE_COLUMN).unwrap().null_count(), 1);
    }

    #[test]
    fn test_long_and_valid_frames_share_layout() {
        let record = valid(3, Some(4.5));
        let long = LongRecord {
            station: record.station.clone(),
            pollutant: record.pollutant.clone(),
            year: Some(record.year),
            month: Some(record.month),
            day: record.day,
            day_label: record.day_label.clone(),
            value: record.value,
            date: Some(record.date),
        };

        let from_valid = valid_frame(&[record]).unwrap();
        let from_long = long_frame(&[long]).unwrap();
        assert_eq!(from_valid.schema(), from_long.schema());
        assert!(from_valid.equals_missing(&from_long));
    }

    #[test]
    fn test_filtered_frame_day_columns_in_order() {
        let table = FilteredTable {
            day_columns: vec![
                DayColumn {
                    label: "D01".to_string(),
                    day: 1,
                },
                DayColumn {
                    label: "D02".to_string(),
                    day: 2,
                },
            ],
            rows: vec![FilteredRow {
                station: Code::new("4"),
                pollutant: Code::new("1"),
                year: Some("2016".to_string()),
                month: None,
                days: vec![Some("7".to_string()), None],
            }],
        };
        let df = filtered_frame(&table).unwrap();

        let names: Vec<&str> = df.get_column_names().iter().map(|n| n.as_str()).collect();
        assert_eq!(names, vec!["ESTACION", "MAGNITUD", "ANO", "MES", "D01", "D02"]);
        assert_eq!(df.column("MES").unwrap().null_count(), 1);
        assert_eq!(df.column("D02").unwrap().null_count(), 1);
    }

    #[test]
    fn test_summary_frame_columns() {
        let row = SummaryRow {
            station: Code::new("4"),
            pollutant: Code::new("1"),
            count: 0,
            mean: None,
            std_dev: None,
            min: None,
            max: None,
        };
        let df = summary_frame(&[row]).unwrap();
        let names: Vec<&str> = df.get_column_names().iter().map(|n| n.as_str()).collect();
        assert_eq!(
            names,
            vec!["ESTACION", "MAGNITUD", "count", "promedio", "desv_std", "min", "max"]
        );
        assert_eq!(df.column("promedio").unwrap().null_count(), 1);
    }
}
