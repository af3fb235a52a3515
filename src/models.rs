//! Core data structures for the processing pipeline.
//!
//! Each stage has its own record type with explicit `Option` semantics for
//! every value that may be missing: [`RawTable`] from ingestion,
//! [`FilteredTable`] from the schema filter, [`LongRecord`] from reshape and
//! date synthesis, and [`ValidRecord`] after cleaning. Aggregations produce
//! [`SummaryRow`], [`PivotTable`] and [`Catalog`] values.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Station or pollutant identifier.
///
/// Holds the trimmed source text. Integer codes are stored in canonical form
/// (`"004"` becomes `"4"`) and order numerically; textual codes order after
/// all numeric ones, lexicographically. Deserialization goes through
/// [`Code::new`], so equality and ordering always agree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String")]
pub struct Code(String);

impl Code {
    pub fn new(text: &str) -> Self {
        let trimmed = text.trim();
        match trimmed.parse::<i64>() {
            Ok(number) => Self(number.to_string()),
            Err(_) => Self(trimmed.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric value of the code, when it is an integer
    pub fn as_number(&self) -> Option<i64> {
        self.0.parse().ok()
    }

    /// Blank codes come from empty identifier cells; aggregations skip them
    pub fn is_blank(&self) -> bool {
        self.0.is_empty()
    }
}

impl Ord for Code {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.as_number(), other.as_number()) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for Code {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Code {
    fn from(text: String) -> Self {
        Self::new(&text)
    }
}

/// One source row with its cells aligned to [`RawTable::columns`]
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    /// File name the row was read from
    pub source_file: String,
    /// Cell text; `None` for empty cells and columns absent from the file
    pub cells: Vec<Option<String>>,
}

/// Union of every source file, in sorted file order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl RawTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Shape as (rows, columns), counting the provenance tag as a column
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.columns.len() + 1)
    }
}

/// A day-slot column such as `D07`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DayColumn {
    pub label: String,
    pub day: u32,
}

/// Source row reduced to identifiers and day slots
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredRow {
    pub station: Code,
    pub pollutant: Code,
    /// Year cell as read, coerced later
    pub year: Option<String>,
    /// Month cell as read, coerced later
    pub month: Option<String>,
    /// Day cells aligned with [`FilteredTable::day_columns`]
    pub days: Vec<Option<String>>,
}

/// Output of the schema filter: identifiers plus numerically ordered day columns
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilteredTable {
    pub day_columns: Vec<DayColumn>,
    pub rows: Vec<FilteredRow>,
}

impl FilteredTable {
    pub fn height(&self) -> usize {
        self.rows.len()
    }
}

/// One (row, day-slot) pair in long format
#[derive(Debug, Clone, PartialEq)]
pub struct LongRecord {
    pub station: Code,
    pub pollutant: Code,
    pub year: Option<i32>,
    pub month: Option<u32>,
    /// Day parsed from the column label, not checked against the month length
    pub day: u32,
    pub day_label: String,
    pub value: Option<f64>,
    /// Set by date synthesis when year/month/day form a calendar date
    pub date: Option<NaiveDate>,
}

impl LongRecord {
    /// Convert into a [`ValidRecord`] when a date is present
    pub fn into_valid(self) -> Option<ValidRecord> {
        let date = self.date?;
        Some(ValidRecord {
            station: self.station,
            pollutant: self.pollutant,
            year: self.year?,
            month: self.month?,
            day: self.day,
            day_label: self.day_label,
            value: self.value,
            date,
        })
    }
}

/// Long-format record with a guaranteed calendar date
#[derive(Debug, Clone, PartialEq)]
pub struct ValidRecord {
    pub station: Code,
    pub pollutant: Code,
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub day_label: String,
    pub value: Option<f64>,
    pub date: NaiveDate,
}

/// Descriptive statistics for one (station, pollutant) pair.
///
/// Statistics are `None` when there are no values to compute them from;
/// `std_dev` additionally needs at least two values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub station: Code,
    pub pollutant: Code,
    pub count: usize,
    pub mean: Option<f64>,
    pub std_dev: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// Row key of the by-pollutant pivot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

/// Dense matrix of group means with sorted row and column keys.
///
/// A cell is `None` when no record fell into it or all of its values were
/// missing. An empty pivot has no rows and no columns.
#[derive(Debug, Clone, PartialEq)]
pub struct PivotTable<R, C> {
    pub rows: Vec<R>,
    pub columns: Vec<C>,
    pub cells: Vec<Vec<Option<f64>>>,
}

impl<R, C> Default for PivotTable<R, C> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            columns: Vec::new(),
            cells: Vec::new(),
        }
    }
}

impl<R: PartialEq, C: PartialEq> PivotTable<R, C> {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, row: &R, column: &C) -> Option<f64> {
        let r = self.rows.iter().position(|key| key == row)?;
        let c = self.columns.iter().position(|key| key == column)?;
        self.cells[r][c]
    }

    /// Mean across the present cells of each row, `None` for rows with none
    pub fn row_means(&self) -> Vec<Option<f64>> {
        self.cells
            .iter()
            .map(|row| {
                let present: Vec<f64> = row.iter().flatten().copied().collect();
                if present.is_empty() {
                    None
                } else {
                    Some(present.iter().sum::<f64>() / present.len() as f64)
                }
            })
            .collect()
    }
}

/// Station × month means for one pollutant and year
pub type MonthlyByStationPivot = PivotTable<Code, u32>;

/// (year, month) × pollutant means for one station
pub type MonthlyByPollutantPivot = PivotTable<YearMonth, Code>;

/// Distinct identifiers present in the valid records, ascending
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub stations: Vec<Code>,
    pub pollutants: Vec<Code>,
    pub years: Vec<i32>,
}

impl Catalog {
    pub fn is_empty(&self) -> bool {
        self.stations.is_empty() && self.pollutants.is_empty() && self.years.is_empty()
    }
}

/// Row counts collected across one pipeline run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineStats {
    pub files_read: usize,
    pub raw_rows: usize,
    pub filtered_rows: usize,
    pub day_columns: usize,
    pub long_records: usize,
    pub missing_values: usize,
    pub invalid_dates: usize,
    pub valid_records: usize,
    pub processing_time_ms: u128,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_orders_numerically() {
        let mut codes = vec![Code::new("101"), Code::new("4"), Code::new("35")];
        codes.sort();
        let texts: Vec<&str> = codes.iter().map(Code::as_str).collect();
        assert_eq!(texts, vec!["4", "35", "101"]);
    }

    #[test]
    fn test_code_canonicalises_integers() {
        assert_eq!(Code::new(" 004 "), Code::new("4"));
        assert_eq!(Code::new("4").as_number(), Some(4));
        assert_eq!(Code::new("NO2").as_number(), None);
    }

    #[test]
    fn test_code_from_string_agrees_with_ordering() {
        let padded = Code::from("004".to_string());
        let plain = Code::new("4");
        assert_eq!(padded, plain);
        assert_eq!(padded.cmp(&plain), Ordering::Equal);
        assert_eq!(Code::from(" NO2 ".to_string()).as_str(), "NO2");
    }

    #[test]
    fn test_textual_codes_sort_after_numeric() {
        let mut codes = vec![Code::new("PM10"), Code::new("12"), Code::new("CO")];
        codes.sort();
        let texts: Vec<&str> = codes.iter().map(Code::as_str).collect();
        assert_eq!(texts, vec!["12", "CO", "PM10"]);
    }

    #[test]
    fn test_into_valid_requires_date() {
        let record = LongRecord {
            station: Code::new("1"),
            pollutant: Code::new("8"),
            year: Some(2021),
            month: Some(2),
            day: 30,
            day_label: "D30".to_string(),
            value: Some(1.0),
            date: None,
        };
        assert!(record.into_valid().is_none());
    }

    #[test]
    fn test_row_means_skip_missing_cells() {
        let pivot: PivotTable<u32, u32> = PivotTable {
            rows: vec![1, 2],
            columns: vec![1, 2, 3],
            cells: vec![
                vec![Some(1.0), None, Some(3.0)],
                vec![None, None, None],
            ],
        };
        assert_eq!(pivot.row_means(), vec![Some(2.0), None]);
        assert_eq!(pivot.get(&1, &3), Some(3.0));
        assert_eq!(pivot.get(&1, &2), None);
        assert_eq!(pivot.get(&9, &1), None);
    }

    #[test]
    fn test_year_month_display() {
        let key = YearMonth {
            year: 2016,
            month: 3,
        };
        assert_eq!(key.to_string(), "2016-03");
    }
}
