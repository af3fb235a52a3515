//! Monthly pivot queries
//!
//! Both pivots filter the valid records, group them, take the mean of each
//! group and lay the means out as a dense matrix. Filters that match nothing
//! produce an empty matrix rather than an error.

use super::stats::RunningStats;
use crate::models::{
    Code, MonthlyByPollutantPivot, MonthlyByStationPivot, PivotTable, ValidRecord, YearMonth,
};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Lay grouped accumulators out as a matrix of means.
///
/// Row and column keys are the sorted distinct keys seen; combinations with
/// no group, or a group without values, are `None`.
pub fn pivot_means<R, C>(groups: &BTreeMap<(R, C), RunningStats>) -> PivotTable<R, C>
where
    R: Ord + Clone,
    C: Ord + Clone,
{
    let rows: Vec<R> = groups
        .keys()
        .map(|(row, _)| row.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let columns: Vec<C> = groups
        .keys()
        .map(|(_, column)| column.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let cells = rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|column| {
                    groups
                        .get(&(row.clone(), column.clone()))
                        .and_then(RunningStats::mean)
                })
                .collect()
        })
        .collect();

    PivotTable {
        rows,
        columns,
        cells,
    }
}

/// Monthly mean of `pollutant` in `year`, stations as rows and months as columns
pub fn monthly_by_station(
    records: &[ValidRecord],
    pollutant: &Code,
    year: i32,
) -> MonthlyByStationPivot {
    let mut groups: BTreeMap<(Code, u32), RunningStats> = BTreeMap::new();
    for record in records
        .iter()
        .filter(|record| &record.pollutant == pollutant && record.year == year)
        .filter(|record| !record.station.is_blank())
    {
        groups
            .entry((record.station.clone(), record.month))
            .or_default()
            .push_opt(record.value);
    }

    let pivot = pivot_means(&groups);
    debug!(
        "Monthly pivot for pollutant {} in {}: {} stations x {} months",
        pollutant,
        year,
        pivot.rows.len(),
        pivot.columns.len()
    );
    pivot
}

/// Monthly mean of every pollutant measured at `station`, optionally limited
/// to one year; (year, month) as rows and pollutants as columns
pub fn monthly_by_pollutant(
    records: &[ValidRecord],
    station: &Code,
    year: Option<i32>,
) -> MonthlyByPollutantPivot {
    let mut groups: BTreeMap<(YearMonth, Code), RunningStats> = BTreeMap::new();
    for record in records
        .iter()
        .filter(|record| &record.station == station)
        .filter(|record| year.is_none_or(|year| record.year == year))
        .filter(|record| !record.pollutant.is_blank())
    {
        let key = YearMonth {
            year: record.year,
            month: record.month,
        };
        groups
            .entry((key, record.pollutant.clone()))
            .or_default()
            .push_opt(record.value);
    }

    let pivot = pivot_means(&groups);
    debug!(
        "Monthly pivot for station {} (year {:?}): {} months x {} pollutants",
        station,
        year,
        pivot.rows.len(),
        pivot.columns.len()
    );
    pivot
}
