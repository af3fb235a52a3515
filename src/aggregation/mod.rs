//! Aggregation queries over the canonical valid-record table.
//!
//! All queries are pure functions of `&[ValidRecord]`. Empty inputs and
//! filters that match nothing give empty results, never errors. Records with
//! a blank station or pollutant code are left out of every grouping.

pub mod pivot;
pub mod stats;

pub use pivot::{monthly_by_pollutant, monthly_by_station, pivot_means};
pub use stats::RunningStats;

use crate::models::{Catalog, Code, SummaryRow, ValidRecord};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Distinct stations, pollutants and years, each ascending
pub fn catalog(records: &[ValidRecord]) -> Catalog {
    let mut stations = BTreeSet::new();
    let mut pollutants = BTreeSet::new();
    let mut years = BTreeSet::new();

    for record in records {
        if !record.station.is_blank() {
            stations.insert(record.station.clone());
        }
        if !record.pollutant.is_blank() {
            pollutants.insert(record.pollutant.clone());
        }
        years.insert(record.year);
    }

    Catalog {
        stations: stations.into_iter().collect(),
        pollutants: pollutants.into_iter().collect(),
        years: years.into_iter().collect(),
    }
}

/// Descriptive statistics per (station, pollutant), ordered by that pair.
///
/// Pairs whose values are all missing still get a row, with `count = 0` and
/// no statistics.
pub fn summarize(records: &[ValidRecord]) -> Vec<SummaryRow> {
    let mut groups: BTreeMap<(Code, Code), RunningStats> = BTreeMap::new();
    for record in records
        .iter()
        .filter(|record| !record.station.is_blank() && !record.pollutant.is_blank())
    {
        groups
            .entry((record.station.clone(), record.pollutant.clone()))
            .or_default()
            .push_opt(record.value);
    }

    let summary: Vec<SummaryRow> = groups
        .into_iter()
        .map(|((station, pollutant), stats)| SummaryRow {
            station,
            pollutant,
            count: stats.count(),
            mean: stats.mean(),
            std_dev: stats.std_dev(),
            min: stats.min(),
            max: stats.max(),
        })
        .collect();

    debug!("Summarized {} station/pollutant pairs", summary.len());
    summary
}
