//! Cleaning and canonical ordering
//!
//! Drops records without a date and sorts the rest by station, pollutant and
//! date. The sort is stable, so records with equal keys keep reshape order
//! and repeated runs give identical output.

use crate::models::{LongRecord, ValidRecord};
use tracing::debug;

/// Keep dated records and order them by (station, pollutant, date)
pub fn clean_and_sort(records: Vec<LongRecord>) -> Vec<ValidRecord> {
    let total = records.len();
    let mut valid: Vec<ValidRecord> = records
        .into_iter()
        .filter_map(LongRecord::into_valid)
        .collect();

    valid.sort_by(|a, b| {
        a.station
            .cmp(&b.station)
            .then_with(|| a.pollutant.cmp(&b.pollutant))
            .then_with(|| a.date.cmp(&b.date))
    });

    debug!(
        "Cleaned records: kept {} of {}, dropped {} without a valid date",
        valid.len(),
        total,
        total - valid.len()
    );
    valid
}
