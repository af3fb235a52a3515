//! Calendar date synthesis
//!
//! Builds a date for each long record from its year, month and day. Missing
//! parts and impossible combinations leave the date unset; nothing is clamped
//! or corrected.

use crate::models::LongRecord;
use chrono::NaiveDate;
use tracing::debug;

/// Calendar date for (year, month, day), or `None` when any part is missing
/// or the combination does not exist
pub fn synthesize_date(year: Option<i32>, month: Option<u32>, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year?, month?, day)
}

/// Fill in the date of every record
pub fn assign_dates(records: Vec<LongRecord>) -> Vec<LongRecord> {
    let dated: Vec<LongRecord> = records
        .into_iter()
        .map(|record| LongRecord {
            date: synthesize_date(record.year, record.month, record.day),
            ..record
        })
        .collect();

    debug!(
        "Assigned dates: {} of {} records have a valid date",
        dated.iter().filter(|record| record.date.is_some()).count(),
        dated.len()
    );
    dated
}
