//! Pipeline tests for the processor module
//!
//! Exercise the full run over temporary export directories.

pub mod multi_file;

use std::fs;
use std::path::Path;

/// Header of a complete export: identifiers, D01..D31 and V01..V31
pub fn export_header() -> String {
    let mut columns = vec![
        "PROVINCIA".to_string(),
        "MUNICIPIO".to_string(),
        "ESTACION".to_string(),
        "MAGNITUD".to_string(),
        "PUNTO_MUESTREO".to_string(),
        "ANO".to_string(),
        "MES".to_string(),
    ];
    for day in 1..=31 {
        columns.push(format!("D{:02}", day));
        columns.push(format!("V{:02}", day));
    }
    columns.join(";")
}

/// One export line with `value(day)` in every day cell and `V` validation flags
pub fn export_line(
    station: u32,
    pollutant: u32,
    year: i32,
    month: u32,
    value: impl Fn(u32) -> String,
) -> String {
    let mut cells = vec![
        "28".to_string(),
        "79".to_string(),
        station.to_string(),
        pollutant.to_string(),
        format!("28079{:03}_{}_38", station, pollutant),
        year.to_string(),
        month.to_string(),
    ];
    for day in 1..=31 {
        cells.push(value(day));
        cells.push("V".to_string());
    }
    cells.join(";")
}

/// Write an export file made of `lines` under the standard header
pub fn write_export(dir: &Path, file_name: &str, lines: &[String]) {
    let mut content = export_header();
    content.push('\n');
    for line in lines {
        content.push_str(line);
        content.push('\n');
    }
    fs::write(dir.join(file_name), content).unwrap();
}
