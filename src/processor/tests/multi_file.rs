//! Multi-file union tests

use super::{export_line, write_export};
use crate::aggregation::{catalog, monthly_by_station, summarize};
use crate::config::ProcessorConfig;
use crate::models::Code;
use crate::processor::EmissionsProcessor;
use std::fs;
use tempfile::TempDir;

/// Two files, stations 101 and 102, pollutant 1, January and February 2016
fn create_two_file_dataset(temp_dir: &TempDir) {
    for (file_name, month) in [("emisiones-2016-01.csv", 1), ("emisiones-2016-02.csv", 2)] {
        let lines: Vec<String> = [101, 102]
            .iter()
            .map(|station| {
                export_line(*station, 1, 2016, month, |day| {
                    if *station == 101 && month == 1 && day == 15 {
                        "texto".to_string()
                    } else {
                        format!("{}.0", day)
                    }
                })
            })
            .collect();
        write_export(temp_dir.path(), file_name, &lines);
    }
}

#[tokio::test]
async fn test_two_file_end_to_end() {
    let temp_dir = TempDir::new().unwrap();
    create_two_file_dataset(&temp_dir);

    let output = EmissionsProcessor::new(ProcessorConfig::new(temp_dir.path()))
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(output.stats.files_read, 2);
    assert_eq!(output.stats.raw_rows, 4);
    assert_eq!(output.long.len(), 4 * 31);

    let text_record = output
        .valid
        .iter()
        .find(|r| r.station == Code::new("101") && r.month == 1 && r.day == 15)
        .unwrap();
    assert_eq!(text_record.value, None);

    // January: 31 days, one text cell; February 2016: 29 valid days
    let summary = summarize(&output.valid);
    let station_101 = summary
        .iter()
        .find(|row| row.station == Code::new("101") && row.pollutant == Code::new("1"))
        .unwrap();
    assert_eq!(station_101.count, 30 + 29);

    let station_102 = summary
        .iter()
        .find(|row| row.station == Code::new("102"))
        .unwrap();
    assert_eq!(station_102.count, 31 + 29);
}

#[tokio::test]
async fn test_catalog_and_pivot_over_union() {
    let temp_dir = TempDir::new().unwrap();
    create_two_file_dataset(&temp_dir);

    let output = EmissionsProcessor::new(ProcessorConfig::new(temp_dir.path()))
        .unwrap()
        .run()
        .await
        .unwrap();

    let catalog = catalog(&output.valid);
    assert_eq!(catalog.stations, vec![Code::new("101"), Code::new("102")]);
    assert_eq!(catalog.pollutants, vec![Code::new("1")]);
    assert_eq!(catalog.years, vec![2016]);

    let pivot = monthly_by_station(&output.valid, &Code::new("1"), 2016);
    assert_eq!(pivot.columns, vec![1, 2]);
    // mean of 1..=31 is 16, mean of 1..=29 is 15
    assert_eq!(pivot.get(&Code::new("102"), &1), Some(16.0));
    assert_eq!(pivot.get(&Code::new("102"), &2), Some(15.0));
}

#[tokio::test]
async fn test_files_with_different_column_order() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("emisiones-a.csv"),
        "ESTACION;MAGNITUD;ANO;MES;D01;D02\n4;1;2016;1;10;20\n",
    )
    .unwrap();
    fs::write(
        temp_dir.path().join("emisiones-b.csv"),
        "D02;D01;MES;ANO;MAGNITUD;ESTACION\n40;30;2;2016;1;4\n",
    )
    .unwrap();

    let output = EmissionsProcessor::new(ProcessorConfig::new(temp_dir.path()))
        .unwrap()
        .run()
        .await
        .unwrap();

    let values: Vec<Option<f64>> = output.valid.iter().map(|r| r.value).collect();
    assert_eq!(values, vec![Some(10.0), Some(20.0), Some(30.0), Some(40.0)]);
}
