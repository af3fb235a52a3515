//! Command-line argument definitions for the air-quality processor

use crate::config::ProcessorConfig;
use crate::error::Result;
use crate::models::Code;
use clap::Parser;
use std::path::PathBuf;

/// Process daily air-quality monitoring exports
///
/// Reads every `emisiones-*.csv` file in DATA_DIR, reshapes the day columns
/// into dated records, writes CSV and workbook exports and draws monthly
/// charts for one pollutant and one station.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "airq",
    version,
    about = "Consolidate and summarize daily air-quality monitoring exports"
)]
pub struct Args {
    /// Directory holding the emisiones-*.csv exports
    #[arg(value_name = "DATA_DIR")]
    pub data_dir: PathBuf,

    /// Rows shown for each sample table
    #[arg(long, default_value_t = crate::constants::DEFAULT_SAMPLE_ROWS)]
    pub rows: usize,

    /// Skip drawing charts
    #[arg(long)]
    pub no_plots: bool,

    /// Workbook file name (default: resumen_emisiones.xlsx)
    #[arg(long, value_name = "NAME")]
    pub excel: Option<String>,

    /// Directory for exports (default: DATA_DIR)
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Year used by both charts (default: first year in the data)
    #[arg(long)]
    pub year: Option<i32>,

    /// Pollutant code for the per-station chart (default: first pollutant)
    #[arg(long)]
    pub pollutant: Option<String>,

    /// Station code for the all-pollutant chart (default: first station)
    #[arg(long)]
    pub station: Option<String>,

    /// Maximum number of files read concurrently
    #[arg(long, value_name = "N")]
    pub max_concurrent_files: Option<usize>,

    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: debug, -vv: trace)"
    )]
    pub verbose: u8,

    #[arg(
        short = 'q',
        long = "quiet",
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,
}

impl Args {
    /// Determine the log level based on verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "info",
                1 => "debug",
                _ => "trace",
            }
        }
    }

    pub fn show_progress(&self) -> bool {
        !self.quiet
    }

    pub fn pollutant_code(&self) -> Option<Code> {
        self.pollutant.as_deref().map(Code::new)
    }

    pub fn station_code(&self) -> Option<Code> {
        self.station.as_deref().map(Code::new)
    }

    /// Build the processing configuration from the arguments
    pub fn to_config(&self) -> Result<ProcessorConfig> {
        let mut config = ProcessorConfig::new(&self.data_dir)
            .with_sample_rows(self.rows)
            .with_progress(self.show_progress());
        if let Some(name) = &self.excel {
            config = config.with_workbook_name(name);
        }
        if let Some(dir) = &self.output_dir {
            config = config.with_output_dir(dir);
        }
        if let Some(max_files) = self.max_concurrent_files {
            config = config.with_max_concurrent_files(max_files);
        }
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AirQualityError;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["airq", "/data/db"]);
        assert_eq!(args.data_dir, PathBuf::from("/data/db"));
        assert_eq!(args.rows, 15);
        assert!(!args.no_plots);
        assert_eq!(args.get_log_level(), "info");
        assert!(args.pollutant_code().is_none());
    }

    #[test]
    fn test_selectors_and_flags() {
        let args = Args::parse_from([
            "airq",
            "/data/db",
            "--rows",
            "5",
            "--no-plots",
            "--year",
            "2016",
            "--pollutant",
            "08",
            "--station",
            "4",
            "-vv",
        ]);
        assert_eq!(args.rows, 5);
        assert!(args.no_plots);
        assert_eq!(args.year, Some(2016));
        assert_eq!(args.pollutant_code(), Some(Code::new("8")));
        assert_eq!(args.station_code(), Some(Code::new("4")));
        assert_eq!(args.get_log_level(), "trace");
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Args::try_parse_from(["airq", "/data", "-q", "-v"]).is_err());
        let args = Args::parse_from(["airq", "/data", "--quiet"]);
        assert_eq!(args.get_log_level(), "error");
        assert!(!args.show_progress());
    }

    #[test]
    fn test_data_dir_required() {
        assert!(Args::try_parse_from(["airq"]).is_err());
    }

    #[test]
    fn test_to_config() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().to_str().unwrap();
        let args = Args::parse_from(["airq", dir, "--excel", "salida.xlsx", "--rows", "3"]);
        let config = args.to_config().unwrap();
        assert_eq!(config.sample_rows, 3);
        assert_eq!(config.workbook_path(), temp_dir.path().join("salida.xlsx"));

        let invalid = Args::parse_from(["airq", dir, "--max-concurrent-files", "0"]);
        assert!(matches!(
            invalid.to_config(),
            Err(AirQualityError::Configuration { .. })
        ));
    }
}
