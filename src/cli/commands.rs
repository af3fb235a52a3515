//! Command execution for the air-quality processor
//!
//! Runs the pipeline, prints a sample of every intermediate table, writes
//! the exports and renders the two monthly charts.

use super::args::Args;
use crate::aggregation::{catalog, monthly_by_pollutant, monthly_by_station, summarize};
use crate::export::{ExportWriter, frames};
use crate::models::{Catalog, Code, PipelineStats, ValidRecord};
use crate::plot::{Chart, PlotRenderer, TerminalRenderer};
use crate::processor::EmissionsProcessor;

use anyhow::{Context, Result};
use colored::Colorize;
use polars::prelude::DataFrame;
use std::io;
use std::path::PathBuf;
use tracing::{debug, info};

/// Main entry point for command execution
pub async fn run(args: Args) -> Result<PipelineStats> {
    setup_logging(&args)?;
    info!("Starting airq v{}", env!("CARGO_PKG_VERSION"));

    let config = args.to_config().context("Invalid arguments")?;
    let rows = config.sample_rows;
    let processor = EmissionsProcessor::new(config.clone())?;

    let output = processor.run().await.with_context(|| {
        format!(
            "Failed to process exports in {}",
            config.data_dir.display()
        )
    })?;

    print_sample(
        "Filtered table (identifiers + D01..D31)",
        &frames::filtered_frame(&output.filtered)?,
        rows,
    );
    print_sample("Long format with dates", &frames::long_frame(&output.long)?, rows);
    print_sample(
        "Valid records, sorted",
        &frames::valid_frame(&output.valid)?,
        rows,
    );

    let catalog = catalog(&output.valid);
    print_catalog(&catalog);

    let summary = summarize(&output.valid);
    print_sample(
        "Summary per station and pollutant",
        &frames::summary_frame(&summary)?,
        rows,
    );

    let written = ExportWriter::new(&config)
        .write_all(&output, &summary)
        .context("Failed to write exports")?;
    print_exports(&written);

    if args.no_plots {
        debug!("Charts disabled");
    } else {
        let selection = Selection::resolve(&args, &catalog);
        render_charts(&output.valid, &selection, &mut TerminalRenderer::new(io::stdout()))?;
    }

    print_stats(&output.stats);
    Ok(output.stats)
}

/// Run `task` unless `shutdown` completes successfully first.
///
/// A shutdown future that fails, such as a signal handler that could not be
/// installed, is ignored and `task` runs to completion.
pub async fn run_until_interrupted<T>(
    task: impl Future<Output = Result<T>>,
    shutdown: impl Future<Output = io::Result<()>>,
) -> Result<T> {
    tokio::select! {
        result = task => result,
        Ok(()) = shutdown => {
            eprintln!("\nReceived CTRL+C, shutting down...");
            Err(anyhow::anyhow!("Processing interrupted by user"))
        }
    }
}

/// Set up logging based on verbosity settings
fn setup_logging(args: &Args) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("airq_processor={}", log_level)));

    if args.quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    }

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

/// Chart selectors, explicit or defaulted from the catalog
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub pollutant: Option<Code>,
    pub station: Option<Code>,
    pub year: Option<i32>,
}

impl Selection {
    /// Use the given selectors, falling back to the first catalog entry
    pub fn resolve(args: &Args, catalog: &Catalog) -> Self {
        Self {
            pollutant: args
                .pollutant_code()
                .or_else(|| catalog.pollutants.first().cloned()),
            station: args
                .station_code()
                .or_else(|| catalog.stations.first().cloned()),
            year: args.year.or_else(|| catalog.years.first().copied()),
        }
    }
}

/// Render the per-station and the all-pollutant charts, or a notice when
/// the selection matches no data
pub fn render_charts(
    records: &[ValidRecord],
    selection: &Selection,
    renderer: &mut impl PlotRenderer,
) -> Result<()> {
    match (&selection.pollutant, selection.year) {
        (Some(pollutant), Some(year)) => {
            let pivot = monthly_by_station(records, pollutant, year);
            match Chart::monthly_by_station(&pivot, pollutant, year) {
                Some(chart) => renderer.render(&chart)?,
                None => print_no_data(&format!("MAGNITUD={} in AÑO={}", pollutant, year)),
            }
        }
        _ => print_no_data("pollutant chart"),
    }

    match &selection.station {
        Some(station) => {
            let pivot = monthly_by_pollutant(records, station, selection.year);
            match Chart::station_average(&pivot, station, selection.year) {
                Some(chart) => renderer.render(&chart)?,
                None => print_no_data(&format!(
                    "ESTACION={} (year={:?})",
                    station, selection.year
                )),
            }
        }
        None => print_no_data("station chart"),
    }

    Ok(())
}

fn print_no_data(what: &str) {
    println!("{} {}", "No data for".yellow(), what);
}

fn print_sample(title: &str, df: &DataFrame, rows: usize) {
    println!("\n{}", "=".repeat(80));
    println!("{} (shape: {:?})", title.bright_green().bold(), df.shape());
    println!("{}", "=".repeat(80));
    println!("{}", df.head(Some(rows)));
}

fn join_codes(codes: &[Code]) -> String {
    codes
        .iter()
        .map(Code::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn print_catalog(catalog: &Catalog) {
    println!("\n{}", "Catalog".bright_green().bold());
    println!("   • Stations:   [{}]", join_codes(&catalog.stations));
    println!("   • Pollutants: [{}]", join_codes(&catalog.pollutants));
    println!(
        "   • Years:      [{}]",
        catalog
            .years
            .iter()
            .map(i32::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    );
}

fn print_exports(written: &[PathBuf]) {
    println!("\n{}", "📁 Output Files:".bright_green().bold());
    for path in written {
        println!("   • {}", path.display());
    }
}

fn print_stats(stats: &PipelineStats) {
    println!("\n{}", "Processing Complete".bright_green().bold());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("   • Files read: {}", stats.files_read);
    println!("   • Raw rows: {}", stats.raw_rows);
    println!(
        "   • Filtered rows: {} ({} day columns)",
        stats.filtered_rows, stats.day_columns
    );
    println!("   • Long records: {}", stats.long_records);
    println!("   • Valid records: {}", stats.valid_records);
    if stats.missing_values > 0 {
        println!(
            "   • {} {}",
            "Missing values:".yellow(),
            stats.missing_values
        );
    }
    if stats.invalid_dates > 0 {
        println!(
            "   • {} {}",
            "Invalid dates dropped:".yellow(),
            stats.invalid_dates
        );
    }
    println!("   • Processing time: {} ms", stats.processing_time_ms);
}
