//! Chart construction from monthly pivots and terminal rendering.
//!
//! Charts are plain data: a title, axis labels and one or more series of
//! `(month, value)` points sorted by month. Rendering sits behind the
//! [`PlotRenderer`] trait; [`TerminalRenderer`] draws horizontal bars.

use crate::constants::CHART_BAR_WIDTH;
use crate::error::Result;
use crate::models::{Code, MonthlyByPollutantPivot, MonthlyByStationPivot};
use colored::{Color, Colorize};
use std::collections::BTreeMap;
use std::io::Write;

const PALETTE: [Color; 6] = [
    Color::Cyan,
    Color::Green,
    Color::Yellow,
    Color::Magenta,
    Color::Blue,
    Color::Red,
];

/// One labelled line of a chart
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    /// `(month, value)` pairs, ascending by month
    pub points: Vec<(u32, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<Series>,
}

impl Chart {
    /// One series per station, x = month. `None` when the pivot is empty.
    pub fn monthly_by_station(
        pivot: &MonthlyByStationPivot,
        pollutant: &Code,
        year: i32,
    ) -> Option<Self> {
        if pivot.is_empty() {
            return None;
        }

        let series = pivot
            .rows
            .iter()
            .zip(&pivot.cells)
            .map(|(station, cells)| Series {
                label: station.to_string(),
                points: pivot
                    .columns
                    .iter()
                    .zip(cells)
                    .filter_map(|(month, cell)| cell.map(|value| (*month, value)))
                    .collect(),
            })
            .collect();

        Some(Self {
            title: format!(
                "Medias mensuales por estación - MAGNITUD {}, AÑO {}",
                pollutant, year
            ),
            x_label: "Mes".to_string(),
            y_label: "Valor medio".to_string(),
            series,
        })
    }

    /// Mean across all pollutants per month for one station.
    ///
    /// Each point averages the pollutant means of that month, mixing units
    /// of different pollutants. With no year filter, every year present gets
    /// its own series. `None` when the pivot is empty.
    pub fn station_average(
        pivot: &MonthlyByPollutantPivot,
        station: &Code,
        year: Option<i32>,
    ) -> Option<Self> {
        if pivot.is_empty() {
            return None;
        }

        let mut by_year: BTreeMap<i32, Vec<(u32, f64)>> = BTreeMap::new();
        for (key, mean) in pivot.rows.iter().zip(pivot.row_means()) {
            if let Some(mean) = mean {
                by_year.entry(key.year).or_default().push((key.month, mean));
            }
        }

        let series = by_year
            .into_iter()
            .map(|(series_year, points)| Series {
                label: match year {
                    Some(_) => "promedio".to_string(),
                    None => series_year.to_string(),
                },
                points,
            })
            .collect();

        let mut title = format!(
            "Promedio mensual (todas las magnitudes) - Estación {}",
            station
        );
        if let Some(year) = year {
            title.push_str(&format!(" (AÑO {})", year));
        }

        Some(Self {
            title,
            x_label: "Mes".to_string(),
            y_label: "Valor medio".to_string(),
            series,
        })
    }

    /// Largest absolute value over every point, 0 for a chart without points
    pub fn max_abs(&self) -> f64 {
        self.series
            .iter()
            .flat_map(|series| series.points.iter())
            .map(|(_, value)| value.abs())
            .fold(0.0, f64::max)
    }
}

/// Output device for charts
pub trait PlotRenderer {
    fn render(&mut self, chart: &Chart) -> Result<()>;
}

/// Draws charts as coloured horizontal bar rows on any writer
pub struct TerminalRenderer<W: Write> {
    out: W,
    bar_width: usize,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            bar_width: CHART_BAR_WIDTH,
        }
    }

    pub fn with_bar_width(mut self, width: usize) -> Self {
        self.bar_width = width.max(1);
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn bar_length(&self, value: f64, scale: f64) -> usize {
        if scale <= 0.0 {
            return 0;
        }
        ((value.abs() / scale) * self.bar_width as f64).round() as usize
    }
}

impl<W: Write> PlotRenderer for TerminalRenderer<W> {
    fn render(&mut self, chart: &Chart) -> Result<()> {
        let scale = chart.max_abs();

        writeln!(self.out)?;
        writeln!(self.out, "{}", chart.title.bold())?;
        writeln!(self.out, "{} / {}", chart.x_label, chart.y_label)?;

        for (index, series) in chart.series.iter().enumerate() {
            let color = PALETTE[index % PALETTE.len()];
            writeln!(self.out, "  {}", series.label.color(color).bold())?;

            for &(x, value) in &series.points {
                let bar = "█".repeat(self.bar_length(value, scale));
                writeln!(
                    self.out,
                    "    {:>2} │{} {:.2}",
                    x,
                    bar.color(color),
                    value
                )?;
            }
        }

        self.out.flush()?;
        Ok(())
    }
}
