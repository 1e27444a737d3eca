use image::RgbaImage;

use crate::models::SpeciesCount;
use crate::report::Report;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warning,
    Error,
    Success,
}

/// Presentation sink for a running batch.
///
/// The run core calls these in order as it goes; front-ends render them.
/// Every method has a no-op default so a sink only implements the
/// surfaces it actually shows.
pub trait RunObserver {
    /// Replace the status line.
    fn status(&mut self, _level: StatusLevel, _message: &str) {}

    /// Progress through the file list, in [0, 1].
    fn progress(&mut self, _fraction: f32) {}

    /// Cumulative counts, already sorted for display.
    fn tallies(&mut self, _rows: &[SpeciesCount]) {}

    /// Latest annotated frame in display (RGB) order.
    fn frame(&mut self, _image: &RgbaImage, _caption: &str) {}

    /// End-of-run report with the chart data.
    fn report(&mut self, _report: &Report) {}
}

/// Terminal rendering of the dashboard surfaces.
pub struct ConsoleObserver {
    verbose: bool,
    last_percent: Option<u32>,
}

impl ConsoleObserver {
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            last_percent: None,
        }
    }
}

impl RunObserver for ConsoleObserver {
    fn status(&mut self, level: StatusLevel, message: &str) {
        match level {
            StatusLevel::Info => println!("{}", message),
            StatusLevel::Success => println!("✅ {}", message),
            StatusLevel::Warning | StatusLevel::Error => eprintln!("{}", message),
        }
    }

    fn progress(&mut self, fraction: f32) {
        let percent = (fraction.clamp(0.0, 1.0) * 100.0).round() as u32;
        if self.last_percent != Some(percent) {
            self.last_percent = Some(percent);
            if self.verbose {
                println!("  progress: {}%", percent);
            }
        }
    }

    fn tallies(&mut self, rows: &[SpeciesCount]) {
        if !self.verbose {
            return;
        }
        let summary: Vec<String> = rows
            .iter()
            .map(|row| format!("{}={}", row.species, row.count))
            .collect();
        println!("  counts: {}", summary.join(", "));
    }

    fn report(&mut self, report: &Report) {
        println!("\n📊 Detailed CSV report saved to: {}", report.csv_path.display());

        println!("\n=== Total Species Abundance ===");
        print_bars(
            report
                .species_totals
                .iter()
                .map(|row| (row.species.as_str(), row.count)),
        );

        println!("\n=== Detections by Media Type ===");
        let types: Vec<(String, u64)> = report
            .type_totals
            .iter()
            .map(|(kind, count)| (kind.to_string(), *count))
            .collect();
        print_bars(types.iter().map(|(kind, count)| (kind.as_str(), *count)));
    }
}

const BAR_WIDTH: u64 = 40;

fn print_bars<'a>(rows: impl Iterator<Item = (&'a str, u64)>) {
    let rows: Vec<(&str, u64)> = rows.collect();
    let max = rows.iter().map(|(_, count)| *count).max().unwrap_or(0).max(1);
    let label_width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    for (label, count) in rows {
        let len = (count * BAR_WIDTH).div_ceil(max) as usize;
        println!(
            "  {:<width$} {} {}",
            label,
            "█".repeat(len),
            count,
            width = label_width
        );
    }
}
