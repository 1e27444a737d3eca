use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::RunError;
use crate::models::{DetectionLog, DetectionRecord, MediaKind, SpeciesCount, sorted_tallies};
use crate::status::{RunObserver, StatusLevel};

pub const REPORT_FILE_NAME: &str = "detection_report.csv";

/// Written report plus the data behind the two summary charts.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub csv_path: PathBuf,
    /// Total count per species, descending
    pub species_totals: Vec<SpeciesCount>,
    /// Detection count per media type, descending
    pub type_totals: Vec<(MediaKind, u64)>,
}

/// Write the CSV report and publish the summary charts.
///
/// Returns `None` without touching the disk when nothing was detected.
pub fn finalize(
    log: &DetectionLog,
    save_dir: &Path,
    observer: &mut dyn RunObserver,
) -> Result<Option<Report>, RunError> {
    if log.is_empty() {
        observer.status(StatusLevel::Warning, "No benthic fauna detected in this batch.");
        tracing::info!("no detections, report skipped");
        return Ok(None);
    }

    let csv_path = save_dir.join(REPORT_FILE_NAME);
    if let Err(source) = write_csv(&csv_path, log.records()) {
        let error = RunError::Report {
            path: csv_path,
            source,
        };
        observer.status(StatusLevel::Error, &format!("❌ {}", error));
        return Err(error);
    }
    tracing::info!(path = %csv_path.display(), rows = log.records().len(), "report written");

    let report = Report {
        csv_path,
        species_totals: sorted_tallies(log.tallies()),
        type_totals: type_totals(log.records()),
    };
    observer.report(&report);
    Ok(Some(report))
}

/// Records in append order under the `File,Type,Species,Confidence,Frame_Index` header.
pub fn write_csv(path: &Path, records: &[DetectionRecord]) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn type_totals(records: &[DetectionRecord]) -> Vec<(MediaKind, u64)> {
    let mut counts: BTreeMap<MediaKind, u64> = BTreeMap::new();
    for record in records {
        *counts.entry(record.kind).or_insert(0) += 1;
    }
    let mut totals: Vec<(MediaKind, u64)> = counts.into_iter().collect();
    totals.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    totals
}
