//! CSV report and summary chart data.

mod common;

use benthic_scan::models::{DetectionLog, round_confidence};
use benthic_scan::report::{REPORT_FILE_NAME, finalize, type_totals, write_csv};
use common::*;

fn record(file: &str, kind: MediaKind, species: &str, score: f32, frame: FrameIndex) -> DetectionRecord {
    DetectionRecord {
        file: file.to_string(),
        kind,
        species: species.to_string(),
        confidence: round_confidence(score),
        frame_index: frame,
    }
}

#[test]
fn test_confidence_rounding() {
    assert_eq!(round_confidence(0.93371), 0.9337);
    assert_eq!(round_confidence(0.99996), 1.0);
    assert_eq!(round_confidence(0.0), 0.0);
    assert_eq!(round_confidence(0.12345), 0.1235);
}

#[test]
fn test_csv_rows_keep_append_order() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let path = dir.path().join("report.csv");
    let records = vec![
        record("z.mp4", MediaKind::Video, "urchin", 0.93371, FrameIndex::Frame(10)),
        record("a.jpg", MediaKind::Image, "sea star", 0.5, FrameIndex::NotApplicable),
        record("z.mp4", MediaKind::Video, "crab, hermit", 0.25, FrameIndex::Frame(5)),
    ];

    write_csv(&path, &records)?;

    let text = std::fs::read_to_string(&path)?;
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines,
        vec![
            "File,Type,Species,Confidence,Frame_Index",
            "z.mp4,Video,urchin,0.9337,10",
            "a.jpg,Image,sea star,0.5,NA",
            "z.mp4,Video,\"crab, hermit\",0.25,5",
        ]
    );
    Ok(())
}

#[test]
fn test_finalize_writes_report_and_charts() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let mut log = DetectionLog::new();
    log.push(record("a.jpg", MediaKind::Image, "sponge", 0.4, FrameIndex::NotApplicable));
    log.push(record("v.mov", MediaKind::Video, "crab", 0.6, FrameIndex::Frame(3)));
    log.push(record("v.mov", MediaKind::Video, "crab", 0.7, FrameIndex::Frame(6)));
    let mut observer = RecordingObserver::default();

    let report = finalize(&log, dir.path(), &mut observer)?.expect("report expected");

    assert_eq!(report.csv_path, dir.path().join(REPORT_FILE_NAME));
    assert!(report.csv_path.is_file());
    let species: Vec<(&str, u64)> = report
        .species_totals
        .iter()
        .map(|row| (row.species.as_str(), row.count))
        .collect();
    assert_eq!(species, vec![("crab", 2), ("sponge", 1)]);
    assert_eq!(
        report.type_totals,
        vec![(MediaKind::Video, 2), (MediaKind::Image, 1)]
    );
    assert_eq!(observer.reports, vec![report]);
    Ok(())
}

#[test]
fn test_finalize_without_records() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let mut observer = RecordingObserver::default();

    let report = finalize(&DetectionLog::new(), dir.path(), &mut observer)?;

    assert!(report.is_none());
    assert!(dir_entries(dir.path()).is_empty());
    assert!(observer.has_status(StatusLevel::Warning, "No benthic fauna detected"));
    Ok(())
}

#[test]
fn test_type_totals_counts_each_record() {
    let records = vec![
        record("a.jpg", MediaKind::Image, "x", 0.5, FrameIndex::NotApplicable),
        record("b.jpg", MediaKind::Image, "y", 0.5, FrameIndex::NotApplicable),
        record("c.mp4", MediaKind::Video, "x", 0.5, FrameIndex::Frame(1)),
    ];
    assert_eq!(
        type_totals(&records),
        vec![(MediaKind::Image, 2), (MediaKind::Video, 1)]
    );
    assert!(type_totals(&[]).is_empty());
}

#[test]
fn test_log_keeps_tallies_in_step() {
    let mut log = DetectionLog::new();
    for species in ["a", "b", "a", "c", "a"] {
        log.push(record("f.jpg", MediaKind::Image, species, 0.5, FrameIndex::NotApplicable));
        for (name, count) in log.tallies() {
            let seen = log.records().iter().filter(|r| &r.species == name).count() as u64;
            assert_eq!(*count, seen);
        }
    }
    assert_eq!(log.tallies().get("a"), Some(&3));
}
