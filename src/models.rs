use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Serialize, Serializer};

/// Whether a file is handled as a still image or a frame stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum MediaKind {
    Image,
    Video,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Image => f.write_str("Image"),
            MediaKind::Video => f.write_str("Video"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    pub path: PathBuf,
    pub kind: MediaKind,
}

impl MediaFile {
    /// File name as shown in status lines and the report.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Position of a detection inside its source.
///
/// Videos carry `frame_counter * stride`; images have no frame index and
/// serialize as the literal `NA`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameIndex {
    Frame(u64),
    NotApplicable,
}

impl fmt::Display for FrameIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameIndex::Frame(index) => write!(f, "{}", index),
            FrameIndex::NotApplicable => f.write_str("NA"),
        }
    }
}

impl Serialize for FrameIndex {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FrameIndex::Frame(index) => serializer.serialize_u64(*index),
            FrameIndex::NotApplicable => serializer.serialize_str("NA"),
        }
    }
}

/// One detected object instance; one row of `detection_report.csv`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionRecord {
    #[serde(rename = "File")]
    pub file: String,
    #[serde(rename = "Type")]
    pub kind: MediaKind,
    #[serde(rename = "Species")]
    pub species: String,
    #[serde(rename = "Confidence")]
    pub confidence: f64,
    #[serde(rename = "Frame_Index")]
    pub frame_index: FrameIndex,
}

/// Round a detector score to the 4 decimal places kept in the report.
pub fn round_confidence(score: f32) -> f64 {
    (f64::from(score) * 10_000.0).round() / 10_000.0
}

/// Cumulative per-species counts for one run.
pub type TallyMap = BTreeMap<String, u64>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeciesCount {
    pub species: String,
    pub count: u64,
}

/// Tally view for the stats table: descending by count, then by name.
pub fn sorted_tallies(tallies: &TallyMap) -> Vec<SpeciesCount> {
    let mut rows: Vec<SpeciesCount> = tallies
        .iter()
        .map(|(species, count)| SpeciesCount {
            species: species.clone(),
            count: *count,
        })
        .collect();
    rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.species.cmp(&b.species)));
    rows
}

/// Running tally and record list of a run.
///
/// Both are only updated through [`DetectionLog::push`], so the tally for a
/// species always equals the number of records carrying it.
#[derive(Debug, Clone, Default)]
pub struct DetectionLog {
    tallies: TallyMap,
    records: Vec<DetectionRecord>,
}

impl DetectionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: DetectionRecord) {
        *self.tallies.entry(record.species.clone()).or_insert(0) += 1;
        self.records.push(record);
    }

    pub fn tallies(&self) -> &TallyMap {
        &self.tallies
    }

    pub fn records(&self) -> &[DetectionRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_parts(self) -> (TallyMap, Vec<DetectionRecord>) {
        (self.tallies, self.records)
    }
}

/// A file the detector failed on while running with
/// [`crate::pipeline::FailurePolicy::SkipFile`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    pub file: String,
    pub error: String,
}
