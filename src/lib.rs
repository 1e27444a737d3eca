pub mod batch;
pub mod config;
pub mod detection;
pub mod error;
pub mod media;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod session;
pub mod status;

pub use batch::{BatchRun, RunOutcome, RunSummary};
pub use config::{ConfigForm, RunConfig};
pub use detection::{Detector, FrameResult, ModelLoader, PredictOptions, YoloLoader};
pub use error::RunError;
pub use models::{DetectionRecord, FrameIndex, MediaFile, MediaKind, SpeciesCount, TallyMap};
pub use pipeline::FailurePolicy;
pub use report::Report;
pub use status::{ConsoleObserver, RunObserver, StatusLevel};

#[cfg(feature = "gui")]
pub mod gui;
