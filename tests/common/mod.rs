mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from benthic_scan for tests
pub use benthic_scan::{
    BatchRun, DetectionRecord, FailurePolicy, FrameIndex, MediaKind, RunError, RunOutcome,
    StatusLevel,
};
