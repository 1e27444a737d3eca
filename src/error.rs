use std::path::PathBuf;

/// Failures that end a run before or during processing.
///
/// Every variant is reported on the status surface before it is returned,
/// so the display strings double as the user-facing messages.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("Please define both Input and Output folders.")]
    MissingFolders,

    #[error("Input folder not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("Model file not found: {}", .0.display())]
    ModelNotFound(PathBuf),

    #[error("Output Error: {source}")]
    OutputCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Model Load Error: {0:#}")]
    ModelLoad(#[source] anyhow::Error),

    #[error("Failed to read input folder {}: {source}", .path.display())]
    ListMedia {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Detection failed on {file}: {source:#}")]
    Detection {
        file: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Failed to write report {}: {source}", .path.display())]
    Report {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}
