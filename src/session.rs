use std::path::{Path, PathBuf};

use time::OffsetDateTime;
use time::macros::format_description;

use crate::config::RunConfig;
use crate::detection::{Detector, ModelLoader};
use crate::error::RunError;
use crate::status::{RunObserver, StatusLevel};

/// Timestamped directory holding every artifact of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunDirectory {
    path: PathBuf,
}

impl RunDirectory {
    /// `output_dir/Run_<YYYY-MM-DD_HH-MM-SS>`, created along with any missing
    /// parents. An existing directory of the same name is not an error.
    pub fn create(output_dir: &Path, started_at: OffsetDateTime) -> std::io::Result<Self> {
        let path = output_dir.join(run_dir_name(started_at));
        std::fs::create_dir_all(&path)?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn into_path(self) -> PathBuf {
        self.path
    }
}

pub fn run_dir_name(started_at: OffsetDateTime) -> String {
    let format = format_description!("[year]-[month]-[day]_[hour]-[minute]-[second]");
    // The description only uses numeric components, which always format.
    let stamp = started_at
        .format(&format)
        .unwrap_or_else(|_| started_at.unix_timestamp().to_string());
    format!("Run_{}", stamp)
}

/// Local wall-clock time, falling back to UTC when the offset is unknown.
pub fn now() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

/// Validate paths, create the run directory and load the model.
pub fn initialize(
    config: &RunConfig,
    loader: &dyn ModelLoader,
    observer: &mut dyn RunObserver,
) -> Result<(RunDirectory, Box<dyn Detector>), RunError> {
    initialize_at(config, loader, observer, now())
}

/// [`initialize`] with an explicit start time.
pub fn initialize_at(
    config: &RunConfig,
    loader: &dyn ModelLoader,
    observer: &mut dyn RunObserver,
    started_at: OffsetDateTime,
) -> Result<(RunDirectory, Box<dyn Detector>), RunError> {
    let result = try_initialize(config, loader, observer, started_at);
    if let Err(error) = &result {
        tracing::debug!(error = %error, "run initialization failed");
        observer.status(StatusLevel::Error, &format!("❌ {}", error));
    }
    result
}

fn try_initialize(
    config: &RunConfig,
    loader: &dyn ModelLoader,
    observer: &mut dyn RunObserver,
    started_at: OffsetDateTime,
) -> Result<(RunDirectory, Box<dyn Detector>), RunError> {
    if !config.input_dir.exists() {
        return Err(RunError::InputNotFound(config.input_dir.clone()));
    }
    if !config.model_path.exists() {
        return Err(RunError::ModelNotFound(config.model_path.clone()));
    }

    let run_dir = RunDirectory::create(&config.output_dir, started_at).map_err(|source| {
        RunError::OutputCreate {
            path: config.output_dir.join(run_dir_name(started_at)),
            source,
        }
    })?;
    observer.status(
        StatusLevel::Info,
        &format!("📂 Output folder created: {}", run_dir.name()),
    );
    tracing::info!(path = %run_dir.path().display(), "run directory ready");

    let detector = loader
        .load(&config.model_path, config.labels_path.as_deref())
        .map_err(RunError::ModelLoad)?;
    Ok((run_dir, detector))
}
