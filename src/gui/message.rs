use std::path::PathBuf;

use iced::widget::image::Handle;

use crate::models::SpeciesCount;
use crate::report::Report;
use crate::status::StatusLevel;

#[derive(Debug, Clone)]
pub enum Message {
    InputDirChanged(String),
    OutputDirChanged(String),
    ModelPathChanged(String),
    LabelsPathChanged(String),
    ConfidenceChanged(f32),
    StrideChanged(u32),
    BrowseInput,
    BrowseOutput,
    BrowseModel,
    BrowseLabels,
    InputPicked(Option<PathBuf>),
    OutputPicked(Option<PathBuf>),
    ModelPicked(Option<PathBuf>),
    LabelsPicked(Option<PathBuf>),
    Start,
    Run(RunEvent),
}

/// Updates streamed from the worker thread running a batch.
#[derive(Debug, Clone)]
pub enum RunEvent {
    Status(StatusLevel, String),
    Progress(f32),
    Tallies(Vec<SpeciesCount>),
    Frame(Handle, String),
    Report(Report),
    Finished(Result<(), String>),
}
