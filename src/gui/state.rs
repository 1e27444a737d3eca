use iced::widget::image::Handle;

use crate::config::ConfigForm;
use crate::models::SpeciesCount;
use crate::report::Report;
use crate::status::StatusLevel;

use super::message::RunEvent;

#[derive(Debug)]
pub struct AppState {
    pub form: ConfigForm,
    pub status: (StatusLevel, String),
    pub progress: f32,
    pub running: bool,
    pub live_frame: Option<(Handle, String)>,
    pub tallies: Vec<SpeciesCount>,
    pub report: Option<Report>,
    /// Form problems shown under the start button
    pub form_error: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            form: ConfigForm::default(),
            status: (
                StatusLevel::Info,
                "👋 Ready. Supports Images (.jpg, .png) and Videos (.mp4, .avi, .mov).".to_string(),
            ),
            progress: 0.0,
            running: false,
            live_frame: None,
            tallies: Vec::new(),
            report: None,
            form_error: None,
        }
    }
}

impl AppState {
    /// Clear the result panels before a new run. The form is kept.
    pub fn begin_run(&mut self) {
        self.progress = 0.0;
        self.running = true;
        self.live_frame = None;
        self.tallies.clear();
        self.report = None;
        self.form_error = None;
    }

    pub fn apply(&mut self, event: RunEvent) {
        match event {
            RunEvent::Status(level, message) => self.status = (level, message),
            RunEvent::Progress(fraction) => self.progress = fraction.clamp(0.0, 1.0),
            RunEvent::Tallies(rows) => self.tallies = rows,
            RunEvent::Frame(handle, caption) => self.live_frame = Some((handle, caption)),
            RunEvent::Report(report) => self.report = Some(report),
            RunEvent::Finished(result) => {
                self.running = false;
                if let Err(error) = result {
                    tracing::error!(%error, "run ended with error");
                }
            }
        }
    }
}
