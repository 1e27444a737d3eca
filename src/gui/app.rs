use iced::futures::channel::mpsc::{self, UnboundedSender};
use iced::widget::{
    button, column, container, image as picture, progress_bar, row, slider, text, text_input,
};
use iced::{Element, Length, Task, Theme};
use image::RgbaImage;
use rfd::AsyncFileDialog;

use crate::batch::BatchRun;
use crate::config::{CONFIDENCE_STEP, MAX_FRAME_STRIDE, MIN_FRAME_STRIDE};
use crate::detection::YoloLoader;
use crate::models::SpeciesCount;
use crate::report::Report;
use crate::status::{RunObserver, StatusLevel};

use super::message::RunEvent;
use super::widgets::{bar_chart, layout, species_table, status_color};
use super::{AppState, Message};

pub struct DashboardApp {
    state: AppState,
}

impl DashboardApp {
    pub fn new() -> (Self, Task<Message>) {
        (
            Self {
                state: AppState::default(),
            },
            Task::none(),
        )
    }

    pub fn theme(&self) -> Theme {
        Theme::Dark
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::InputDirChanged(value) => self.state.form.input_dir = value,
            Message::OutputDirChanged(value) => self.state.form.output_dir = value,
            Message::ModelPathChanged(value) => self.state.form.model_path = value,
            Message::LabelsPathChanged(value) => self.state.form.labels_path = value,
            Message::ConfidenceChanged(value) => self.state.form.set_confidence(value),
            Message::StrideChanged(value) => self.state.form.set_frame_stride(value),
            Message::BrowseInput => {
                return Task::perform(
                    AsyncFileDialog::new()
                        .set_title("Folder with images/videos")
                        .pick_folder(),
                    |handle| Message::InputPicked(handle.map(|h| h.path().to_path_buf())),
                );
            }
            Message::BrowseOutput => {
                return Task::perform(
                    AsyncFileDialog::new()
                        .set_title("Folder to save results")
                        .pick_folder(),
                    |handle| Message::OutputPicked(handle.map(|h| h.path().to_path_buf())),
                );
            }
            Message::BrowseModel => {
                return Task::perform(
                    AsyncFileDialog::new()
                        .set_title("Detection model")
                        .add_filter("Model", &["rten"])
                        .pick_file(),
                    |handle| Message::ModelPicked(handle.map(|h| h.path().to_path_buf())),
                );
            }
            Message::BrowseLabels => {
                return Task::perform(
                    AsyncFileDialog::new()
                        .set_title("Class names file")
                        .add_filter("Labels", &["txt"])
                        .pick_file(),
                    |handle| Message::LabelsPicked(handle.map(|h| h.path().to_path_buf())),
                );
            }
            Message::InputPicked(Some(path)) => {
                self.state.form.input_dir = path.display().to_string();
            }
            Message::OutputPicked(Some(path)) => {
                self.state.form.output_dir = path.display().to_string();
            }
            Message::ModelPicked(Some(path)) => {
                self.state.form.model_path = path.display().to_string();
            }
            Message::LabelsPicked(Some(path)) => {
                self.state.form.labels_path = path.display().to_string();
            }
            Message::InputPicked(None)
            | Message::OutputPicked(None)
            | Message::ModelPicked(None)
            | Message::LabelsPicked(None) => {}
            Message::Start => return self.start(),
            Message::Run(event) => self.state.apply(event),
        }
        Task::none()
    }

    fn start(&mut self) -> Task<Message> {
        if self.state.running {
            return Task::none();
        }
        let config = match self.state.form.submit() {
            Ok(config) => config,
            Err(error) => {
                self.state.form_error = Some(format!("⚠️ {}", error));
                return Task::none();
            }
        };
        self.state.begin_run();
        tracing::info!(input = %config.input_dir.display(), "starting run from dashboard");

        let (sender, receiver) = mpsc::unbounded();
        std::thread::spawn(move || {
            let mut observer = ChannelObserver { sender };
            let loader = YoloLoader::default();
            let result = BatchRun::new(config)
                .run(&loader, &mut observer)
                .map(|_| ())
                .map_err(|error| error.to_string());
            observer.send(RunEvent::Finished(result));
        });

        Task::run(receiver, Message::Run)
    }

    pub fn view(&self) -> Element<'_, Message> {
        layout(self.control_panel(), self.dashboard())
    }

    fn control_panel(&self) -> Element<'_, Message> {
        let form = &self.state.form;

        let start = button(text("🚀 Start Detection"))
            .width(Length::Fill)
            .on_press_maybe((!self.state.running).then_some(Message::Start));

        let mut panel = column![
            text("🎛️ Control Panel").size(24),
            text("Instructions:\n1. Copy folder paths.\n2. Set confidence.\n3. Click Start."),
            text("1. Data Configuration").size(18),
            text("📂 Input Folder:"),
            row![
                text_input("Path to folder with images/videos", &form.input_dir)
                    .on_input(Message::InputDirChanged),
                button("…").on_press(Message::BrowseInput),
            ]
            .spacing(5),
            text("💾 Output Folder:"),
            row![
                text_input("Path to save results", &form.output_dir)
                    .on_input(Message::OutputDirChanged),
                button("…").on_press(Message::BrowseOutput),
            ]
            .spacing(5),
            text("2. Model Settings").size(18),
            text("Model File (.rten):"),
            row![
                text_input("best.rten", &form.model_path).on_input(Message::ModelPathChanged),
                button("…").on_press(Message::BrowseModel),
            ]
            .spacing(5),
            text("Class Names (.txt, optional):"),
            row![
                text_input("<model>.txt", &form.labels_path).on_input(Message::LabelsPathChanged),
                button("…").on_press(Message::BrowseLabels),
            ]
            .spacing(5),
            text(format!("Confidence Threshold: {:.2}", form.confidence)),
            slider(0.0..=1.0, form.confidence, Message::ConfidenceChanged).step(CONFIDENCE_STEP),
            text("3. Video Optimization").size(18),
            text(format!("Frame Stride (Video Only): {}", form.frame_stride)),
            slider(
                MIN_FRAME_STRIDE..=MAX_FRAME_STRIDE,
                form.frame_stride,
                Message::StrideChanged
            ),
            start,
        ]
        .spacing(10)
        .padding(10);

        if let Some(error) = &self.state.form_error {
            panel = panel.push(text(error.clone()).color(status_color(StatusLevel::Error)));
        }

        panel.into()
    }

    fn dashboard(&self) -> Element<'_, Message> {
        let (level, message) = &self.state.status;

        let live_view: Element<'_, Message> = match &self.state.live_frame {
            Some((handle, caption)) => column![
                picture(handle.clone()).width(Length::Fill),
                text(caption.clone()).size(14),
            ]
            .spacing(4)
            .into(),
            None => text("Live detection feed will appear here.").size(14).into(),
        };

        let mut content = column![
            text("🌊 Benthic Live Dashboard").size(30),
            text(message.clone()).color(status_color(*level)),
            progress_bar(0.0..=1.0, self.state.progress),
            row![
                column![text("👁️ Live Detection View").size(20), live_view]
                    .spacing(8)
                    .width(Length::FillPortion(2)),
                column![
                    text("📊 Cumulative Mission Counts").size(20),
                    species_table(&self.state.tallies),
                ]
                .spacing(8)
                .width(Length::FillPortion(1)),
            ]
            .spacing(20),
        ]
        .spacing(15);

        if let Some(report) = &self.state.report {
            content = content.push(summary(report));
        }

        container(content).width(Length::Fill).into()
    }
}

fn summary<'a>(report: &Report) -> Element<'a, Message> {
    let species: Vec<(String, u64)> = report
        .species_totals
        .iter()
        .map(|row| (row.species.clone(), row.count))
        .collect();
    let types: Vec<(String, u64)> = report
        .type_totals
        .iter()
        .map(|(kind, count)| (kind.to_string(), *count))
        .collect();

    column![
        text(format!(
            "📊 Detailed CSV report saved to: {}",
            report.csv_path.display()
        ))
        .color(status_color(StatusLevel::Success)),
        text("📈 Mission Summary").size(20),
        row![
            container(bar_chart("Total Species Abundance", &species)).width(Length::FillPortion(1)),
            container(bar_chart("Detections by Media Type", &types)).width(Length::FillPortion(1)),
        ]
        .spacing(20),
    ]
    .spacing(10)
    .into()
}

/// Forwards run updates to the dashboard over a channel.
struct ChannelObserver {
    sender: UnboundedSender<RunEvent>,
}

impl ChannelObserver {
    fn send(&self, event: RunEvent) {
        // The receiver only goes away when the window closes.
        let _ = self.sender.unbounded_send(event);
    }
}

impl RunObserver for ChannelObserver {
    fn status(&mut self, level: StatusLevel, message: &str) {
        self.send(RunEvent::Status(level, message.to_string()));
    }

    fn progress(&mut self, fraction: f32) {
        self.send(RunEvent::Progress(fraction));
    }

    fn tallies(&mut self, rows: &[SpeciesCount]) {
        self.send(RunEvent::Tallies(rows.to_vec()));
    }

    fn frame(&mut self, image: &RgbaImage, caption: &str) {
        let handle =
            picture::Handle::from_rgba(image.width(), image.height(), image.as_raw().clone());
        self.send(RunEvent::Frame(handle, caption.to_string()));
    }

    fn report(&mut self, report: &Report) {
        self.send(RunEvent::Report(report.clone()));
    }
}
