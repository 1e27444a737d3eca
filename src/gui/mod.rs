mod app;
mod message;
mod state;
mod widgets;

pub use app::DashboardApp;
pub use message::{Message, RunEvent};
pub use state::AppState;

/// Open the dashboard window and block until it closes.
pub fn run() -> iced::Result {
    iced::application(DashboardApp::new, DashboardApp::update, DashboardApp::view)
        .title("Benthic AI Dashboard")
        .theme(DashboardApp::theme)
        .window_size((1280.0, 820.0))
        .run()
}
