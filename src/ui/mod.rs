//! GUI implementation with egui/eframe
//!
//! This module provides the desktop user interface for Just Breathe using the
//! eframe framework.

mod app;
pub mod components;
mod flow;
mod state;
mod theme;
mod view;

pub use app::BreatheApp;
pub use flow::AppFlow;
pub use state::{AppState, DurationChoice, FormState, HomeScreen, Tab};
pub use theme::Theme;
pub use view::{SessionView, SharedSessionView};

use crate::session::SessionController;
use crate::storage::PrefsStore;

/// Run the Just Breathe window until it is closed
pub fn run(controller: SessionController, prefs: PrefsStore) -> eframe::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([640.0, 560.0])
            .with_min_inner_size([420.0, 420.0])
            .with_title("Just Breathe"),
        ..Default::default()
    };

    eframe::run_native(
        "Just Breathe",
        options,
        Box::new(|cc| Ok(Box::new(BreatheApp::new(cc, controller, prefs)))),
    )
}
