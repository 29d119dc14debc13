//! Main application struct and eframe integration
//!
//! This module contains the BreatheApp that implements eframe::App.

use crate::session::SessionController;
use crate::storage::PrefsStore;
use crate::ui::components::{AboutView, BreathForm, HistoryList, SessionPanel, TabBar};
use crate::ui::flow::AppFlow;
use crate::ui::state::{HomeScreen, Tab};
use crate::ui::theme::Theme;
use egui::{self, CentralPanel, TopBottomPanel};
use tracing::info;

/// Main Just Breathe application
pub struct BreatheApp {
    /// State and the actions that change it
    flow: AppFlow,
    /// Visual theme
    theme: Theme,
    /// Whether the app has been initialized
    initialized: bool,
}

impl BreatheApp {
    /// Create a new Just Breathe application
    pub fn new(cc: &eframe::CreationContext<'_>, controller: SessionController, prefs: PrefsStore) -> Self {
        let theme = Theme::dark();
        theme.apply(&cc.egui_ctx);

        let flow = AppFlow::new(controller, prefs);
        flow.state().session_view.attach(cc.egui_ctx.clone());

        Self {
            flow,
            theme,
            initialized: false,
        }
    }

    /// Called on the first frame
    fn initialize(&mut self) {
        if self.initialized {
            return;
        }

        info!("Just Breathe UI initialized");
        self.initialized = true;
    }

    fn show_header(&mut self, ctx: &egui::Context) {
        TopBottomPanel::top("header")
            .frame(egui::Frame::none().fill(self.theme.bg_secondary).inner_margin(12.0))
            .show(ctx, |ui| {
                if let Some(tab) = TabBar::new(self.flow.state().tab, &self.theme).show(ui) {
                    self.flow.select_tab(tab);
                }
            });
    }

    fn show_content(&mut self, ctx: &egui::Context) {
        let mut start = None;
        let mut session_action = None;
        let mut history_action = None;

        CentralPanel::default()
            .frame(
                egui::Frame::none()
                    .fill(self.theme.bg_primary)
                    .inner_margin(self.theme.spacing_lg),
            )
            .show(ctx, |ui| {
                let theme = &self.theme;
                let state = self.flow.state_mut();
                match state.tab {
                    Tab::Home => match state.home {
                        HomeScreen::Form => {
                            start = BreathForm::new(&mut state.form, theme).show(ui);
                        }
                        HomeScreen::Session => {
                            let snapshot = state.session_view.snapshot();
                            session_action = SessionPanel::new(&snapshot, theme).show(ui);
                        }
                    },
                    Tab::History => {
                        history_action = HistoryList::new(&state.history, theme).show(ui);
                    }
                    Tab::About => AboutView::new(theme).show(ui),
                }
            });

        if let Some(prefs) = start {
            self.flow.start_session(prefs);
        }
        if let Some(action) = session_action {
            self.flow.handle_session_action(action);
        }
        if let Some(action) = history_action {
            self.flow.handle_history_action(action);
        }
    }
}

impl eframe::App for BreatheApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Initialize on first frame
        self.initialize();

        self.flow.poll_session();

        self.show_header(ctx);
        self.show_content(ctx);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.flow.shutdown();
        info!("Just Breathe shutting down");
    }
}
