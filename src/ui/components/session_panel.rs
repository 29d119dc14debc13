//! Running session display
//!
//! Shows the current cue, overall progress and the Stop / Restart controls.

use crate::session::Phase;
use crate::ui::theme::Theme;
use crate::ui::view::SessionView;
use egui::{self, RichText, Vec2};

/// What the user asked the session panel to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionAction {
    /// Cancel the running session
    Stop,
    /// Run the same session again
    Restart,
    /// Leave the finished session and edit the form
    Back,
}

/// Session panel component
pub struct SessionPanel<'a> {
    view: &'a SessionView,
    theme: &'a Theme,
}

impl<'a> SessionPanel<'a> {
    pub fn new(view: &'a SessionView, theme: &'a Theme) -> Self {
        Self { view, theme }
    }

    pub fn show(self, ui: &mut egui::Ui) -> Option<SessionAction> {
        let mut action = None;

        ui.vertical_centered(|ui| {
            ui.add_space(self.theme.spacing_lg * 2.0);

            let label = if self.view.label.is_empty() {
                " "
            } else {
                self.view.label.as_str()
            };
            let response = ui.label(
                RichText::new(label)
                    .size(36.0)
                    .strong()
                    .color(self.theme.cue_color(self.view.phase)),
            );
            response.widget_info(|| {
                egui::WidgetInfo::labeled(
                    egui::WidgetType::Label,
                    true,
                    format!("Cue: {}", self.view.label),
                )
            });

            ui.add_space(self.theme.spacing_lg);

            let progress = self.view.progress.clamp(0.0, 1.0);
            let response = ui.add(
                egui::ProgressBar::new(progress)
                    .desired_width(ui.available_width().min(420.0))
                    .fill(self.theme.cue_color(self.view.phase).gamma_multiply(0.8))
                    .rounding(self.theme.button_rounding),
            );
            response.widget_info(|| {
                egui::WidgetInfo::labeled(
                    egui::WidgetType::ProgressIndicator,
                    true,
                    format!("Progress: {:.0}%", progress * 100.0),
                )
            });

            ui.add_space(self.theme.spacing_lg);

            match self.view.outcome {
                Some(true) => {
                    ui.horizontal(|ui| {
                        // Center the two buttons
                        let width = 2.0 * 120.0 + self.theme.spacing;
                        ui.add_space(((ui.available_width() - width) / 2.0).max(0.0));

                        if self.button(ui, "Restart", "Restart session").clicked() {
                            action = Some(SessionAction::Restart);
                        }
                        ui.add_space(self.theme.spacing);
                        if self.button(ui, "New session", "New session").clicked() {
                            action = Some(SessionAction::Back);
                        }
                    });
                }
                Some(false) => {}
                None => {
                    let stopping = self.view.phase.is_terminal();
                    if self.button(ui, "Stop", "Stop session").clicked() && !stopping {
                        action = Some(SessionAction::Stop);
                    }
                }
            }

            if self.view.phase == Phase::Finishing {
                ui.add_space(self.theme.spacing_sm);
                ui.label(RichText::new("Finishing up...").color(self.theme.text_muted));
            }
        });

        action
    }

    fn button(&self, ui: &mut egui::Ui, text: &str, label: &'static str) -> egui::Response {
        let response = ui.add(
            egui::Button::new(RichText::new(text).size(16.0))
                .min_size(Vec2::new(120.0, 40.0))
                .rounding(self.theme.button_rounding),
        );
        response.widget_info(|| egui::WidgetInfo::labeled(egui::WidgetType::Button, true, label));
        response
    }
}
