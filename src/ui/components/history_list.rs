//! History tab
//!
//! Lists past sessions newest first. Clicking one loads its values into the
//! form.

use crate::storage::HistoryEntry;
use crate::ui::theme::Theme;
use crate::utils::{format_number, format_session_date};
use egui::{self, RichText};

const EMPTY_TEXT: &str = "No sessions yet. Your completed sessions will appear here.";

/// What the user asked the history list to do
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryAction {
    /// Reuse the values of a past session
    Select(HistoryEntry),
    /// Go to the form from the empty state
    StartNew,
}

/// History list component
pub struct HistoryList<'a> {
    entries: &'a [HistoryEntry],
    theme: &'a Theme,
}

impl<'a> HistoryList<'a> {
    pub fn new(entries: &'a [HistoryEntry], theme: &'a Theme) -> Self {
        Self { entries, theme }
    }

    pub fn show(self, ui: &mut egui::Ui) -> Option<HistoryAction> {
        ui.heading(RichText::new("History").color(self.theme.text_primary));
        ui.add_space(self.theme.spacing_sm);

        if self.entries.is_empty() {
            return self.show_empty(ui);
        }

        let mut action = None;

        egui::ScrollArea::vertical()
            .id_salt("history")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for entry in self.entries {
                    let text = entry_text(entry);
                    let response = ui.add(
                        egui::Button::new(RichText::new(&text).color(self.theme.text_secondary))
                            .fill(self.theme.bg_secondary)
                            .rounding(self.theme.button_rounding)
                            .min_size(egui::vec2(ui.available_width(), 36.0)),
                    );
                    response.widget_info(|| {
                        egui::WidgetInfo::labeled(
                            egui::WidgetType::Button,
                            true,
                            format!("History entry: {}", text),
                        )
                    });

                    if response.on_hover_text("Use these settings").clicked() {
                        action = Some(HistoryAction::Select(entry.clone()));
                    }
                }
            });

        action
    }

    fn show_empty(&self, ui: &mut egui::Ui) -> Option<HistoryAction> {
        let response = ui.label(RichText::new(EMPTY_TEXT).color(self.theme.text_muted));
        response.widget_info(|| {
            egui::WidgetInfo::labeled(egui::WidgetType::Label, true, EMPTY_TEXT)
        });

        ui.add_space(self.theme.spacing);

        let response = ui.add(
            egui::Button::new("Start a session").rounding(self.theme.button_rounding),
        );
        response.widget_info(|| {
            egui::WidgetInfo::labeled(egui::WidgetType::Button, true, "Start a session")
        });

        response.clicked().then_some(HistoryAction::StartNew)
    }
}

/// One history row, e.g. `Today · 9:05 AM · In: 4.5s, Out: 4.5s, Duration: 10 min`
pub fn entry_text(entry: &HistoryEntry) -> String {
    format!(
        "{} · In: {}s, Out: {}s, Duration: {} min",
        format_session_date(entry.timestamp),
        format_number(entry.in_sec),
        format_number(entry.out_sec),
        format_number(entry.duration),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionParams;

    #[test]
    fn test_entry_text() {
        let entry = HistoryEntry::new(
            chrono::Utc::now().timestamp_millis(),
            &SessionParams::new(4.5, 6.0, 10.0),
        );
        let text = entry_text(&entry);
        assert!(text.starts_with("Today · "));
        assert!(text.ends_with(" · In: 4.5s, Out: 6s, Duration: 10 min"));
    }
}
