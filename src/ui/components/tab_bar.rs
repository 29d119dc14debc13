//! Top navigation between Home, History and About

use crate::ui::state::Tab;
use crate::ui::theme::Theme;
use egui::{self, RichText};

/// Tab bar component
pub struct TabBar<'a> {
    selected: Tab,
    theme: &'a Theme,
}

impl<'a> TabBar<'a> {
    pub fn new(selected: Tab, theme: &'a Theme) -> Self {
        Self { selected, theme }
    }

    /// Returns the tab the user clicked, if it differs from the current one
    pub fn show(self, ui: &mut egui::Ui) -> Option<Tab> {
        let mut picked = None;

        ui.horizontal(|ui| {
            ui.label(
                RichText::new("Just Breathe")
                    .size(20.0)
                    .strong()
                    .color(self.theme.text_primary),
            );

            ui.add_space(self.theme.spacing);

            for tab in Tab::ALL {
                let selected = tab == self.selected;
                let color = if selected {
                    self.theme.primary
                } else {
                    self.theme.text_secondary
                };

                let response = ui.selectable_label(
                    selected,
                    RichText::new(tab.title()).size(15.0).color(color),
                );
                response.widget_info(|| {
                    egui::WidgetInfo::selected(
                        egui::WidgetType::SelectableLabel,
                        true,
                        selected,
                        format!("{} tab", tab.title()),
                    )
                });

                if response.clicked() && !selected {
                    picked = Some(tab);
                }
            }
        });

        picked
    }
}
