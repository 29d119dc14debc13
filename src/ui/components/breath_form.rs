//! Breathing form
//!
//! Breath lengths, session duration and the start button.

use crate::storage::prefs::BREATH_RANGE;
use crate::storage::Prefs;
use crate::ui::state::{DurationChoice, FormState};
use crate::ui::theme::Theme;
use egui::{self, RichText};

const INSTRUCTIONS: &str = "Breathe in through your nose and out through your mouth. \
Follow the voice, or watch the words if your sound is off.";

/// Breathing form component
pub struct BreathForm<'a> {
    form: &'a mut FormState,
    theme: &'a Theme,
}

impl<'a> BreathForm<'a> {
    pub fn new(form: &'a mut FormState, theme: &'a Theme) -> Self {
        Self { form, theme }
    }

    /// Returns validated prefs when the user asks to start
    pub fn show(mut self, ui: &mut egui::Ui) -> Option<Prefs> {
        let mut start = None;

        ui.label(RichText::new(INSTRUCTIONS).color(self.theme.text_secondary));
        ui.add_space(self.theme.spacing);

        egui::Frame::none()
            .fill(self.theme.bg_secondary)
            .rounding(self.theme.card_rounding)
            .inner_margin(self.theme.spacing)
            .show(ui, |ui| {
                egui::Grid::new("breath_form")
                    .num_columns(2)
                    .spacing([self.theme.spacing, self.theme.spacing_sm])
                    .show(ui, |ui| {
                        ui.label("Breathe in (seconds)");
                        seconds_input(ui, &mut self.form.in_sec, "Breathe in seconds");
                        ui.end_row();

                        ui.label("Breathe out (seconds)");
                        seconds_input(ui, &mut self.form.out_sec, "Breathe out seconds");
                        ui.end_row();

                        ui.label("Duration (minutes)");
                        self.show_duration_select(ui);
                        ui.end_row();

                        if self.form.duration == DurationChoice::Custom {
                            ui.label("Custom minutes");
                            let response = ui.add(
                                egui::TextEdit::singleline(&mut self.form.custom_duration)
                                    .hint_text("1-180")
                                    .desired_width(80.0),
                            );
                            response.widget_info(|| {
                                egui::WidgetInfo::labeled(
                                    egui::WidgetType::TextEdit,
                                    true,
                                    "Custom duration",
                                )
                            });
                            if response.changed() {
                                self.form.error = None;
                            }
                            ui.end_row();
                        }
                    });

                if let Some(error) = &self.form.error {
                    ui.add_space(self.theme.spacing_sm);
                    let response = ui.label(RichText::new(error).color(self.theme.error));
                    response.widget_info(|| {
                        egui::WidgetInfo::labeled(
                            egui::WidgetType::Label,
                            true,
                            format!("Form error: {}", error),
                        )
                    });
                }

                ui.add_space(self.theme.spacing);

                let button = egui::Button::new(
                    RichText::new("Start").size(16.0).color(self.theme.text_primary),
                )
                .fill(self.theme.primary.gamma_multiply(0.6))
                .rounding(self.theme.button_rounding);

                let response = ui.add(button);
                response.widget_info(|| {
                    egui::WidgetInfo::labeled(egui::WidgetType::Button, true, "Start session")
                });

                if response.clicked() {
                    match self.form.to_prefs() {
                        Ok(prefs) => {
                            self.form.error = None;
                            start = Some(prefs);
                        }
                        Err(message) => self.form.error = Some(message),
                    }
                }
            });

        start
    }

    fn show_duration_select(&mut self, ui: &mut egui::Ui) {
        let before = self.form.duration;

        let response = egui::ComboBox::from_id_salt("duration_select")
            .selected_text(self.form.duration.label())
            .show_ui(ui, |ui| {
                for choice in DurationChoice::options() {
                    ui.selectable_value(&mut self.form.duration, choice, choice.label());
                }
            })
            .response;
        response.widget_info(|| {
            egui::WidgetInfo::labeled(egui::WidgetType::ComboBox, true, "Duration")
        });

        if self.form.duration != before {
            self.form.error = None;
        }
    }
}

fn seconds_input(ui: &mut egui::Ui, value: &mut f64, label: &'static str) {
    let response = ui.add(
        egui::DragValue::new(value)
            .speed(0.1)
            .range(BREATH_RANGE)
            .fixed_decimals(1)
            .suffix(" s"),
    );
    response.widget_info(|| egui::WidgetInfo::labeled(egui::WidgetType::DragValue, true, label));
}
