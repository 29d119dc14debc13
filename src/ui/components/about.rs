//! About tab

use crate::ui::theme::Theme;
use egui::{self, RichText};

const ABOUT_TEXT: &[&str] = &[
    "Just Breathe guides you through slow, paced breathing.",
    "Pick how long to breathe in and out and how many minutes to practice. \
     After a short countdown a calm voice tells you when to breathe in and when to breathe out, \
     and the progress bar shows how far along you are.",
    "A session always ends on an out-breath. Completed and stopped sessions are kept in History \
     so you can repeat a rhythm you liked.",
    "Everything stays on this computer.",
];

pub struct AboutView<'a> {
    theme: &'a Theme,
}

impl<'a> AboutView<'a> {
    pub fn new(theme: &'a Theme) -> Self {
        Self { theme }
    }

    pub fn show(self, ui: &mut egui::Ui) {
        ui.heading(RichText::new("About").color(self.theme.text_primary));
        ui.add_space(self.theme.spacing_sm);

        for paragraph in ABOUT_TEXT {
            ui.label(RichText::new(*paragraph).color(self.theme.text_secondary));
            ui.add_space(self.theme.spacing_sm);
        }
    }
}
