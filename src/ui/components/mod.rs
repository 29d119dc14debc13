//! UI components for Just Breathe
//!
//! Each component borrows the piece of state it renders and reports user
//! intent back to the app instead of acting on it.

mod about;
mod breath_form;
mod history_list;
mod session_panel;
mod tab_bar;

pub use about::AboutView;
pub use breath_form::BreathForm;
pub use history_list::{entry_text, HistoryAction, HistoryList};
pub use session_panel::{SessionAction, SessionPanel};
pub use tab_bar::TabBar;
