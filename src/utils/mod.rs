pub mod format;

pub use format::{format_number, format_session_date, format_session_date_at};
