//! Breathing session: parameters, phases and the controller that runs them

pub mod controller;
pub mod params;
pub mod view;

pub use controller::{SessionConfig, SessionController, SessionHandle};
pub use params::{Cue, Phase, SessionParams};
pub use view::ViewSink;
