//! What the app does in response to the user, without a window
//!
//! [`AppFlow`] owns the UI state together with the stores and the session
//! controller. Components report intent, the flow acts on it, and the egui
//! side only renders `state()`.

use crate::session::{SessionController, SessionHandle};
use crate::storage::{HistoryStore, Prefs, PrefsStore};
use crate::ui::components::{HistoryAction, SessionAction};
use crate::ui::state::{AppState, HomeScreen, Tab};
use std::sync::Arc;
use tracing::{debug, info};

pub struct AppFlow {
    state: AppState,
    controller: SessionController,
    prefs: PrefsStore,
    history: HistoryStore,
    /// The current session, until its outcome has been handled
    session: Option<SessionHandle>,
}

impl AppFlow {
    /// Start from the saved prefs and history
    pub fn new(controller: SessionController, prefs: PrefsStore) -> Self {
        let history = controller.history().clone();
        let state = AppState::with_saved(&prefs.load(), history.list());

        Self {
            state,
            controller,
            prefs,
            history,
            session: None,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut AppState {
        &mut self.state
    }

    /// Check if a session is running or its outcome is still unhandled
    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// Save `prefs` and run a session with them
    pub fn start_session(&mut self, prefs: Prefs) {
        if let Some(previous) = self.session.take() {
            previous.stop();
        }

        self.prefs.save(&prefs);

        self.state.session_view.reset();
        let view = self.state.session_view.clone();
        let finished = view.clone();

        let handle = self
            .controller
            .start(prefs.params(), Arc::new(view), move |completed| {
                finished.finish(completed)
            });

        debug!("Session {} started from the form", handle.id());
        self.session = Some(handle);
        self.state.tab = Tab::Home;
        self.state.home = HomeScreen::Session;
    }

    /// React to the session ending
    pub fn poll_session(&mut self) {
        if self.session.is_none() {
            return;
        }

        let Some(completed) = self.state.session_view.snapshot().outcome else {
            return;
        };

        self.session = None;
        self.state.history = self.history.list();

        if completed {
            debug!("Session completed");
        } else {
            debug!("Session stopped, back to the form");
            self.state.show_form();
        }
    }

    pub fn handle_session_action(&mut self, action: SessionAction) {
        match action {
            SessionAction::Stop => {
                if let Some(session) = &self.session {
                    session.stop();
                }
            }
            // Same settings again; the form still holds what was started
            SessionAction::Restart => match self.state.form.to_prefs() {
                Ok(prefs) => self.start_session(prefs),
                Err(message) => {
                    self.state.show_form();
                    self.state.form.error = Some(message);
                }
            },
            SessionAction::Back => self.state.show_form(),
        }
    }

    pub fn handle_history_action(&mut self, action: HistoryAction) {
        match action {
            HistoryAction::Select(entry) => {
                if self.session.is_some() {
                    // Keep the running session on screen
                    self.state.tab = Tab::Home;
                    return;
                }
                self.state.form.prefill(&entry);
                self.state.show_form();
            }
            HistoryAction::StartNew => {
                if self.session.is_some() {
                    self.state.tab = Tab::Home;
                } else {
                    self.state.show_form();
                }
            }
        }
    }

    /// Switch tabs, reloading history when it is opened
    pub fn select_tab(&mut self, tab: Tab) {
        if tab == Tab::History {
            self.state.history = self.history.list();
        }
        self.state.tab = tab;
    }

    /// Stop whatever is running
    pub fn shutdown(&mut self) {
        if let Some(session) = self.session.take() {
            info!("Stopping session {} on exit", session.id());
            session.stop();
        }
    }
}

impl std::fmt::Debug for AppFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppFlow")
            .field("state", &self.state)
            .field("session", &self.session.as_ref().map(|s| s.id()))
            .finish_non_exhaustive()
    }
}
