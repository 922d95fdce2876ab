//! Runtime for the home screen.
//!
//! The Runtime drives the home screen's event loop, coordinating between:
//! - [`HomeScreen`]: view-model state machine
//! - [`Bridge`]: session operations
//! - [`Presenter`]: platform-specific rendering and navigation
//!
//! Room lists arrive from the coordinator's watch channel; session callbacks
//! are observed for logging. The loop ends when the coordinator stops
//! publishing, which happens once the session is shut down.

use std::sync::Arc;

use roomsync_client::{SessionCallback, SyncState};
use roomsync_core::SessionSdk;
use tokio::sync::{broadcast, watch};

use crate::{Bridge, HomeAction, HomeEvent, HomeScreen};

/// Platform side of the home screen.
pub trait Presenter: Send {
    /// Render the screen.
    fn present(&mut self, home: &HomeScreen);

    /// Perform a navigation action. Defaults to ignoring it.
    fn navigate(&mut self, action: &HomeAction) {
        let _ = action;
    }
}

/// Orchestrates the home screen, the bridge and a presenter.
pub struct Runtime<S: SessionSdk, P: Presenter> {
    home: HomeScreen,
    bridge: Bridge<S>,
    presenter: P,
    states: watch::Receiver<Arc<SyncState>>,
    callbacks: broadcast::Receiver<SessionCallback>,
}

impl<S: SessionSdk, P: Presenter> Runtime<S, P> {
    /// Create a runtime fed by a coordinator's state channel.
    pub fn new(bridge: Bridge<S>, states: watch::Receiver<Arc<SyncState>>, presenter: P) -> Self {
        let home = HomeScreen::new(bridge.client().current_user_id().clone());
        let callbacks = bridge.client().callbacks();
        Self { home, bridge, presenter, states, callbacks }
    }

    /// Home screen state.
    pub fn home(&self) -> &HomeScreen {
        &self.home
    }

    /// Load the user's profile and verification state, then forward every
    /// published room list until the coordinator stops.
    ///
    /// Returns the final home screen state.
    pub async fn run(mut self) -> HomeScreen {
        let events = self.bridge.load_home().await;
        self.process_events(events).await;

        let initial = self.states.borrow_and_update().rooms.clone();
        self.process_events(vec![HomeEvent::RoomsUpdated(initial)]).await;

        let mut callbacks_open = true;
        loop {
            tokio::select! {
                changed = self.states.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let rooms = self.states.borrow_and_update().rooms.clone();
                    self.process_events(vec![HomeEvent::RoomsUpdated(rooms)]).await;
                },
                callback = self.callbacks.recv(), if callbacks_open => match callback {
                    Ok(callback) => tracing::trace!(?callback, "session callback"),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::debug!(skipped, "session callbacks lagged");
                    },
                    // The coordinator's state channel decides when to stop.
                    Err(broadcast::error::RecvError::Closed) => callbacks_open = false,
                },
            }
        }

        tracing::debug!(user_id = %self.home.user_id(), "home runtime stopped");
        self.home
    }

    /// Execute actions produced by the home screen, feeding resulting events
    /// back until none are left.
    pub async fn dispatch(&mut self, initial_actions: Vec<HomeAction>) {
        let mut pending_actions = initial_actions;

        while !pending_actions.is_empty() {
            let actions = std::mem::take(&mut pending_actions);

            for action in actions {
                match action {
                    HomeAction::Render => self.presenter.present(&self.home),
                    HomeAction::OpenRoom { .. }
                    | HomeAction::ShowSettings
                    | HomeAction::ShowStartChat => self.presenter.navigate(&action),
                    HomeAction::StartVerification => {
                        let events = self.bridge.process_home_action(action).await;
                        for event in events {
                            pending_actions.extend(self.home.handle(event));
                        }
                    },
                }
            }
        }
    }

    async fn process_events(&mut self, events: Vec<HomeEvent>) {
        let mut actions = Vec::new();
        for event in events {
            actions.extend(self.home.handle(event));
        }
        actions.dedup();
        self.dispatch(actions).await;
    }
}
