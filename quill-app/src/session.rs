//! The signed-in user for the whole application.
//!
//! A [`Session`] is created once at start-up by [`Session::init`], handed by
//! reference to whatever renders navigation or needs to know who is signed
//! in, and torn down by [`Session::logout`]. Only the session itself changes
//! the user.

use crate::notice::Notifier;
use quill_client::{ApiClient, ApiError};
use quill_common::model::user::User;
use std::sync::Arc;
use tracing::{debug, error, warn};

#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub enum SessionState {
    /// The current-user check has not finished yet.
    Loading,
    Anonymous,
    SignedIn(User),
}

#[derive(Debug)]
pub struct Session {
    client: Arc<ApiClient>,
    notifier: Notifier,
    state: SessionState,
}

impl Session {
    /// A session whose identity has not been resolved yet.
    #[must_use]
    pub fn new(client: Arc<ApiClient>, notifier: Notifier) -> Self {
        Self {
            client,
            notifier,
            state: SessionState::Loading,
        }
    }

    /// Creates the session and resolves who is signed in.
    pub async fn init(client: Arc<ApiClient>, notifier: Notifier) -> Self {
        let mut session = Self::new(client, notifier);
        session.refresh().await;
        session
    }

    /// Asks the backend who the session cookie belongs to.
    ///
    /// Any failure leaves the visitor anonymous.
    pub async fn refresh(&mut self) {
        self.state = match self.client.current_user().await {
            Ok(user) => {
                debug!(user = %user.id, "Session resolved");
                SessionState::SignedIn(user)
            }
            Err(ApiError::Transport(err)) => {
                error!(error = %err, "Failed to fetch current user");
                SessionState::Anonymous
            }
            Err(err) => {
                debug!(error = %err, "No active session");
                SessionState::Anonymous
            }
        };
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state == SessionState::Loading
    }

    #[must_use]
    pub fn current_user(&self) -> Option<&User> {
        match &self.state {
            SessionState::SignedIn(user) => Some(user),
            SessionState::Loading | SessionState::Anonymous => None,
        }
    }

    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.current_user().is_some()
    }

    pub fn login(&mut self, user: User) {
        self.notifier
            .success(format!("Welcome, {}!", user.username.get()));
        self.state = SessionState::SignedIn(user);
    }

    /// Ends the session on the server, then forgets the user.
    ///
    /// The user is kept when the server refuses or cannot be reached.
    pub async fn logout(&mut self) {
        match self.client.logout().await {
            Ok(()) => {
                self.state = SessionState::Anonymous;
                self.notifier.info("Logged out successfully!");
            }
            Err(ApiError::Transport(err)) => {
                error!(error = %err, "Logout error");
                self.notifier.error("An error occurred during logout.");
            }
            Err(err) => {
                warn!(error = %err, "Logout was refused");
                self.notifier
                    .error(err.server_message().unwrap_or("Logout failed.").to_owned());
            }
        }
    }
}
