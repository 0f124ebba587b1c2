use crate::{
    notice::Notifier,
    route::{Navigation, Route},
    session::Session,
};
use quill_client::{ApiClient, ApiError};
use quill_common::model::auth::LoginCredentials;
use std::sync::Arc;
use tracing::error;

#[derive(Debug)]
pub struct LoginView {
    client: Arc<ApiClient>,
    notifier: Notifier,
}

impl LoginView {
    #[must_use]
    pub fn new(client: Arc<ApiClient>, notifier: Notifier) -> Self {
        Self { client, notifier }
    }

    /// Signs in with email and password and hands the user to the session.
    pub async fn submit(
        &self,
        credentials: &LoginCredentials,
        session: &mut Session,
    ) -> Option<Navigation> {
        match self.client.login(credentials).await {
            Ok(outcome) => {
                self.notifier.success(
                    outcome
                        .message
                        .unwrap_or_else(|| "Login successful!".to_owned()),
                );
                session.login(outcome.user);
                Some(Route::Posts.into())
            }
            Err(err @ (ApiError::Transport(_) | ApiError::Decode(_))) => {
                error!(error = %err, "Login error");
                self.notifier.error("An error occurred during login.");
                None
            }
            Err(err) => {
                self.notifier.error(
                    err.server_message()
                        .unwrap_or("Login failed: Invalid credentials.")
                        .to_owned(),
                );
                None
            }
        }
    }

    /// The third-party flow is a full navigation to the backend.
    #[must_use]
    pub fn google_login(&self) -> Navigation {
        Navigation::External(self.client.google_login_url())
    }
}
