use crate::{
    notice::Notifier,
    route::{Navigation, Route},
};
use quill_client::{ApiClient, ApiError};
use quill_common::model::{
    auth::{Password, SignupRequest},
    user::{InvalidUsernameError, Username},
};
use std::sync::Arc;
use thiserror::Error;
use tracing::error;

pub const USERNAME_MIN_CHARS: usize = 3;
pub const PASSWORD_MIN_CHARS: usize = 6;

#[derive(Clone, Eq, PartialEq, Debug, Hash, Error)]
pub enum SignupValidationError {
    #[error("Username must be at least {USERNAME_MIN_CHARS} characters long!")]
    UsernameTooShort,
    #[error("Please input your username!")]
    Username(#[from] InvalidUsernameError),
    #[error("The input is not valid E-mail!")]
    InvalidEmail,
    #[error("Password must be at least {PASSWORD_MIN_CHARS} characters long!")]
    PasswordTooShort,
    #[error("The two passwords that you entered do not match!")]
    PasswordMismatch,
}

/// The registration form as typed in, before any check.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash)]
pub struct SignupForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm: String,
}

impl SignupForm {
    /// Local checks that run before anything is sent.
    pub fn validate(&self) -> Result<SignupRequest, SignupValidationError> {
        let username = Username::new(self.username.clone())?;
        if self.username.chars().count() < USERNAME_MIN_CHARS {
            return Err(SignupValidationError::UsernameTooShort);
        }

        let email = self.email.trim();
        if !email.contains('@') {
            return Err(SignupValidationError::InvalidEmail);
        }

        if self.password.chars().count() < PASSWORD_MIN_CHARS {
            return Err(SignupValidationError::PasswordTooShort);
        }
        if self.password != self.confirm {
            return Err(SignupValidationError::PasswordMismatch);
        }

        Ok(SignupRequest {
            username,
            email: email.to_owned(),
            password: Password::new(self.password.clone()),
        })
    }
}

#[derive(Debug)]
pub struct SignupView {
    client: Arc<ApiClient>,
    notifier: Notifier,
}

impl SignupView {
    #[must_use]
    pub fn new(client: Arc<ApiClient>, notifier: Notifier) -> Self {
        Self { client, notifier }
    }

    /// Registers the account and sends the user on to the login page.
    ///
    /// Nothing is sent when the form does not pass [`SignupForm::validate`].
    pub async fn submit(&self, form: &SignupForm) -> Option<Navigation> {
        let request = match form.validate() {
            Ok(request) => request,
            Err(err) => {
                self.notifier.error(err.to_string());
                return None;
            }
        };

        match self.client.signup(&request).await {
            Ok(message) => {
                self.notifier.success(message.unwrap_or_else(|| {
                    "Registration successful! Redirecting to login...".to_owned()
                }));
                Some(Route::Login.into())
            }
            Err(err @ (ApiError::Transport(_) | ApiError::Decode(_))) => {
                error!(error = %err, "Signup error");
                self.notifier.error("An error occurred during registration.");
                None
            }
            Err(err) => {
                self.notifier.error(
                    err.server_message()
                        .unwrap_or("Registration failed.")
                        .to_owned(),
                );
                None
            }
        }
    }
}
