use crate::client::LoginOutcome;
use quill_common::model::user::User;
use serde::Deserialize;

/// `{ user }`, as answered by the current-user endpoint.
#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize)]
pub(crate) struct CurrentUserRecord {
    pub user: User,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize)]
pub(crate) struct LoginRecord {
    #[serde(default)]
    pub message: Option<String>,
    pub user: User,
}

/// Body of informational answers and of most rejections.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize)]
pub(crate) struct MessageRecord {
    #[serde(default, alias = "error")]
    pub message: Option<String>,
}

impl From<CurrentUserRecord> for User {
    fn from(value: CurrentUserRecord) -> Self {
        value.user
    }
}

impl From<LoginRecord> for LoginOutcome {
    fn from(value: LoginRecord) -> Self {
        Self {
            message: value.message.filter(|message| !message.is_empty()),
            user: value.user,
        }
    }
}

impl MessageRecord {
    pub fn into_message(self) -> Option<String> {
        self.message.filter(|message| !message.is_empty())
    }
}
