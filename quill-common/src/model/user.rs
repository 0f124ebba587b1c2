use crate::model::{Id, null_as_default};
use serde::{
    Deserialize, Deserializer, Serialize,
    de::{Error, Unexpected},
};
use thiserror::Error;

pub const ANONYMOUS: &str = "Anonymous";

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct UserMarker;

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
pub struct User {
    #[serde(rename = "_id", alias = "id")]
    pub id: Id<UserMarker>,
    pub username: Username,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// The author of a post or comment, as the backend chose to send it.
///
/// Populated references carry the username; bare references are only an id.
#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Author {
    Populated(AuthorProfile),
    Reference(Id<UserMarker>),
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
pub struct AuthorProfile {
    #[serde(rename = "_id", alias = "id")]
    pub id: Id<UserMarker>,
    /// Unchecked; a blank name renders as [`ANONYMOUS`].
    #[serde(default, deserialize_with = "null_as_default")]
    pub username: String,
}

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Serialize)]
#[serde(transparent)]
pub struct Username(String);

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("The username is invalid: {0:?}")]
pub struct InvalidUsernameError(String);

impl Username {
    pub fn new(username: String) -> Result<Self, InvalidUsernameError> {
        if username.trim().is_empty() {
            Err(InvalidUsernameError(username))
        } else {
            Ok(Username(username))
        }
    }

    #[must_use]
    pub fn get(&self) -> &str {
        &self.0
    }

    /// Upper-cased first character, used for avatar badges.
    #[must_use]
    pub fn initial(&self) -> String {
        self.0
            .chars()
            .next()
            .map(|first| first.to_uppercase().collect())
            .unwrap_or_default()
    }
}

impl<'de> Deserialize<'de> for Username {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let inner = String::deserialize(deserializer)?;
        Username::new(inner)
            .map_err(|err| Error::invalid_value(Unexpected::Str(&err.0), &"Username"))
    }
}

impl Author {
    #[must_use]
    pub fn id(&self) -> &Id<UserMarker> {
        match self {
            Author::Populated(profile) => &profile.id,
            Author::Reference(id) => id,
        }
    }

    /// The author's name, if one was sent and is not blank.
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        match self {
            Author::Populated(profile) if !profile.username.trim().is_empty() => {
                Some(&profile.username)
            }
            Author::Populated(_) | Author::Reference(_) => None,
        }
    }
}

/// Name to show for an optional author, falling back to [`ANONYMOUS`].
#[must_use]
pub fn author_name(author: Option<&Author>) -> &str {
    author.and_then(Author::username).unwrap_or(ANONYMOUS)
}
