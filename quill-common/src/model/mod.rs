pub mod auth;
pub mod comment;
pub mod page;
pub mod post;
pub mod user;

use derive_where::derive_where;
use serde::{Deserialize, Deserializer, Serialize};
use std::{fmt::Display, marker::PhantomData};

/// Opaque backend identifier, tagged with the kind of resource it names.
///
/// The backend hands out string ids (`_id`), so the only thing the client
/// ever does with them is compare them and put them back into paths.
#[derive_where(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash)]
#[derive(Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id<Marker>(String, #[serde(skip)] PhantomData<Marker>);

impl<Marker> Id<Marker> {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into(), PhantomData)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<Marker> Display for Id<Marker> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl<Marker> From<String> for Id<Marker> {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl<Marker> From<&str> for Id<Marker> {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl<Marker> From<Id<Marker>> for String {
    fn from(value: Id<Marker>) -> Self {
        value.0
    }
}

/// Reads a field that the backend may send as `null`, using the default instead.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[cfg(test)]
mod tests {
    use crate::model::{Id, comment::CommentMarker, post::PostMarker};

    #[test]
    fn ids_are_transparent_strings() {
        let id: Id<PostMarker> = serde_json::from_str("\"64f1c0ffee\"").unwrap();
        assert_eq!(id.as_str(), "64f1c0ffee");
        assert_eq!(id.to_string(), "64f1c0ffee");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"64f1c0ffee\"");
    }

    #[test]
    fn ids_compare_by_value() {
        let first = Id::<CommentMarker>::from("a");
        let second = Id::<CommentMarker>::new(String::from("a"));
        assert_eq!(first, second);
        assert_ne!(first, Id::from("b"));
    }
}
