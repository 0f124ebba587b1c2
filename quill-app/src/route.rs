use quill_common::model::{Id, post::PostMarker};
use quill_client::Url;
use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};
use thiserror::Error;

/// Pages the client can show.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub enum Route {
    Home,
    Posts,
    Post(Id<PostMarker>),
    Login,
    Signup,
}

/// Where an operation wants the user to go next.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub enum Navigation {
    Route(Route),
    /// Leave the client entirely, e.g. for a third-party login flow.
    External(Url),
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Error)]
#[error("No page lives at {0:?}")]
pub struct UnknownRouteError(String);

impl Route {
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_owned(),
            Route::Posts => "/posts".to_owned(),
            Route::Post(id) => format!("/posts/{id}"),
            Route::Login => "/login".to_owned(),
            Route::Signup => "/signup".to_owned(),
        }
    }
}

impl Display for Route {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path())
    }
}

impl FromStr for Route {
    type Err = UnknownRouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !s.starts_with('/') {
            return Err(UnknownRouteError(s.to_owned()));
        }

        let trimmed = s.trim_end_matches('/');
        let mut segments = trimmed.split('/').skip(1);

        let route = match (segments.next(), segments.next(), segments.next()) {
            (None, _, _) => Route::Home,
            (Some("posts"), None, _) => Route::Posts,
            (Some("posts"), Some(id), None) if !id.is_empty() => Route::Post(Id::from(id)),
            (Some("login"), None, _) => Route::Login,
            (Some("signup"), None, _) => Route::Signup,
            _ => return Err(UnknownRouteError(s.to_owned())),
        };

        Ok(route)
    }
}

impl From<Route> for Navigation {
    fn from(value: Route) -> Self {
        Navigation::Route(value)
    }
}
