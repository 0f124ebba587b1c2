use crate::{route::Route, session::Session};
use std::fmt::Write;

#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub enum NavEntry {
    Link { label: &'static str, route: Route },
    Loading,
    Welcome { initial: String, username: String },
    Logout,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct NavBar {
    entries: Vec<NavEntry>,
}

impl NavBar {
    #[must_use]
    pub fn for_session(session: &Session) -> Self {
        let mut entries = vec![
            NavEntry::Link {
                label: "Home",
                route: Route::Home,
            },
            NavEntry::Link {
                label: "Posts",
                route: Route::Posts,
            },
        ];

        if session.is_loading() {
            entries.push(NavEntry::Loading);
        } else if let Some(user) = session.current_user() {
            entries.push(NavEntry::Welcome {
                initial: user.username.initial(),
                username: user.username.get().to_owned(),
            });
            entries.push(NavEntry::Logout);
        } else {
            entries.push(NavEntry::Link {
                label: "Login",
                route: Route::Login,
            });
            entries.push(NavEntry::Link {
                label: "Sign Up",
                route: Route::Signup,
            });
        }

        Self { entries }
    }

    #[must_use]
    pub fn entries(&self) -> &[NavEntry] {
        &self.entries
    }

    #[must_use]
    pub fn render(&self) -> String {
        let mut line = String::new();
        for entry in &self.entries {
            if !line.is_empty() {
                line.push_str(" | ");
            }
            let _ = match entry {
                NavEntry::Link { label, route } => write!(line, "{label} ({route})"),
                NavEntry::Loading => write!(line, "..."),
                NavEntry::Welcome { initial, username } => {
                    write!(line, "[{initial}] Welcome, {username}!")
                }
                NavEntry::Logout => write!(line, "Logout"),
            };
        }
        line
    }
}
