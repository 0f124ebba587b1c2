use crate::session::Session;
use quill_common::model::user::ANONYMOUS;

#[must_use]
pub fn visitor_name(session: &Session) -> &str {
    session
        .current_user()
        .map_or(ANONYMOUS, |user| user.username.get())
}

#[must_use]
pub fn render(session: &Session) -> String {
    format!(
        "Welcome to THE Blog!\nHello, {}!\nFeel free to share your thoughts\n",
        visitor_name(session)
    )
}
