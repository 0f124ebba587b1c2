pub mod comments;
pub mod home;
pub mod login;
pub mod nav;
pub mod post_detail;
pub mod post_list;
pub mod signup;

use quill_client::ApiError;

/// "Failed to <action>: <detail>", or "Failed to <action>." when the
/// response carried nothing worth showing.
pub(crate) fn failure_message(action: &str, err: &ApiError) -> String {
    match err.detail() {
        Some(detail) => format!("Failed to {action}: {detail}"),
        None => format!("Failed to {action}."),
    }
}

#[cfg(test)]
mod tests {
    use crate::views::failure_message;
    use quill_client::{ApiError, StatusCode};

    #[test]
    fn failure_messages() {
        let rejected = ApiError::Rejected {
            status: StatusCode::BAD_REQUEST,
            message: "Title is required".to_owned(),
        };
        assert_eq!(
            failure_message("create post", &rejected),
            "Failed to create post: Title is required"
        );

        let bare = ApiError::Status(StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            failure_message("update post", &bare),
            "Failed to update post: Internal Server Error"
        );

        let decode = ApiError::Decode(serde_json::from_str::<u8>("x").unwrap_err());
        assert_eq!(failure_message("fetch posts", &decode), "Failed to fetch posts.");
    }
}
