use crate::{
    notice::Notifier,
    route::{Navigation, Route},
    views::{
        comments::{CommentFeed, CommentFetch, FetchOutcome},
        failure_message,
    },
};
use quill_client::{ApiClient, ApiError};
use quill_common::{
    model::{
        Id,
        comment::{CommentContent, CommentMarker},
        page::ResponseShape,
        post::{Post, PostContent, PostMarker},
        user::author_name,
    },
    util::PageSize,
};
use std::{fmt::Write, sync::Arc};
use time::{OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description};
use tracing::{debug, error, warn};

pub const DEFAULT_COMMENT_PAGE_SIZE: PageSize = PageSize::new_unchecked(5);

const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'_>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]");

/// The comment currently open in the edit dialog.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct CommentEdit {
    pub id: Id<CommentMarker>,
    pub draft: String,
}

#[derive(Debug)]
pub struct PostDetailView {
    client: Arc<ApiClient>,
    notifier: Notifier,
    post_id: Id<PostMarker>,
    post: Option<Post>,
    editing: bool,
    form: PostContent,
    feed: CommentFeed,
    comment_edit: Option<CommentEdit>,
}

impl PostDetailView {
    #[must_use]
    pub fn new(
        client: Arc<ApiClient>,
        notifier: Notifier,
        post_id: Id<PostMarker>,
        comment_page_size: PageSize,
    ) -> Self {
        Self {
            client,
            notifier,
            post_id,
            post: None,
            editing: false,
            form: PostContent::default(),
            feed: CommentFeed::new(comment_page_size),
            comment_edit: None,
        }
    }

    #[must_use]
    pub fn post_id(&self) -> &Id<PostMarker> {
        &self.post_id
    }

    #[must_use]
    pub fn post(&self) -> Option<&Post> {
        self.post.as_ref()
    }

    #[must_use]
    pub fn is_editing(&self) -> bool {
        self.editing
    }

    #[must_use]
    pub fn form(&self) -> &PostContent {
        &self.form
    }

    #[must_use]
    pub fn comments(&self) -> &CommentFeed {
        &self.feed
    }

    #[must_use]
    pub fn comment_edit(&self) -> Option<&CommentEdit> {
        self.comment_edit.as_ref()
    }

    /// Loads the post and the first page of its comments.
    pub async fn open(&mut self) -> Option<Navigation> {
        self.feed.reset();
        self.comment_edit = None;

        if let Some(navigation) = self.load_post().await {
            return Some(navigation);
        }
        self.load_comments().await;
        None
    }

    /// Switches to another post, dropping everything known about the old one.
    pub async fn change_post(&mut self, post_id: Id<PostMarker>) -> Option<Navigation> {
        self.post_id = post_id;
        self.post = None;
        self.editing = false;
        self.open().await
    }

    /// Fetches the post. A missing post sends the user back to the listing.
    pub async fn load_post(&mut self) -> Option<Navigation> {
        match self.client.fetch_post(&self.post_id).await {
            Ok(post) => {
                self.form = post.content();
                self.post = Some(post);
                None
            }
            Err(err) if err.is_not_found() => {
                self.notifier.error("Post not found.");
                Some(Route::Posts.into())
            }
            Err(err) => {
                error!(error = %err, "Error fetching post");
                self.notifier.error("Failed to fetch post details.");
                None
            }
        }
    }

    /// Fetches the feed's current page again.
    pub async fn load_comments(&mut self) {
        let fetch = self.feed.begin_fetch();
        self.run_fetch(fetch).await;
    }

    /// Fetches the next page. Returns `false` when loading more is not
    /// possible right now.
    pub async fn load_more(&mut self) -> bool {
        match self.feed.advance() {
            Some(fetch) => {
                self.run_fetch(fetch).await;
                true
            }
            None => false,
        }
    }

    async fn run_fetch(&mut self, fetch: CommentFetch) {
        match self.client.list_comments(&self.post_id, fetch.request).await {
            Ok(response) => {
                let batch = response.into_batch(fetch.request);
                match batch.shape {
                    ResponseShape::Paged => {}
                    ResponseShape::Untotaled => warn!(
                        post = %self.post_id,
                        "Comment page carried no total; treating it as the last page"
                    ),
                    ResponseShape::Legacy => warn!(
                        post = %self.post_id,
                        "Comment endpoint returned a bare array; \
                        expected {{ data, total }} for reliable paging"
                    ),
                }

                match self.feed.apply(fetch.token, batch) {
                    FetchOutcome::Applied { added, .. } => {
                        debug!(page = %fetch.request.page, added, "Applied comment page");
                    }
                    FetchOutcome::Stale => {
                        debug!(page = %fetch.request.page, "Discarded stale comment page");
                    }
                }
            }
            Err(ApiError::Decode(err)) => {
                error!(error = %err, "Unexpected data format for comments");
                if self.feed.fail(fetch.token, true) {
                    self.notifier.error("Failed to fetch comments.");
                }
            }
            Err(err) => {
                error!(error = %err, "Error fetching comments");
                if self.feed.fail(fetch.token, false) {
                    self.notifier.error("Failed to fetch comments.");
                }
            }
        }
    }

    /// Opens the edit form pre-filled with the post as last fetched.
    pub fn start_edit(&mut self) {
        if let Some(post) = &self.post {
            self.form = post.content();
            self.editing = true;
        }
    }

    pub fn cancel_edit(&mut self) {
        self.editing = false;
    }

    pub async fn update_post(&mut self, content: PostContent) {
        match self.client.update_post(&self.post_id, &content).await {
            Ok(post) => {
                self.form = post.content();
                self.post = Some(post);
                self.editing = false;
                self.notifier.success("Post updated successfully!");
            }
            Err(err) => {
                error!(error = %err, "Error updating post");
                self.form = content;
                self.notifier.error(failure_message("update post", &err));
            }
        }
    }

    /// Deletes the post; on success the user is sent to the listing.
    pub async fn delete_post(&mut self) -> Option<Navigation> {
        match self.client.delete_post(&self.post_id).await {
            Ok(()) => {
                self.notifier.success("Post deleted successfully!");
                Some(Route::Posts.into())
            }
            Err(err) if err.is_not_found() => {
                self.notifier.error("Post not found.");
                None
            }
            Err(err) => {
                error!(error = %err, "Error deleting post");
                self.notifier.error(failure_message("delete post", &err));
                None
            }
        }
    }

    pub async fn create_comment(&mut self, content: &CommentContent) {
        match self.client.create_comment(&self.post_id, content).await {
            Ok(comment) => {
                self.notifier.success("Comment added successfully!");
                self.feed.prepend(comment);
            }
            Err(err) => {
                error!(error = %err, "Error creating comment");
                self.notifier.error(failure_message("add comment", &err));
            }
        }
    }

    /// Opens the edit dialog for a loaded comment. Returns whether it exists.
    pub fn begin_comment_edit(&mut self, id: &Id<CommentMarker>) -> bool {
        let Some(comment) = self
            .feed
            .comments()
            .iter()
            .find(|comment| &comment.id == id)
        else {
            return false;
        };

        self.comment_edit = Some(CommentEdit {
            id: comment.id.clone(),
            draft: comment.content.clone(),
        });
        true
    }

    pub fn cancel_comment_edit(&mut self) {
        self.comment_edit = None;
    }

    /// Sends the edit dialog's comment with new content.
    pub async fn submit_comment_edit(&mut self, content: CommentContent) {
        let Some(edit) = self.comment_edit.take() else {
            return;
        };

        match self
            .client
            .update_comment(&self.post_id, &edit.id, &content)
            .await
        {
            Ok(comment) => {
                self.feed.replace(comment);
                self.notifier.success("Comment updated successfully!");
            }
            Err(err) => {
                error!(error = %err, "Error updating comment");
                self.notifier.error(failure_message("update comment", &err));
                self.comment_edit = Some(CommentEdit {
                    id: edit.id,
                    draft: content.content,
                });
            }
        }
    }

    pub async fn delete_comment(&mut self, id: &Id<CommentMarker>) {
        match self.client.delete_comment(&self.post_id, id).await {
            Ok(()) => {
                self.notifier.success("Comment deleted successfully!");
                self.feed.remove(id);
            }
            Err(err) if err.is_not_found() => {
                self.notifier.error("Comment not found.");
            }
            Err(err) => {
                error!(error = %err, "Error deleting comment");
                self.notifier.error(failure_message("delete comment", &err));
            }
        }
    }

    #[must_use]
    pub fn render(&self) -> String {
        let Some(post) = &self.post else {
            return "Loading post...\n".to_owned();
        };

        let mut out = String::new();
        if self.editing {
            let _ = writeln!(
                out,
                "Edit Post\n  Title: {}\n  Content: {}",
                self.form.title, self.form.content
            );
        } else {
            let _ = writeln!(
                out,
                "{}\nAuthor: {}\n\n{}",
                post.title,
                author_name(post.author.as_ref()),
                post.content
            );
        }

        let _ = writeln!(out, "\nComments ({})", self.feed.total());
        for comment in self.feed.comments() {
            let _ = writeln!(
                out,
                "  [{}] {} {}\n    {}",
                comment.id,
                author_name(comment.author.as_ref()),
                format_timestamp(comment.created_at),
                comment.content
            );
        }

        if let Some(edit) = &self.comment_edit {
            let _ = writeln!(out, "Editing comment {}: {}", edit.id, edit.draft);
        }

        out.push_str(if self.feed.is_loading() {
            "Loading...\n"
        } else if self.feed.has_more() {
            "Load More\n"
        } else {
            "No more comments\n"
        });
        out
    }
}

fn format_timestamp(timestamp: Option<OffsetDateTime>) -> String {
    timestamp
        .and_then(|timestamp| timestamp.format(TIMESTAMP_FORMAT).ok())
        .unwrap_or_default()
}
