use crate::{
    notice::Notifier,
    policy::{Entity, MutationPolicy},
    route::Route,
    views::failure_message,
};
use quill_client::{ApiClient, PostQuery};
use quill_common::{
    model::{
        Id,
        post::{Post, PostContent, PostMarker},
    },
    util::{PageNumber, PageSize, page_count},
};
use std::{fmt::Write, sync::Arc};
use tracing::error;

pub const DEFAULT_PAGE_SIZE: PageSize = PageSize::new_unchecked(8);
pub const PREVIEW_CHARS: usize = 100;

const _: () = assert!(matches!(
    Entity::Post.mutation_policy(),
    MutationPolicy::Refetch
));

/// Paginated, searchable listing of posts.
///
/// Every change of page, page size or keyword fetches the listing again.
/// Creating and deleting posts also end in a fresh fetch of page 1.
#[derive(Debug)]
pub struct PostListView {
    client: Arc<ApiClient>,
    notifier: Notifier,
    page: PageNumber,
    page_size: PageSize,
    total: u64,
    keyword: String,
    posts: Vec<Post>,
    create_open: bool,
}

impl PostListView {
    #[must_use]
    pub fn new(client: Arc<ApiClient>, notifier: Notifier, page_size: PageSize) -> Self {
        Self {
            client,
            notifier,
            page: PageNumber::FIRST,
            page_size,
            total: 0,
            keyword: String::new(),
            posts: Vec::new(),
            create_open: false,
        }
    }

    #[must_use]
    pub fn page(&self) -> PageNumber {
        self.page
    }

    #[must_use]
    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.total
    }

    #[must_use]
    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    #[must_use]
    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    #[must_use]
    pub fn page_count(&self) -> u64 {
        page_count(self.total, self.page_size)
    }

    #[must_use]
    pub fn is_create_open(&self) -> bool {
        self.create_open
    }

    /// Fetches the current page. On failure the listing is left as it was.
    pub async fn refresh(&mut self) {
        let query = PostQuery::new(self.page, self.page_size, &self.keyword);

        match self.client.list_posts(&query).await {
            Ok(page) => {
                self.posts = page.data;
                self.total = page.total;
            }
            Err(err) => {
                error!(error = %err, "Error fetching posts");
                self.notifier.error(failure_message("fetch posts", &err));
            }
        }
    }

    /// The pagination control moves page and page size together.
    pub async fn set_pagination(&mut self, page: PageNumber, page_size: PageSize) {
        self.page = page;
        self.page_size = page_size;
        self.refresh().await;
    }

    /// Typing into the search box.
    pub async fn edit_keyword(&mut self, keyword: impl Into<String>) {
        self.keyword = keyword.into();
        self.refresh().await;
    }

    /// Submitting the search box starts over at page 1.
    pub async fn search(&mut self, keyword: impl Into<String>) {
        self.keyword = keyword.into();
        self.page = PageNumber::FIRST;
        self.refresh().await;
    }

    pub fn open_create(&mut self) {
        self.create_open = true;
    }

    pub fn cancel_create(&mut self) {
        self.create_open = false;
    }

    pub async fn create(&mut self, content: &PostContent) {
        match self.client.create_post(content).await {
            Ok(()) => {
                self.notifier.success("Post created successfully!");
                self.create_open = false;
                self.keyword.clear();
                self.page = PageNumber::FIRST;
                self.refresh().await;
            }
            Err(err) => {
                error!(error = %err, "Error creating post");
                self.notifier.error(failure_message("create post", &err));
            }
        }
    }

    pub async fn delete(&mut self, id: &Id<PostMarker>) {
        match self.client.delete_post(id).await {
            Ok(()) => {
                self.notifier.success("Post deleted successfully!");
                self.page = PageNumber::FIRST;
                self.refresh().await;
            }
            Err(err) if err.is_not_found() => {
                self.notifier.error("Post not found.");
            }
            Err(err) => {
                error!(error = %err, "Error deleting post");
                self.notifier.error(failure_message("delete post", &err));
            }
        }
    }

    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::from("All Posts\n");
        if !self.keyword.is_empty() {
            let _ = writeln!(out, "Search: {:?}", self.keyword);
        }

        if self.posts.is_empty() {
            out.push_str("  (no posts)\n");
        }
        for post in &self.posts {
            let _ = writeln!(
                out,
                "  {} [{}]\n    {}",
                post.title,
                Route::Post(post.id.clone()),
                preview(&post.content)
            );
        }

        let _ = writeln!(
            out,
            "Page {} of {} ({} posts, {} per page)",
            self.page,
            self.page_count(),
            self.total,
            self.page_size
        );
        out
    }
}

/// First characters of a post body for the listing card.
#[must_use]
pub fn preview(content: &str) -> String {
    if content.is_empty() {
        return String::new();
    }

    let mut preview: String = content.chars().take(PREVIEW_CHARS).collect();
    preview.push_str("...");
    preview
}
