//! Paged comment thread under a post.
//!
//! The feed accumulates pages: page 1 replaces everything, later pages only
//! add comments whose id is not present yet. Every fetch carries a
//! [`FetchToken`] and only the most recently issued one may change the feed,
//! so a slow response for an earlier request can never overwrite a newer one.

use crate::policy::{Entity, MutationPolicy};
use quill_common::{
    model::{
        Id,
        comment::{Comment, CommentMarker},
        page::{CommentBatch, ResponseShape},
    },
    util::{PageNumber, PageRequest, PageSize},
};
use std::collections::HashSet;

const _: () = assert!(matches!(
    Entity::Comment.mutation_policy(),
    MutationPolicy::PatchInPlace
));

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash)]
pub struct FetchToken(u64);

/// A page request issued by the feed, to be answered with [`CommentFeed::apply`]
/// or [`CommentFeed::fail`].
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub struct CommentFetch {
    pub token: FetchToken,
    pub request: PageRequest,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum FetchOutcome {
    Applied { shape: ResponseShape, added: usize },
    /// A newer fetch was issued, or the feed was reset, after this one.
    Stale,
}

#[derive(Clone, Debug)]
pub struct CommentFeed {
    comments: Vec<Comment>,
    page: PageNumber,
    page_size: PageSize,
    total: u64,
    has_more: bool,
    next_token: u64,
    in_flight: Option<FetchToken>,
}

impl CommentFeed {
    #[must_use]
    pub fn new(page_size: PageSize) -> Self {
        Self {
            comments: Vec::new(),
            page: PageNumber::FIRST,
            page_size,
            total: 0,
            has_more: true,
            next_token: 0,
            in_flight: None,
        }
    }

    /// Back to an empty first page. Outstanding fetches become stale.
    pub fn reset(&mut self) {
        self.comments.clear();
        self.page = PageNumber::FIRST;
        self.total = 0;
        self.has_more = true;
        self.in_flight = None;
    }

    #[must_use]
    pub fn comments(&self) -> &[Comment] {
        &self.comments
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
    pub fn has_more(&self) -> bool {
        self.has_more
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    #[must_use]
    pub fn can_load_more(&self) -> bool {
        !self.is_loading() && self.has_more
    }

    #[must_use]
    pub fn contains(&self, id: &Id<CommentMarker>) -> bool {
        self.comments.iter().any(|comment| &comment.id == id)
    }

    /// Issues a fetch for the current page, superseding any fetch in flight.
    pub fn begin_fetch(&mut self) -> CommentFetch {
        let token = FetchToken(self.next_token);
        self.next_token += 1;
        self.in_flight = Some(token);

        CommentFetch {
            token,
            request: PageRequest {
                page: self.page,
                page_size: self.page_size,
            },
        }
    }

    /// Moves to the next page and issues its fetch, unless a fetch is
    /// already running or there is nothing more to load.
    pub fn advance(&mut self) -> Option<CommentFetch> {
        if !self.can_load_more() {
            return None;
        }

        self.page = self.page.next();
        Some(self.begin_fetch())
    }

    pub fn apply(&mut self, token: FetchToken, batch: CommentBatch) -> FetchOutcome {
        if self.in_flight != Some(token) {
            return FetchOutcome::Stale;
        }
        self.in_flight = None;

        let added = if self.page.is_first() {
            self.comments = batch.comments;
            self.comments.len()
        } else {
            self.append(batch.comments)
        };

        self.has_more = batch.has_more;
        self.total = match batch.total {
            Some(total) => total,
            None => self.comments.len() as u64,
        };

        FetchOutcome::Applied {
            shape: batch.shape,
            added,
        }
    }

    /// Ends a fetch that produced no page. Returns whether the token was
    /// current. With `exhausted`, no further pages will be offered.
    pub fn fail(&mut self, token: FetchToken, exhausted: bool) -> bool {
        if self.in_flight != Some(token) {
            return false;
        }
        self.in_flight = None;

        if exhausted {
            self.has_more = false;
        }
        true
    }

    fn append(&mut self, incoming: Vec<Comment>) -> usize {
        let mut seen: HashSet<Id<CommentMarker>> =
            self.comments.iter().map(|comment| comment.id.clone()).collect();
        let before = self.comments.len();

        self.comments.extend(
            incoming
                .into_iter()
                .filter(|comment| seen.insert(comment.id.clone())),
        );

        self.comments.len() - before
    }

    /// A freshly created comment goes on top.
    pub fn prepend(&mut self, comment: Comment) {
        self.comments.retain(|existing| existing.id != comment.id);
        self.comments.insert(0, comment);
        self.total += 1;
    }

    /// Swaps in the server's version of a comment. Returns whether it was present.
    pub fn replace(&mut self, comment: Comment) -> bool {
        match self
            .comments
            .iter_mut()
            .find(|existing| existing.id == comment.id)
        {
            Some(existing) => {
                *existing = comment;
                true
            }
            None => false,
        }
    }

    /// Drops a comment the backend confirmed deleted.
    ///
    /// The total always shrinks by one, even when the comment sits on a page
    /// that was never loaded. Returns whether a loaded comment was dropped.
    pub fn remove(&mut self, id: &Id<CommentMarker>) -> bool {
        let before = self.comments.len();
        self.comments.retain(|comment| &comment.id != id);
        self.total = self.total.saturating_sub(1);
        self.comments.len() != before
    }
}
