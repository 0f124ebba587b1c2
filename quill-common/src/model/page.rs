use crate::{model::comment::Comment, util::PageRequest};
use serde::{Deserialize, Serialize};

/// The `{data, total}` envelope every paginated endpoint is supposed to use.
#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: u64,
}

/// What the comment listing endpoint may answer with.
///
/// Older backends return the bare array of the requested page without a
/// total; that shape is deprecated and normalized away by [`into_batch`].
/// An envelope whose `total` is missing or unusable is taken as the last page.
///
/// [`into_batch`]: CommentPageResponse::into_batch
#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
#[serde(untagged)]
pub enum CommentPageResponse {
    Paged(Page<Comment>),
    Untotaled { data: Vec<Comment> },
    Legacy(Vec<Comment>),
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash)]
pub enum ResponseShape {
    Paged,
    Untotaled,
    Legacy,
}

/// A comment page normalized to a single shape.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct CommentBatch {
    pub comments: Vec<Comment>,
    /// Server-side total, unknown unless the response was paged.
    pub total: Option<u64>,
    pub has_more: bool,
    pub shape: ResponseShape,
}

impl CommentPageResponse {
    #[must_use]
    pub fn shape(&self) -> ResponseShape {
        match self {
            CommentPageResponse::Paged(_) => ResponseShape::Paged,
            CommentPageResponse::Untotaled { .. } => ResponseShape::Untotaled,
            CommentPageResponse::Legacy(_) => ResponseShape::Legacy,
        }
    }

    #[must_use]
    pub fn into_batch(self, request: PageRequest) -> CommentBatch {
        match self {
            CommentPageResponse::Paged(page) => CommentBatch {
                has_more: request.end_offset() < page.total,
                total: Some(page.total),
                comments: page.data,
                shape: ResponseShape::Paged,
            },
            CommentPageResponse::Untotaled { data } => CommentBatch {
                has_more: false,
                total: None,
                comments: data,
                shape: ResponseShape::Untotaled,
            },
            CommentPageResponse::Legacy(comments) => CommentBatch {
                has_more: comments.len() as u64 == u64::from(request.page_size.get()),
                total: None,
                comments,
                shape: ResponseShape::Legacy,
            },
        }
    }
}
