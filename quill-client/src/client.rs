use crate::record::{CurrentUserRecord, LoginRecord, MessageRecord};
use quill_common::{
    model::{
        Id,
        auth::{LoginCredentials, SignupRequest},
        comment::{Comment, CommentContent, CommentMarker},
        page::{CommentPageResponse, Page},
        post::{Post, PostContent, PostMarker},
        user::User,
    },
    util::{PageNumber, PageRequest, PageSize},
};
use reqwest::{Client, Response, StatusCode, Url};
use serde::{Serialize, de::DeserializeOwned};
use std::{borrow::Cow, time::Duration};
use thiserror::Error;
use tracing::{debug, instrument};

pub type Result<T, E = ApiError> = std::result::Result<T, E>;

/// Everything that can go wrong talking to the backend.
///
/// `Transport` means the request never completed. `Rejected` carries the
/// message the backend put into its error body, `Status` is a failure
/// without a usable body.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request could not be completed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("Request was rejected with {status}: {message}")]
    Rejected { status: StatusCode, message: String },
    #[error("Request failed with {0}")]
    Status(StatusCode),
    #[error("Response body could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Expected an empty response, got {0}")]
    UnexpectedStatus(StatusCode),
}

#[derive(Debug, Error)]
pub enum ClientBuildError {
    #[error("HTTP client could not be built: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Base URL cannot carry a path: {0}")]
    BaseUrl(Url),
}

impl ApiError {
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Transport(err) => err.status(),
            ApiError::Rejected { status, .. }
            | ApiError::Status(status)
            | ApiError::UnexpectedStatus(status) => Some(*status),
            ApiError::Decode(_) => None,
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }

    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Rejected { message, .. } => Some(message),
            _ => None,
        }
    }

    /// The server's message, or the status text when there is no message.
    ///
    /// `None` for failures where no response was usable at all.
    #[must_use]
    pub fn detail(&self) -> Option<Cow<'_, str>> {
        match self {
            ApiError::Rejected { message, .. } => Some(Cow::Borrowed(message)),
            ApiError::Status(status) | ApiError::UnexpectedStatus(status) => {
                Some(status_text(*status))
            }
            ApiError::Transport(_) | ApiError::Decode(_) => None,
        }
    }
}

fn status_text(status: StatusCode) -> Cow<'static, str> {
    status
        .canonical_reason()
        .map_or_else(|| Cow::Owned(status.as_u16().to_string()), Cow::Borrowed)
}

#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct LoginOutcome {
    pub message: Option<String>,
    pub user: User,
}

/// Query of the post listing. An empty keyword is not sent.
#[derive(Clone, Eq, PartialEq, Debug, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostQuery {
    pub page: PageNumber,
    pub page_size: PageSize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
}

impl PostQuery {
    #[must_use]
    pub fn new(page: PageNumber, page_size: PageSize, keyword: &str) -> Self {
        Self {
            page,
            page_size,
            keyword: (!keyword.is_empty()).then(|| keyword.to_owned()),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
}

impl ApiClient {
    /// Builds a client whose cookie store carries the session on every request.
    pub fn new(base_url: Url, timeout: Option<Duration>) -> Result<Self, ClientBuildError> {
        if base_url.cannot_be_a_base() {
            return Err(ClientBuildError::BaseUrl(base_url));
        }

        let mut builder = Client::builder().cookie_store(true);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base_url,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint<I>(&self, segments: I) -> Url
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    #[instrument(skip(self))]
    pub async fn current_user(&self) -> Result<User> {
        let response = self
            .http
            .get(self.endpoint(["users", "current_user"]))
            .send()
            .await
            .map_err(ApiError::Transport)?;

        let record: CurrentUserRecord = read_json(response).await?;
        Ok(record.into())
    }

    #[instrument(skip_all, fields(email = %credentials.email))]
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<LoginOutcome> {
        let response = self
            .http
            .post(self.endpoint(["auth", "login"]))
            .json(credentials)
            .send()
            .await
            .map_err(ApiError::Transport)?;

        let record: LoginRecord = read_json(response).await?;
        debug!(user = %record.user.id, "Logged in");
        Ok(record.into())
    }

    /// Where to send the browser for the third-party login flow.
    ///
    /// The flow is a full navigation handled by the backend, so no request is
    /// made here.
    #[must_use]
    pub fn google_login_url(&self) -> Url {
        self.endpoint(["auth", "login", "google"])
    }

    #[instrument(skip_all, fields(username = %request.username.get()))]
    pub async fn signup(&self, request: &SignupRequest) -> Result<Option<String>> {
        let response = self
            .http
            .post(self.endpoint(["auth", "signup"]))
            .json(request)
            .send()
            .await
            .map_err(ApiError::Transport)?;

        let record: MessageRecord = read_json(response).await?;
        Ok(record.into_message())
    }

    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<()> {
        let response = self
            .http
            .post(self.endpoint(["auth", "logout"]))
            .send()
            .await
            .map_err(ApiError::Transport)?;

        check_status(response).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn list_posts(&self, query: &PostQuery) -> Result<Page<Post>> {
        let response = self
            .http
            .get(self.endpoint(["posts"]))
            .query(query)
            .send()
            .await
            .map_err(ApiError::Transport)?;

        let page: Page<Post> = read_json(response).await?;
        debug!(count = page.data.len(), total = page.total, "Fetched posts");
        Ok(page)
    }

    /// Creates a post. The created representation is not needed by callers,
    /// which refetch the listing instead.
    #[instrument(skip(self))]
    pub async fn create_post(&self, content: &PostContent) -> Result<()> {
        let response = self
            .http
            .post(self.endpoint(["posts"]))
            .json(content)
            .send()
            .await
            .map_err(ApiError::Transport)?;

        check_status(response).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn fetch_post(&self, id: &Id<PostMarker>) -> Result<Post> {
        let response = self
            .http
            .get(self.endpoint(["posts", id.as_str()]))
            .send()
            .await
            .map_err(ApiError::Transport)?;

        read_json(response).await
    }

    #[instrument(skip(self))]
    pub async fn update_post(&self, id: &Id<PostMarker>, content: &PostContent) -> Result<Post> {
        let response = self
            .http
            .put(self.endpoint(["posts", id.as_str()]))
            .json(content)
            .send()
            .await
            .map_err(ApiError::Transport)?;

        read_json(response).await
    }

    #[instrument(skip(self))]
    pub async fn delete_post(&self, id: &Id<PostMarker>) -> Result<()> {
        let response = self
            .http
            .delete(self.endpoint(["posts", id.as_str()]))
            .send()
            .await
            .map_err(ApiError::Transport)?;

        expect_no_content(response).await
    }

    #[instrument(skip(self))]
    pub async fn list_comments(
        &self,
        post: &Id<PostMarker>,
        request: PageRequest,
    ) -> Result<CommentPageResponse> {
        let response = self
            .http
            .get(self.endpoint(["posts", post.as_str(), "comments"]))
            .query(&request)
            .send()
            .await
            .map_err(ApiError::Transport)?;

        read_json(response).await
    }

    #[instrument(skip(self))]
    pub async fn create_comment(
        &self,
        post: &Id<PostMarker>,
        content: &CommentContent,
    ) -> Result<Comment> {
        let response = self
            .http
            .post(self.endpoint(["posts", post.as_str(), "comments"]))
            .json(content)
            .send()
            .await
            .map_err(ApiError::Transport)?;

        read_json(response).await
    }

    #[instrument(skip(self))]
    pub async fn update_comment(
        &self,
        post: &Id<PostMarker>,
        comment: &Id<CommentMarker>,
        content: &CommentContent,
    ) -> Result<Comment> {
        let response = self
            .http
            .put(self.endpoint(["posts", post.as_str(), "comments", comment.as_str()]))
            .json(content)
            .send()
            .await
            .map_err(ApiError::Transport)?;

        read_json(response).await
    }

    #[instrument(skip(self))]
    pub async fn delete_comment(
        &self,
        post: &Id<PostMarker>,
        comment: &Id<CommentMarker>,
    ) -> Result<()> {
        let response = self
            .http
            .delete(self.endpoint(["posts", post.as_str(), "comments", comment.as_str()]))
            .send()
            .await
            .map_err(ApiError::Transport)?;

        expect_no_content(response).await
    }
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(rejection(status, response).await)
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let response = check_status(response).await?;
    let body = response.bytes().await.map_err(ApiError::Transport)?;

    Ok(serde_json::from_slice(&body)?)
}

async fn expect_no_content(response: Response) -> Result<()> {
    match response.status() {
        StatusCode::NO_CONTENT => Ok(()),
        status if status.is_success() => Err(ApiError::UnexpectedStatus(status)),
        status => Err(rejection(status, response).await),
    }
}

async fn rejection(status: StatusCode, response: Response) -> ApiError {
    let message = match response.bytes().await {
        Ok(body) => serde_json::from_slice::<MessageRecord>(&body)
            .ok()
            .and_then(MessageRecord::into_message),
        Err(err) => {
            debug!(error = %err, %status, "Error body could not be read");
            None
        }
    };

    match message {
        Some(message) => ApiError::Rejected { status, message },
        None => ApiError::Status(status),
    }
}
