//! In-memory blogging backend served over HTTP for the view tests.

#![allow(dead_code)]

use axum::{
    Json, Router,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use axum_extra::{
    TypedHeader,
    headers::Cookie,
    routing::{RouterExt, TypedPath},
};
use quill_app::notice::{Notice, Notices, Notifier, drain};
use quill_client::{ApiClient, Url};
use quill_common::model::{
    Id,
    auth::{LoginCredentials, SignupRequest},
    comment::{Comment, CommentContent, CommentMarker},
    page::Page,
    post::{Post, PostContent, PostMarker},
    user::{Author, AuthorProfile, User, UserMarker, Username},
};
use serde::Deserialize;
use serde_json::json;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};
use time::{Duration, OffsetDateTime, macros::datetime};
use tokio::net::TcpListener;

pub const EMAIL: &str = "ada@example.com";
pub const PASSWORD: &str = "hunter22";

/// How the comment listing answers.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default, Hash)]
pub enum CommentShape {
    #[default]
    Paged,
    Untotaled,
    Legacy,
    Malformed,
}

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub keyword: Option<String>,
}

#[derive(Debug, Default)]
pub struct Backend {
    pub users: Vec<(User, String)>,
    pub sessions: HashMap<String, Id<UserMarker>>,
    /// Oldest first; listings answer newest first.
    pub posts: Vec<Post>,
    /// Oldest first; listings answer newest first.
    pub comments: Vec<Comment>,
    pub comment_shape: CommentShape,
    pub post_queries: Vec<ListQuery>,
    pub comment_queries: Vec<ListQuery>,
    next_id: u64,
}

impl Backend {
    /// One registered user and no content.
    pub fn with_user() -> Self {
        let mut backend = Self::default();
        let user = User {
            id: Id::new("u1"),
            username: Username::new("ada".to_owned()).unwrap(),
            email: Some(EMAIL.to_owned()),
        };
        backend.users.push((user, PASSWORD.to_owned()));
        backend
    }

    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}{}", self.next_id)
    }

    fn timestamp(&self) -> OffsetDateTime {
        let offset = i64::try_from(self.next_id).unwrap_or_default();
        datetime!(2025-01-01 00:00 UTC) + Duration::minutes(offset)
    }

    fn author(&self) -> Option<Author> {
        self.users.first().map(|(user, _)| {
            Author::Populated(AuthorProfile {
                id: user.id.clone(),
                username: user.username.get().to_owned(),
            })
        })
    }

    pub fn add_post(&mut self, title: &str, content: &str) -> Id<PostMarker> {
        let id = Id::new(self.next_id("p"));
        let post = Post {
            id: id.clone(),
            title: title.to_owned(),
            content: content.to_owned(),
            author: self.author(),
            created_at: Some(self.timestamp()),
            updated_at: None,
        };
        self.posts.push(post);
        id
    }

    pub fn add_comment(&mut self, post: &Id<PostMarker>, content: &str) -> Id<CommentMarker> {
        let id = Id::new(self.next_id("c"));
        let comment = Comment {
            id: id.clone(),
            post: Some(post.clone()),
            content: content.to_owned(),
            author: self.author(),
            created_at: Some(self.timestamp()),
        };
        self.comments.push(comment);
        id
    }

    fn session_user(&self, cookie: Option<&TypedHeader<Cookie>>) -> Option<User> {
        let token = cookie?.get("sid")?;
        let id = self.sessions.get(token)?;
        self.users
            .iter()
            .find(|(user, _)| &user.id == id)
            .map(|(user, _)| user.clone())
    }

    fn comments_of(&self, post: &Id<PostMarker>) -> Vec<Comment> {
        self.comments
            .iter()
            .rev()
            .filter(|comment| comment.post.as_ref() == Some(post))
            .cloned()
            .collect()
    }
}

type Shared = Arc<Mutex<Backend>>;

pub struct TestBackend {
    state: Shared,
    pub base_url: Url,
}

impl TestBackend {
    pub async fn start(backend: Backend) -> Self {
        let state = Arc::new(Mutex::new(backend));
        let app = routes().with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            state,
            base_url: Url::parse(&format!("http://{address}/")).unwrap(),
        }
    }

    /// A fresh client with an empty cookie jar.
    pub fn client(&self) -> Arc<ApiClient> {
        Arc::new(ApiClient::new(self.base_url.clone(), None).unwrap())
    }

    pub fn state(&self) -> MutexGuard<'_, Backend> {
        self.state.lock().unwrap()
    }
}

/// A client pointed at a port nobody listens on.
pub fn unreachable_client() -> Arc<ApiClient> {
    let url = Url::parse("http://127.0.0.1:9/").unwrap();
    Arc::new(ApiClient::new(url, Some(std::time::Duration::from_secs(5))).unwrap())
}

pub fn notifier() -> (Notifier, Notices) {
    Notifier::channel()
}

pub fn messages(notices: &mut Notices) -> Vec<String> {
    drain(notices)
        .into_iter()
        .map(|Notice { message, .. }| message)
        .collect()
}

pub fn credentials() -> LoginCredentials {
    LoginCredentials {
        email: EMAIL.to_owned(),
        password: quill_common::model::auth::Password::new(PASSWORD),
    }
}

fn routes() -> Router<Shared> {
    Router::new()
        .typed_get(current_user)
        .typed_post(login)
        .typed_post(signup)
        .typed_post(logout)
        .typed_get(list_posts)
        .typed_post(create_post)
        .typed_get(get_post)
        .typed_put(update_post)
        .typed_delete(delete_post)
        .typed_get(list_comments)
        .typed_post(create_comment)
        .typed_put(update_comment)
        .typed_delete(delete_comment)
}

fn message(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

fn unauthorized() -> Response {
    message(StatusCode::UNAUTHORIZED, "Not authenticated")
}

fn page<T: Clone>(items: &[T], query: &ListQuery) -> Vec<T> {
    let page = usize::try_from(query.page.unwrap_or(1).max(1)).unwrap();
    let page_size = usize::try_from(query.page_size.unwrap_or(10).max(1)).unwrap();
    items
        .iter()
        .skip((page - 1) * page_size)
        .take(page_size)
        .cloned()
        .collect()
}

#[derive(TypedPath)]
#[typed_path("/users/current_user")]
struct CurrentUserPath;

async fn current_user(
    _: CurrentUserPath,
    cookie: Option<TypedHeader<Cookie>>,
    State(state): State<Shared>,
) -> Response {
    let backend = state.lock().unwrap();
    match backend.session_user(cookie.as_ref()) {
        Some(user) => Json(json!({ "user": user })).into_response(),
        None => unauthorized(),
    }
}

#[derive(TypedPath)]
#[typed_path("/auth/login")]
struct LoginPath;

async fn login(
    _: LoginPath,
    State(state): State<Shared>,
    Json(credentials): Json<LoginCredentials>,
) -> Response {
    let mut backend = state.lock().unwrap();
    let Some(user) = backend
        .users
        .iter()
        .find(|(user, password)| {
            user.email.as_deref() == Some(credentials.email.as_str())
                && password == credentials.password.expose()
        })
        .map(|(user, _)| user.clone())
    else {
        return message(StatusCode::UNAUTHORIZED, "Invalid credentials");
    };

    let token = backend.next_id("session");
    backend.sessions.insert(token.clone(), user.id.clone());
    (
        [(header::SET_COOKIE, format!("sid={token}; Path=/; HttpOnly"))],
        Json(json!({ "message": "Login successful", "user": user })),
    )
        .into_response()
}

#[derive(TypedPath)]
#[typed_path("/auth/signup")]
struct SignupPath;

async fn signup(
    _: SignupPath,
    State(state): State<Shared>,
    Json(request): Json<SignupRequest>,
) -> Response {
    let mut backend = state.lock().unwrap();
    if backend
        .users
        .iter()
        .any(|(user, _)| user.email.as_deref() == Some(request.email.as_str()))
    {
        return message(StatusCode::BAD_REQUEST, "User already exists");
    }

    let user = User {
        id: Id::new(backend.next_id("u")),
        username: request.username,
        email: Some(request.email),
    };
    backend
        .users
        .push((user, request.password.expose().to_owned()));
    message(StatusCode::CREATED, "User registered successfully")
}

#[derive(TypedPath)]
#[typed_path("/auth/logout")]
struct LogoutPath;

async fn logout(
    _: LogoutPath,
    cookie: Option<TypedHeader<Cookie>>,
    State(state): State<Shared>,
) -> Response {
    let mut backend = state.lock().unwrap();
    if let Some(token) = cookie.as_ref().and_then(|cookie| cookie.get("sid")) {
        backend.sessions.remove(token);
    }
    message(StatusCode::OK, "")
}

#[derive(TypedPath)]
#[typed_path("/posts")]
struct PostsPath;

async fn list_posts(
    _: PostsPath,
    State(state): State<Shared>,
    Query(query): Query<ListQuery>,
) -> Response {
    let mut backend = state.lock().unwrap();
    backend.post_queries.push(query.clone());

    let keyword = query.keyword.as_deref().unwrap_or_default().to_lowercase();
    let matching: Vec<Post> = backend
        .posts
        .iter()
        .rev()
        .filter(|post| {
            post.title.to_lowercase().contains(&keyword)
                || post.content.to_lowercase().contains(&keyword)
        })
        .cloned()
        .collect();

    Json(Page {
        data: page(&matching, &query),
        total: matching.len() as u64,
    })
    .into_response()
}

async fn create_post(
    _: PostsPath,
    cookie: Option<TypedHeader<Cookie>>,
    State(state): State<Shared>,
    Json(content): Json<PostContent>,
) -> Response {
    let mut backend = state.lock().unwrap();
    if backend.session_user(cookie.as_ref()).is_none() {
        return unauthorized();
    }
    if content.title.trim().is_empty() {
        return message(StatusCode::BAD_REQUEST, "Title is required");
    }

    let id = backend.add_post(&content.title, &content.content);
    let post = backend.posts.iter().find(|post| post.id == id).cloned();
    (StatusCode::CREATED, Json(post)).into_response()
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/posts/{id}")]
struct PostPath {
    id: Id<PostMarker>,
}

async fn get_post(PostPath { id }: PostPath, State(state): State<Shared>) -> Response {
    let backend = state.lock().unwrap();
    match backend.posts.iter().find(|post| post.id == id) {
        Some(post) => Json(post.clone()).into_response(),
        None => message(StatusCode::NOT_FOUND, "Post not found"),
    }
}

async fn update_post(
    PostPath { id }: PostPath,
    cookie: Option<TypedHeader<Cookie>>,
    State(state): State<Shared>,
    Json(content): Json<PostContent>,
) -> Response {
    let mut backend = state.lock().unwrap();
    if backend.session_user(cookie.as_ref()).is_none() {
        return unauthorized();
    }

    let updated_at = backend.timestamp();
    match backend.posts.iter_mut().find(|post| post.id == id) {
        Some(post) => {
            post.title = content.title;
            post.content = content.content;
            post.updated_at = Some(updated_at);
            Json(post.clone()).into_response()
        }
        None => message(StatusCode::NOT_FOUND, "Post not found"),
    }
}

async fn delete_post(
    PostPath { id }: PostPath,
    cookie: Option<TypedHeader<Cookie>>,
    State(state): State<Shared>,
) -> Response {
    let mut backend = state.lock().unwrap();
    if backend.session_user(cookie.as_ref()).is_none() {
        return unauthorized();
    }

    let before = backend.posts.len();
    backend.posts.retain(|post| post.id != id);
    if backend.posts.len() == before {
        return message(StatusCode::NOT_FOUND, "Post not found");
    }
    backend.comments.retain(|comment| comment.post.as_ref() != Some(&id));
    StatusCode::NO_CONTENT.into_response()
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/posts/{id}/comments")]
struct CommentsPath {
    id: Id<PostMarker>,
}

async fn list_comments(
    CommentsPath { id }: CommentsPath,
    State(state): State<Shared>,
    Query(query): Query<ListQuery>,
) -> Response {
    let mut backend = state.lock().unwrap();
    backend.comment_queries.push(query.clone());

    let comments = backend.comments_of(&id);
    let data = page(&comments, &query);
    match backend.comment_shape {
        CommentShape::Paged => Json(Page {
            data,
            total: comments.len() as u64,
        })
        .into_response(),
        CommentShape::Untotaled => Json(json!({ "data": data })).into_response(),
        CommentShape::Legacy => Json(data).into_response(),
        CommentShape::Malformed => Json(json!({ "comments": data })).into_response(),
    }
}

async fn create_comment(
    CommentsPath { id }: CommentsPath,
    cookie: Option<TypedHeader<Cookie>>,
    State(state): State<Shared>,
    Json(content): Json<CommentContent>,
) -> Response {
    let mut backend = state.lock().unwrap();
    if backend.session_user(cookie.as_ref()).is_none() {
        return unauthorized();
    }
    if !backend.posts.iter().any(|post| post.id == id) {
        return message(StatusCode::NOT_FOUND, "Post not found");
    }

    let comment_id = backend.add_comment(&id, &content.content);
    let comment = backend
        .comments
        .iter()
        .find(|comment| comment.id == comment_id)
        .cloned();
    (StatusCode::CREATED, Json(comment)).into_response()
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/posts/{id}/comments/{comment_id}")]
struct CommentPath {
    id: Id<PostMarker>,
    comment_id: Id<CommentMarker>,
}

async fn update_comment(
    CommentPath { id, comment_id }: CommentPath,
    cookie: Option<TypedHeader<Cookie>>,
    State(state): State<Shared>,
    Json(content): Json<CommentContent>,
) -> Response {
    let mut backend = state.lock().unwrap();
    if backend.session_user(cookie.as_ref()).is_none() {
        return unauthorized();
    }

    match backend
        .comments
        .iter_mut()
        .find(|comment| comment.id == comment_id && comment.post.as_ref() == Some(&id))
    {
        Some(comment) => {
            comment.content = content.content;
            Json(comment.clone()).into_response()
        }
        None => message(StatusCode::NOT_FOUND, "Comment not found"),
    }
}

async fn delete_comment(
    CommentPath { id, comment_id }: CommentPath,
    cookie: Option<TypedHeader<Cookie>>,
    State(state): State<Shared>,
) -> Response {
    let mut backend = state.lock().unwrap();
    if backend.session_user(cookie.as_ref()).is_none() {
        return unauthorized();
    }

    let before = backend.comments.len();
    backend
        .comments
        .retain(|comment| !(comment.id == comment_id && comment.post.as_ref() == Some(&id)));
    if backend.comments.len() == before {
        return message(StatusCode::NOT_FOUND, "Comment not found");
    }
    StatusCode::NO_CONTENT.into_response()
}
