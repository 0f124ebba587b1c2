//! Line-oriented terminal front-end.
//!
//! The shell owns the session and whichever view is on screen. Each input
//! line is parsed into a [`Command`], run against the active view, and the
//! screen is printed again together with every notice raised on the way.

use crate::{
    notice::{Notices, Notifier, drain},
    route::{Navigation, Route},
    session::Session,
    views::{
        home,
        login::LoginView,
        nav::NavBar,
        post_detail::{DEFAULT_COMMENT_PAGE_SIZE, PostDetailView},
        post_list::{DEFAULT_PAGE_SIZE, PostListView},
        signup::{SignupForm, SignupView},
    },
};
use quill_client::ApiClient;
use quill_common::{
    model::{
        Id,
        auth::{LoginCredentials, Password},
        comment::{CommentContent, CommentMarker},
        post::{PostContent, PostMarker},
    },
    util::{InvalidPagingValueError, PageNumber, PageSize},
};
use std::{fmt::Write as _, ops::ControlFlow, str::FromStr, sync::Arc};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

pub const HELP: &str = "\
Commands:
  home | posts | open <id>             go somewhere
  page <n> [size]                      change page of the post list
  search [keyword]                     filter the post list
  new <title> | <content>              create a post
  delete <id>                          delete a post from the list
  edit <title> | <content>             edit the open post
  delete-post                          delete the open post
  more                                 load more comments
  comment <text>                       comment on the open post
  edit-comment <id> <text>             edit a comment
  delete-comment <id>                  delete a comment
  login <email> <password> | google    sign in
  signup <username> <email> <password> <confirm>
  logout | help | quit";

#[derive(Clone, Eq, PartialEq, Debug)]
pub enum Command {
    Home,
    Posts,
    Open(Id<PostMarker>),
    Page {
        page: PageNumber,
        page_size: Option<PageSize>,
    },
    Search(String),
    New(PostContent),
    Delete(Id<PostMarker>),
    Edit(PostContent),
    DeletePost,
    More,
    Comment(CommentContent),
    EditComment {
        id: Id<CommentMarker>,
        content: CommentContent,
    },
    DeleteComment(Id<CommentMarker>),
    Login(LoginCredentials),
    Google,
    Signup(SignupForm),
    Logout,
    Help,
    Quit,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Error)]
pub enum CommandParseError {
    #[error("Type a command, or `help` for a list of commands")]
    Empty,
    #[error("Unknown command `{0}`, try `help`")]
    Unknown(String),
    #[error("Usage: {0}")]
    Usage(&'static str),
    #[error(transparent)]
    Paging(#[from] InvalidPagingValueError),
}

impl FromStr for Command {
    type Err = CommandParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (name, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(name, rest)| (name, rest.trim()));

        let command = match name {
            "" => return Err(CommandParseError::Empty),
            "home" => Self::Home,
            "posts" => Self::Posts,
            "open" => Self::Open(Id::new(required(rest, "open <id>")?)),
            "page" => parse_page(rest)?,
            "search" => Self::Search(rest.to_owned()),
            "new" => Self::New(post_content(rest, "new <title> | <content>")?),
            "delete" => Self::Delete(Id::new(required(rest, "delete <id>")?)),
            "edit" => Self::Edit(post_content(rest, "edit <title> | <content>")?),
            "delete-post" => Self::DeletePost,
            "more" => Self::More,
            "comment" => Self::Comment(CommentContent {
                content: required(rest, "comment <text>")?.to_owned(),
            }),
            "edit-comment" => {
                const USAGE: &str = "edit-comment <id> <text>";
                let (id, text) = rest
                    .split_once(char::is_whitespace)
                    .ok_or(CommandParseError::Usage(USAGE))?;
                Self::EditComment {
                    id: Id::new(id),
                    content: CommentContent {
                        content: required(text.trim(), USAGE)?.to_owned(),
                    },
                }
            }
            "delete-comment" => {
                Self::DeleteComment(Id::new(required(rest, "delete-comment <id>")?))
            }
            "login" => {
                let [email, password] = words(rest, "login <email> <password>")?;
                Self::Login(LoginCredentials {
                    email: email.to_owned(),
                    password: Password::new(password),
                })
            }
            "google" => Self::Google,
            "signup" => {
                let [username, email, password, confirm] =
                    words(rest, "signup <username> <email> <password> <confirm>")?;
                Self::Signup(SignupForm {
                    username: username.to_owned(),
                    email: email.to_owned(),
                    password: password.to_owned(),
                    confirm: confirm.to_owned(),
                })
            }
            "logout" => Self::Logout,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => return Err(CommandParseError::Unknown(other.to_owned())),
        };

        Ok(command)
    }
}

fn required<'a>(rest: &'a str, usage: &'static str) -> Result<&'a str, CommandParseError> {
    if rest.is_empty() {
        Err(CommandParseError::Usage(usage))
    } else {
        Ok(rest)
    }
}

fn words<'a, const N: usize>(
    rest: &'a str,
    usage: &'static str,
) -> Result<[&'a str; N], CommandParseError> {
    let words: Vec<&str> = rest.split_whitespace().collect();
    words
        .try_into()
        .map_err(|_| CommandParseError::Usage(usage))
}

fn post_content(rest: &str, usage: &'static str) -> Result<PostContent, CommandParseError> {
    let (title, content) = rest
        .split_once('|')
        .ok_or(CommandParseError::Usage(usage))?;
    let title = title.trim();
    if title.is_empty() {
        return Err(CommandParseError::Usage(usage));
    }

    Ok(PostContent {
        title: title.to_owned(),
        content: content.trim().to_owned(),
    })
}

fn parse_page(rest: &str) -> Result<Command, CommandParseError> {
    const USAGE: &str = "page <n> [size]";
    let number = |word: &str| {
        word.parse::<u32>()
            .map_err(|_| CommandParseError::Usage(USAGE))
    };

    let mut parts = rest.split_whitespace();
    let page = parts.next().ok_or(CommandParseError::Usage(USAGE))?;
    let page = PageNumber::try_from(number(page)?)?;
    let page_size = parts
        .next()
        .map(|size| Ok::<_, CommandParseError>(PageSize::try_from(number(size)?)?))
        .transpose()?;
    if parts.next().is_some() {
        return Err(CommandParseError::Usage(USAGE));
    }

    Ok(Command::Page { page, page_size })
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub struct ShellConfig {
    pub post_page_size: PageSize,
    pub comment_page_size: PageSize,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            post_page_size: DEFAULT_PAGE_SIZE,
            comment_page_size: DEFAULT_COMMENT_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("Error reading input: {0}")]
    Read(std::io::Error),
    #[error("Error writing output: {0}")]
    Write(std::io::Error),
}

#[derive(Debug)]
enum Screen {
    Home,
    Posts(PostListView),
    Post(Box<PostDetailView>),
    Login,
    Signup,
}

#[derive(Debug)]
pub struct Shell {
    client: Arc<ApiClient>,
    notifier: Notifier,
    notices: Notices,
    session: Session,
    config: ShellConfig,
    screen: Screen,
}

impl Shell {
    /// A shell showing the home view. `notices` must belong to `notifier`.
    #[must_use]
    pub fn new(
        client: Arc<ApiClient>,
        notifier: Notifier,
        notices: Notices,
        session: Session,
        config: ShellConfig,
    ) -> Self {
        Self {
            client,
            notifier,
            notices,
            session,
            config,
            screen: Screen::Home,
        }
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub fn route(&self) -> Route {
        match &self.screen {
            Screen::Home => Route::Home,
            Screen::Posts(_) => Route::Posts,
            Screen::Post(view) => Route::Post(view.post_id().clone()),
            Screen::Login => Route::Login,
            Screen::Signup => Route::Signup,
        }
    }

    #[must_use]
    pub fn post_list(&self) -> Option<&PostListView> {
        match &self.screen {
            Screen::Posts(view) => Some(view),
            _ => None,
        }
    }

    #[must_use]
    pub fn post_detail(&self) -> Option<&PostDetailView> {
        match &self.screen {
            Screen::Post(view) => Some(&**view),
            _ => None,
        }
    }

    /// Follows a navigation, including any redirect the new view asks for.
    pub async fn navigate(&mut self, navigation: Navigation) {
        let mut next = Some(navigation);
        while let Some(navigation) = next.take() {
            match navigation {
                Navigation::Route(route) => {
                    debug!(%route, "Navigating");
                    next = self.enter(route).await;
                }
                Navigation::External(url) => {
                    info!(%url, "Handing off to the browser");
                    self.notifier
                        .info(format!("Continue in your browser: {url}"));
                }
            }
        }
    }

    async fn enter(&mut self, route: Route) -> Option<Navigation> {
        match route {
            Route::Home => self.screen = Screen::Home,
            Route::Posts => {
                if let Screen::Posts(view) = &mut self.screen {
                    view.refresh().await;
                    return None;
                }

                let mut view = PostListView::new(
                    Arc::clone(&self.client),
                    self.notifier.clone(),
                    self.config.post_page_size,
                );
                view.refresh().await;
                self.screen = Screen::Posts(view);
            }
            Route::Post(id) => {
                if let Screen::Post(view) = &mut self.screen {
                    return view.change_post(id).await;
                }

                let mut view = Box::new(PostDetailView::new(
                    Arc::clone(&self.client),
                    self.notifier.clone(),
                    id,
                    self.config.comment_page_size,
                ));
                let redirect = view.open().await;
                self.screen = Screen::Post(view);
                return redirect;
            }
            Route::Login => self.screen = Screen::Login,
            Route::Signup => self.screen = Screen::Signup,
        }
        None
    }

    /// Runs one command. Breaks when the user asked to quit.
    pub async fn execute(&mut self, command: Command) -> ControlFlow<()> {
        let navigation = match command {
            Command::Home => Some(Route::Home.into()),
            Command::Posts => Some(Route::Posts.into()),
            Command::Open(id) => Some(Route::Post(id).into()),
            Command::Page { page, page_size } => {
                if let Screen::Posts(view) = &mut self.screen {
                    let page_size = page_size.unwrap_or(view.page_size());
                    view.set_pagination(page, page_size).await;
                } else {
                    self.unavailable("page");
                }
                None
            }
            Command::Search(keyword) => {
                if let Screen::Posts(view) = &mut self.screen {
                    view.search(keyword).await;
                } else {
                    self.unavailable("search");
                }
                None
            }
            Command::New(content) => {
                if let Screen::Posts(view) = &mut self.screen {
                    view.open_create();
                    view.create(&content).await;
                } else {
                    self.unavailable("new");
                }
                None
            }
            Command::Delete(id) => {
                if let Screen::Posts(view) = &mut self.screen {
                    view.delete(&id).await;
                } else {
                    self.unavailable("delete");
                }
                None
            }
            Command::Edit(content) => {
                if let Screen::Post(view) = &mut self.screen {
                    view.start_edit();
                    view.update_post(content).await;
                } else {
                    self.unavailable("edit");
                }
                None
            }
            Command::DeletePost => {
                if let Screen::Post(view) = &mut self.screen {
                    view.delete_post().await
                } else {
                    self.unavailable("delete-post");
                    None
                }
            }
            Command::More => {
                if let Screen::Post(view) = &mut self.screen {
                    if !view.load_more().await {
                        self.notifier.info("No more comments.");
                    }
                } else {
                    self.unavailable("more");
                }
                None
            }
            Command::Comment(content) => {
                if let Screen::Post(view) = &mut self.screen {
                    view.create_comment(&content).await;
                } else {
                    self.unavailable("comment");
                }
                None
            }
            Command::EditComment { id, content } => {
                if let Screen::Post(view) = &mut self.screen {
                    if view.begin_comment_edit(&id) {
                        view.submit_comment_edit(content).await;
                    } else {
                        self.notifier.error("Comment not found.");
                    }
                } else {
                    self.unavailable("edit-comment");
                }
                None
            }
            Command::DeleteComment(id) => {
                if let Screen::Post(view) = &mut self.screen {
                    view.delete_comment(&id).await;
                } else {
                    self.unavailable("delete-comment");
                }
                None
            }
            Command::Login(credentials) => {
                self.screen = Screen::Login;
                LoginView::new(Arc::clone(&self.client), self.notifier.clone())
                    .submit(&credentials, &mut self.session)
                    .await
            }
            Command::Google => Some(
                LoginView::new(Arc::clone(&self.client), self.notifier.clone()).google_login(),
            ),
            Command::Signup(form) => {
                self.screen = Screen::Signup;
                SignupView::new(Arc::clone(&self.client), self.notifier.clone())
                    .submit(&form)
                    .await
            }
            Command::Logout => {
                if self.session.is_logged_in() {
                    self.session.logout().await;
                    Some(Route::Home.into())
                } else {
                    self.notifier.warning("You are not logged in.");
                    None
                }
            }
            Command::Help => {
                self.notifier.info(HELP);
                None
            }
            Command::Quit => return ControlFlow::Break(()),
        };

        if let Some(navigation) = navigation {
            self.navigate(navigation).await;
        }
        ControlFlow::Continue(())
    }

    fn unavailable(&self, command: &str) {
        self.notifier.warning(format!(
            "`{command}` is not available on {}",
            self.route()
        ));
    }

    /// The navigation bar, the active view and the notices raised since the
    /// last call.
    pub fn render(&mut self) -> String {
        let mut out = NavBar::for_session(&self.session).render();
        out.push_str("\n\n");

        match &self.screen {
            Screen::Home => out.push_str(&home::render(&self.session)),
            Screen::Posts(view) => out.push_str(&view.render()),
            Screen::Post(view) => out.push_str(&view.render()),
            Screen::Login => out.push_str("Login\n  login <email> <password>\n  google\n"),
            Screen::Signup => {
                out.push_str("Sign Up\n  signup <username> <email> <password> <confirm>\n");
            }
        }

        for notice in drain(&mut self.notices) {
            let _ = writeln!(out, "{notice}");
        }
        out
    }

    /// Reads commands until `quit` or the end of input.
    pub async fn run<R, W>(&mut self, input: R, mut output: W) -> Result<(), ShellError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = input.lines();
        self.write_screen(&mut output).await?;

        loop {
            output.write_all(b"> ").await.map_err(ShellError::Write)?;
            output.flush().await.map_err(ShellError::Write)?;

            let Some(line) = lines.next_line().await.map_err(ShellError::Read)? else {
                break;
            };

            match line.parse::<Command>() {
                Ok(command) => {
                    if self.execute(command).await.is_break() {
                        break;
                    }
                }
                Err(CommandParseError::Empty) => continue,
                Err(err) => self.notifier.warning(err.to_string()),
            }
            self.write_screen(&mut output).await?;
        }

        debug!("Shell finished");
        Ok(())
    }

    async fn write_screen<W>(&mut self, output: &mut W) -> Result<(), ShellError>
    where
        W: AsyncWrite + Unpin,
    {
        let screen = self.render();
        output
            .write_all(screen.as_bytes())
            .await
            .map_err(ShellError::Write)
    }
}
