use quill_app::{
    notice::Notifier,
    session::Session,
    shell::{Shell, ShellConfig, ShellError},
};
use quill_client::{ApiClient, ClientBuildError, Url};
use quill_common::util::PageSize;
use serde::Deserialize;
use std::{str::FromStr, sync::Arc, time::Duration};
use thiserror::Error;
use tokio::io::BufReader;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Error)]
enum InitError {
    #[error("Error parsing .env file: {0}")]
    Dotenv(#[from] dotenvy::Error),
    #[error("Error parsing environment: {0}")]
    Envy(#[from] envy::Error),
    #[error("Error parsing API base URL: {0}")]
    BaseUrl(<Url as FromStr>::Err),
    #[error("Error building API client: {0}")]
    Client(#[from] ClientBuildError),
    #[error("Error running shell: {0}")]
    Shell(#[from] ShellError),
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize)]
struct Env {
    #[serde(default = "default_api_base_url")]
    api_base_url: String,
    post_page_size: Option<PageSize>,
    comment_page_size: Option<PageSize>,
    request_timeout_secs: Option<u64>,
}

fn default_api_base_url() -> String {
    "http://localhost:3000/".to_owned()
}

fn install_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "quill_app=debug,quill_client=debug,quill_common=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn get_env() -> Result<Env, InitError> {
    if let Err(e) = dotenvy::dotenv() {
        if e.not_found() {
            debug!("No .dotenv file found");
        } else {
            return Err(e.into());
        }
    }

    envy::from_env().map_err(InitError::from)
}

#[tokio::main]
async fn main() -> Result<(), InitError> {
    install_tracing();
    let env = get_env()?;

    let base_url = Url::parse(&env.api_base_url).map_err(InitError::BaseUrl)?;
    let timeout = env.request_timeout_secs.map(Duration::from_secs);
    let client = Arc::new(ApiClient::new(base_url, timeout)?);

    let defaults = ShellConfig::default();
    let config = ShellConfig {
        post_page_size: env.post_page_size.unwrap_or(defaults.post_page_size),
        comment_page_size: env
            .comment_page_size
            .unwrap_or(defaults.comment_page_size),
    };

    let (notifier, notices) = Notifier::channel();
    let session = Session::init(Arc::clone(&client), notifier.clone()).await;
    debug!(state = ?session.state(), "Session initialized");

    let mut shell = Shell::new(client, notifier, notices, session, config);
    shell
        .run(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::{InitError, default_api_base_url};
    use quill_client::Url;

    #[test]
    fn base_url_errors_are_reported() {
        assert!(Url::parse(&default_api_base_url()).is_ok());

        let err = Url::parse("not a url")
            .map_err(InitError::BaseUrl)
            .unwrap_err();
        assert!(matches!(err, InitError::BaseUrl(_)));
        assert!(err.to_string().starts_with("Error parsing API base URL"));
    }
}
