pub mod client;
mod record;

pub use client::{ApiClient, ApiError, ClientBuildError, LoginOutcome, PostQuery};
pub use reqwest::{StatusCode, Url};
