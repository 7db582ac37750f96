use std::sync::Arc;

use axum::{Router, routing::post};

use crate::slack;
use crate::state::AppState;

mod handler;
pub mod model;
pub mod repository;

pub use model::{Account, DigestAddress, Settings};

type Result<T> = std::result::Result<T, Error>;
pub type Repository = Arc<dyn repository::AccountRepository + Send + Sync>;

pub fn api<S>(s: AppState) -> Router<S> {
    Router::new()
        .route("/account/settings", post(handler::api::save_settings))
        .route("/account/delete", post(handler::api::delete))
        .with_state(s)
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("account not found: {0}")]
    NotFound(String),
    #[error("malformed timezone_name value: {0}")]
    MalformedTimezone(String),
    #[error("invalid email address: {0}")]
    InvalidEmailAddress(String),
    #[error("no email addresses found in Slack profile of {0}")]
    MissingEmailAddress(String),

    #[error(transparent)]
    _Redis(#[from] redis::RedisError),
    #[error(transparent)]
    _ParseJson(#[from] serde_json::Error),
    #[error(transparent)]
    _Slack(#[from] slack::Error),
}
