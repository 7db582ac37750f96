use std::sync::Arc;

pub mod client;
#[cfg(test)]
pub(crate) mod fake;
pub mod model;

pub use client::{HttpConnector, SlackApi, SlackConnector};

type Result<T> = std::result::Result<T, Error>;
pub type Client = Arc<dyn SlackApi + Send + Sync>;
pub type Connector = Arc<dyn SlackConnector + Send + Sync>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("could not fetch {method} data from Slack: {error}")]
    Api { method: String, error: String },
    #[error("Slack kept rate limiting {0} requests")]
    RateLimited(String),
    #[error("unexpected {0} response from Slack")]
    UnexpectedResponse(String),

    #[error(transparent)]
    _Reqwest(#[from] reqwest::Error),
    #[error(transparent)]
    _ParseJson(#[from] serde_json::Error),
}

impl Error {
    pub fn api(method: impl Into<String>, error: impl Into<String>) -> Self {
        Self::Api {
            method: method.into(),
            error: error.into(),
        }
    }

    /// Slack replies with `hidden_by_limit` for files beyond the free plan history.
    pub fn is_hidden_by_limit(&self) -> bool {
        matches!(self, Self::Api { error, .. } if error == "hidden_by_limit")
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::_Reqwest(e) if e.is_timeout())
    }
}
