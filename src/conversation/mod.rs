use std::fmt::Display;
use std::str::FromStr;

use axum::{Router, routing::get};
use serde::{Deserialize, Serialize};

use crate::state::AppState;
use crate::{slack, user};

mod handler;
pub mod markup;
pub mod model;

pub use model::{Conversation, Conversations};

type Result<T> = std::result::Result<T, Error>;

pub fn pages<S>(s: AppState) -> Router<S> {
    Router::new()
        .route("/", get(handler::pages::index))
        .with_state(s)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Kind {
    #[serde(rename = "channel")]
    Channel,
    #[serde(rename = "private-channel")]
    PrivateChannel,
    #[serde(rename = "dm")]
    DirectMessage,
    #[serde(rename = "mpdm-group")]
    MultiPartyDirectMessage,
}

impl Kind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Channel => "channel",
            Self::PrivateChannel => "private-channel",
            Self::DirectMessage => "dm",
            Self::MultiPartyDirectMessage => "mpdm-group",
        }
    }

    pub const fn is_direct(&self) -> bool {
        matches!(self, Self::DirectMessage | Self::MultiPartyDirectMessage)
    }
}

impl Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Kind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "channel" => Ok(Self::Channel),
            "private-channel" => Ok(Self::PrivateChannel),
            "dm" => Ok(Self::DirectMessage),
            "mpdm-group" => Ok(Self::MultiPartyDirectMessage),
            unknown => Err(Error::UnknownKind(unknown.to_string())),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("unknown conversation type: {0}")]
    UnknownKind(String),
    #[error("direct message {0} has no counterpart user")]
    MissingCounterpart(String),

    #[error(transparent)]
    _Slack(#[from] slack::Error),
    #[error(transparent)]
    _User(#[from] user::Error),
}
