use std::sync::Arc;

use axum::{Router, routing::get};
use chrono::{DateTime, Datelike, TimeDelta, Utc};
use chrono_tz::Tz;

use crate::state::AppState;
use crate::{account, archive, conversation, mail, slack, user};

mod handler;
pub mod queue;
pub mod service;

pub use queue::{Job, Queue};

type Result<T> = std::result::Result<T, Error>;
pub type Service = Arc<dyn service::DigestService + Send + Sync>;

pub fn api<S>(s: AppState) -> Router<S> {
    Router::new()
        .route("/archive/cron", get(handler::api::cron))
        .with_state(s)
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    _Account(#[from] account::Error),
    #[error(transparent)]
    _Archive(#[from] archive::Error),
    #[error(transparent)]
    _Conversation(#[from] conversation::Error),
    #[error(transparent)]
    _Mail(#[from] mail::Error),
    #[error(transparent)]
    _Slack(#[from] slack::Error),
    #[error(transparent)]
    _User(#[from] user::Error),
}

const TRANSIENT_MARKERS: [&str; 3] = ["timed out", "canceled", "cancelled"];

impl Error {
    /// Timeouts and cancellations anywhere in the source chain.
    pub fn is_transient(&self) -> bool {
        if matches!(self, Self::_Slack(e) if e.is_timeout())
            || matches!(self, Self::_Mail(e) if e.is_timeout())
        {
            return true;
        }

        let mut source: Option<&(dyn std::error::Error + 'static)> = Some(self);
        while let Some(e) = source {
            let message = e.to_string().to_lowercase();
            if TRANSIENT_MARKERS.iter().any(|m| message.contains(m)) {
                return true;
            }
            source = e.source();
        }
        false
    }
}

/// True during the first hour of the local day.
pub fn is_past_midnight(now: DateTime<Utc>, tz: Tz) -> bool {
    let local = now.with_timezone(&tz);
    let hour_ago = local - TimeDelta::hours(1);
    local.day() != hour_ago.day()
}
