use std::sync::OnceLock;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::{error, info};

use crate::markup::{ErrorPage, Wrappable};
use crate::{
    account, archive, conversation, digest, emoji, file, integration, slack, style, user,
};

static SHOW_DETAILS: OnceLock<bool> = OnceLock::new();

pub fn show_details(show: bool) {
    if SHOW_DETAILS.set(show).is_err() {
        info!("Error detail visibility already set");
    }
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
    _Digest(#[from] digest::Error),
    #[error(transparent)]
    _Emoji(#[from] emoji::Error),
    #[error(transparent)]
    _File(#[from] file::Error),
    #[error(transparent)]
    _Integration(#[from] integration::Error),
    #[error(transparent)]
    _Slack(#[from] slack::Error),
    #[error(transparent)]
    _Style(#[from] style::Error),
    #[error(transparent)]
    _User(#[from] user::Error),
    #[error(transparent)]
    _Io(#[from] std::io::Error),
}

impl Error {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::_Conversation(conversation::Error::UnknownKind(_))
            | Self::_Account(
                account::Error::MalformedTimezone(_) | account::Error::InvalidEmailAddress(_),
            )
            | Self::_File(
                file::Error::Malformed
                | file::Error::_Base64(_)
                | file::Error::_ParseJson(_)
                | file::Error::HiddenByLimit(_)
                | file::Error::UnknownAccount(_),
            ) => StatusCode::BAD_REQUEST,

            Self::_Account(account::Error::NotFound(_))
            | Self::_File(file::Error::NoThumbnail(_)) => StatusCode::NOT_FOUND,

            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = if status.is_client_error() {
            info!("{self}");
            self.to_string()
        } else {
            error!("{self}");
            "Something went wrong".to_owned()
        };
        let details = SHOW_DETAILS
            .get()
            .copied()
            .unwrap_or_default()
            .then(|| format!("{self:?}"));

        (
            status,
            Wrappable::new(ErrorPage {
                status,
                message: &message,
                details: details.as_deref(),
            }),
        )
            .into_response()
    }
}
