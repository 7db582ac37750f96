use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;
use crate::{account, conversation, message, slack, user};

mod handler;
pub mod history;
pub mod markup;
pub mod model;
pub mod service;
pub mod window;

pub use model::ConversationArchive;
pub use service::Assembler;
pub use window::ArchiveWindow;

type Result<T> = std::result::Result<T, Error>;

pub fn pages<S>(s: AppState) -> Router<S> {
    Router::new()
        .route(
            "/archive/conversation/{type}/{ref}",
            get(handler::pages::archive),
        )
        .with_state(s)
}

pub fn api<S>(s: AppState) -> Router<S> {
    Router::new()
        .route(
            "/archive/conversation/send",
            post(handler::api::send_conversation),
        )
        .route("/archive/send", post(handler::api::send_all))
        .with_state(s)
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    _Account(#[from] account::Error),
    #[error(transparent)]
    _Conversation(#[from] conversation::Error),
    #[error(transparent)]
    _Message(#[from] message::Error),
    #[error(transparent)]
    _Slack(#[from] slack::Error),
    #[error(transparent)]
    _User(#[from] user::Error),
}
