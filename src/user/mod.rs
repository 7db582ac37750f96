use crate::slack;

pub mod lookup;
pub mod model;

pub use lookup::{Author, UserLookup};
pub use model::Identity;

type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("could not determine an author for the message")]
    AuthorResolutionExhausted,

    #[error(transparent)]
    _Slack(#[from] slack::Error),
}
