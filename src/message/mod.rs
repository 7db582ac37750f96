use crate::{file, slack};

pub mod grouper;
pub mod markup;
pub mod model;
pub mod text;

pub use grouper::{group, resolve_authors};
pub use model::{Message, MessageGroup, StyleClass};
pub use text::TextRenderer;

type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    _File(#[from] file::Error),
    #[error(transparent)]
    _Slack(#[from] slack::Error),
}
