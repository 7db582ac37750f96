use std::env;
use std::sync::Arc;

use axum::{Router, routing::get};
use base64::{Engine, engine::general_purpose::STANDARD};
use log::warn;

use crate::state::AppState;

mod handler;
pub mod model;

pub use model::{FileUrlRef, FileUrlRefCodec, ThumbnailLinks};

type Result<T> = std::result::Result<T, Error>;
pub type Codec = Arc<FileUrlRefCodec>;

pub fn api<S>(s: AppState) -> Router<S> {
    Router::new()
        .route(
            "/archive/file-thumbnail/{ref}",
            get(handler::api::thumbnail),
        )
        .with_state(s)
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("malformed file reference")]
    Malformed,
    #[error("could not encrypt file reference")]
    NotEncrypted,
    #[error("file {0} is hidden by the team's plan limits")]
    HiddenByLimit(String),
    #[error("no account for file reference owner {0}")]
    UnknownAccount(String),
    #[error("file {0} has no thumbnail")]
    NoThumbnail(String),
    #[error("file reference key must be 32 bytes, got {0}")]
    InvalidKeyLength(usize),

    #[error(transparent)]
    _Env(#[from] env::VarError),
    #[error(transparent)]
    _Base64(#[from] base64::DecodeError),
    #[error(transparent)]
    _ParseJson(#[from] serde_json::Error),
}

#[derive(Clone)]
pub struct Config {
    key: [u8; 32],
}

impl Default for Config {
    /// A random key keeps local runs working; links die with the process.
    fn default() -> Self {
        warn!("FILE_URL_REF_KEY is not set, using a random key");
        Self {
            key: FileUrlRefCodec::generate_key(),
        }
    }
}

impl Config {
    pub fn env() -> Result<Self> {
        let encoded = env::var("FILE_URL_REF_KEY")?;
        let bytes = STANDARD.decode(encoded.trim())?;
        let key = <[u8; 32]>::try_from(bytes.as_slice())
            .map_err(|_| Error::InvalidKeyLength(bytes.len()))?;

        Ok(Self { key })
    }

    pub fn codec(&self) -> Codec {
        Arc::new(FileUrlRefCodec::new(self.key))
    }
}
