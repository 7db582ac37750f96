use std::env;
use std::fmt;

use axum_extra::extract::cookie::{Cookie, Key, SameSite};
use base64::{Engine, engine::general_purpose::STANDARD};
use log::warn;

pub mod middleware;

type Result<T> = std::result::Result<T, Error>;

#[derive(Clone, PartialEq)]
pub struct Session(String);

impl Session {
    pub const ID: &str = "session";

    pub fn new(slack_user_id: impl Into<String>) -> Self {
        Self(slack_user_id.into())
    }

    pub fn slack_user_id(&self) -> &str {
        &self.0
    }

    /// Expires the session cookie; the path must match the one it was set with.
    pub fn removal() -> Cookie<'static> {
        Cookie::build(Self::ID).path("/").build()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Session({})", self.0)
    }
}

impl From<&Cookie<'_>> for Session {
    fn from(c: &Cookie<'_>) -> Self {
        Self::new(c.value())
    }
}

impl From<Session> for Cookie<'_> {
    fn from(s: Session) -> Self {
        Cookie::build((Session::ID, s.0))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .build()
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("cookie key must be at least 64 bytes, got {0}")]
    ShortKey(usize),

    #[error(transparent)]
    _Env(#[from] env::VarError),
    #[error(transparent)]
    _Base64(#[from] base64::DecodeError),
}

#[derive(Clone)]
pub struct Config {
    key: Key,
}

impl Default for Config {
    fn default() -> Self {
        warn!("COOKIE_KEY is not set, using a random key");
        Self {
            key: Key::generate(),
        }
    }
}

impl Config {
    pub fn env() -> Result<Self> {
        let bytes = STANDARD.decode(env::var("COOKIE_KEY")?.trim())?;
        let key = Key::try_from(bytes.as_slice()).map_err(|_| Error::ShortKey(bytes.len()))?;
        Ok(Self { key })
    }

    pub fn key(&self) -> Key {
        self.key.clone()
    }
}
