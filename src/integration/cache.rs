use std::env;
use std::fmt::{self, Display};

use redis::{AsyncCommands, RedisResult, aio::ConnectionManager};

use crate::integration::{self, Result};

#[derive(Clone)]
pub struct Config {
    host: String,
    port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: String::from("127.0.0.1"),
            port: 6379,
        }
    }
}

impl Config {
    pub fn env() -> Result<Self> {
        let host = env::var("REDIS_HOST")?;
        let port = env::var("REDIS_PORT")?.parse()?;
        Ok(Self { host, port })
    }
}

pub async fn init_client(config: &Config) -> Result<redis::Client> {
    redis::Client::open(format!("redis://{}:{}", &config.host, &config.port))
        .map_err(integration::Error::from)
}

pub async fn init(config: &Config) -> Result<Redis> {
    init_client(config)
        .await?
        .get_connection_manager()
        .await
        .map(Redis::new)
        .map_err(integration::Error::from)
}

#[derive(Clone, Copy, Debug)]
pub enum Key<'a> {
    Account(&'a str),
    Accounts,
}

impl Display for Key<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Account(id) => write!(f, "account:{id}"),
            Key::Accounts => f.write_str("accounts"),
        }
    }
}

#[derive(Clone)]
pub struct Redis {
    con: ConnectionManager,
}

impl Redis {
    pub fn new(con: ConnectionManager) -> Self {
        Self { con }
    }

    pub async fn get(&self, key: Key<'_>) -> RedisResult<Option<String>> {
        let mut con = self.con.clone();
        con.get(key.to_string()).await
    }

    pub async fn set(&self, key: Key<'_>, value: &str) -> RedisResult<()> {
        let mut con = self.con.clone();
        let _: () = con.set(key.to_string(), value).await?;
        Ok(())
    }

    pub async fn del(&self, key: Key<'_>) -> RedisResult<()> {
        let mut con = self.con.clone();
        let _: () = con.del(key.to_string()).await?;
        Ok(())
    }

    pub async fn sadd(&self, key: Key<'_>, member: &str) -> RedisResult<()> {
        let mut con = self.con.clone();
        let _: () = con.sadd(key.to_string(), member).await?;
        Ok(())
    }

    pub async fn srem(&self, key: Key<'_>, member: &str) -> RedisResult<()> {
        let mut con = self.con.clone();
        let _: () = con.srem(key.to_string(), member).await?;
        Ok(())
    }

    pub async fn smembers(&self, key: Key<'_>) -> RedisResult<Vec<String>> {
        let mut con = self.con.clone();
        con.smembers(key.to_string()).await
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn should_format_keys() {
        assert_eq!(Key::Account("U123").to_string(), "account:U123");
        assert_eq!(Key::Accounts.to_string(), "accounts");
    }
}
