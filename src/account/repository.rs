use async_trait::async_trait;
use log::{debug, warn};

use crate::integration::cache::{self, Key};

use super::{Account, Error};

#[async_trait]
pub trait AccountRepository {
    async fn find(&self, slack_user_id: &str) -> super::Result<Account>;

    async fn find_all(&self) -> super::Result<Vec<Account>>;

    async fn save(&self, account: &Account) -> super::Result<()>;

    async fn delete(&self, slack_user_id: &str) -> super::Result<()>;
}

pub struct RedisAccountRepository {
    redis: cache::Redis,
}

impl RedisAccountRepository {
    pub fn new(redis: cache::Redis) -> Self {
        Self { redis }
    }
}

#[async_trait]
impl AccountRepository for RedisAccountRepository {
    async fn find(&self, slack_user_id: &str) -> super::Result<Account> {
        let json = self
            .redis
            .get(Key::Account(slack_user_id))
            .await?
            .ok_or_else(|| Error::NotFound(slack_user_id.to_string()))?;

        serde_json::from_str(&json).map_err(Error::from)
    }

    async fn find_all(&self) -> super::Result<Vec<Account>> {
        let mut ids = self.redis.smembers(Key::Accounts).await?;
        ids.sort();

        let mut accounts = Vec::with_capacity(ids.len());
        for id in ids {
            match self.find(&id).await {
                Ok(account) => accounts.push(account),
                Err(Error::NotFound(id)) => warn!("account {id} is indexed but missing"),
                Err(e) => return Err(e),
            }
        }

        Ok(accounts)
    }

    async fn save(&self, account: &Account) -> super::Result<()> {
        debug!("saving account {}", account.slack_user_id);

        let json = serde_json::to_string(account)?;
        self.redis.set(Key::Account(&account.slack_user_id), &json).await?;
        self.redis.sadd(Key::Accounts, &account.slack_user_id).await?;
        Ok(())
    }

    async fn delete(&self, slack_user_id: &str) -> super::Result<()> {
        debug!("deleting account {slack_user_id}");

        self.redis.del(Key::Account(slack_user_id)).await?;
        self.redis.srem(Key::Accounts, slack_user_id).await?;
        Ok(())
    }
}
