use std::collections::HashMap;

use log::{debug, warn};

use crate::slack::{self, model::Message};

use super::{Error, Identity, Result};

#[derive(Clone, Copy, Debug, Default)]
pub struct Author<'a> {
    pub user: Option<&'a str>,
    pub bot_id: Option<&'a str>,
    pub username: Option<&'a str>,
}

impl<'a> From<&'a Message> for Author<'a> {
    fn from(msg: &'a Message) -> Self {
        let present = |f: &'a Option<String>| f.as_deref().filter(|s| !s.is_empty());
        Self {
            user: present(&msg.user),
            bot_id: present(&msg.bot_id),
            username: present(&msg.username),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Strategy {
    UserId,
    BotId,
    NameMatch,
    SyntheticFromName,
    SyntheticFromId,
}

const CHAIN: [Strategy; 5] = [
    Strategy::UserId,
    Strategy::BotId,
    Strategy::NameMatch,
    Strategy::SyntheticFromName,
    Strategy::SyntheticFromId,
];

pub struct UserLookup {
    slack: slack::Client,
    by_id: HashMap<String, Identity>,
}

impl UserLookup {
    pub async fn new(slack: slack::Client) -> Result<Self> {
        let by_id = slack
            .users()
            .await?
            .into_iter()
            .map(|u| (u.id.clone(), Identity::from(u)))
            .collect::<HashMap<_, _>>();
        debug!("seeded user lookup with {} users", by_id.len());

        Ok(Self { slack, by_id })
    }

    pub fn slack(&self) -> &slack::Client {
        &self.slack
    }

    pub async fn user(&mut self, id: &str) -> Result<Identity> {
        if let Some(identity) = self.by_id.get(id) {
            return Ok(identity.clone());
        }

        let identity = Identity::from(self.slack.user_info(id).await?);
        self.by_id.insert(id.to_string(), identity.clone());
        Ok(identity)
    }

    pub async fn bot(&mut self, id: &str) -> Result<Identity> {
        if let Some(identity) = self.by_id.get(id) {
            return Ok(identity.clone());
        }

        let identity = Identity::from(self.slack.bot_info(id).await?);
        self.by_id.insert(id.to_string(), identity.clone());
        Ok(identity)
    }

    pub fn by_name(&self, name: &str) -> Option<Identity> {
        self.by_id
            .values()
            .find(|i| !i.is_synthetic() && i.name().eq_ignore_ascii_case(name))
            .cloned()
    }

    pub async fn for_message(&mut self, author: Author<'_>) -> Result<Identity> {
        for strategy in CHAIN {
            if let Some(identity) = self.apply(strategy, author).await {
                return Ok(identity);
            }
        }

        Err(Error::AuthorResolutionExhausted)
    }

    async fn apply(&mut self, strategy: Strategy, author: Author<'_>) -> Option<Identity> {
        match strategy {
            Strategy::UserId => {
                let id = author.user?;
                self.user(id)
                    .await
                    .inspect_err(|e| warn!("could not look up user {id}: {e}"))
                    .ok()
            }
            Strategy::BotId => {
                let id = author.bot_id?;
                self.bot(id)
                    .await
                    .inspect_err(|e| warn!("could not look up bot {id}: {e}"))
                    .ok()
            }
            Strategy::NameMatch => self.by_name(author.username?),
            Strategy::SyntheticFromName => Some(Identity::synthetic(author.username?)),
            Strategy::SyntheticFromId => match (author.user, author.bot_id) {
                (Some(user), _) => Some(Identity::synthetic(user)),
                (None, Some(bot)) => Some(Identity::synthetic_bot(bot)),
                (None, None) => None,
            },
        }
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use super::*;
    use crate::slack::fake::{self, FakeSlack};

    async fn lookup(slack: FakeSlack) -> (Arc<FakeSlack>, UserLookup) {
        let slack = Arc::new(slack);
        let lookup = UserLookup::new(slack.clone()).await.unwrap();
        (slack, lookup)
    }

    #[tokio::test]
    async fn should_serve_bulk_seeded_users_from_cache() {
        let (slack, mut lookup) = lookup(FakeSlack::new().with_user("U1", "ana")).await;

        let identity = lookup.user("U1").await.unwrap();

        assert_eq!(identity.name(), "ana");
        assert_eq!(slack.calls("users.list"), 1);
        assert_eq!(slack.calls("users.info"), 0);
    }

    #[tokio::test]
    async fn should_fill_cache_on_miss() {
        let slack = Arc::new(FakeSlack::new().with_user("U1", "ana"));
        let mut lookup = UserLookup {
            slack: slack.clone(),
            by_id: HashMap::new(),
        };

        lookup.user("U1").await.unwrap();
        lookup.user("U1").await.unwrap();

        assert_eq!(slack.calls("users.info"), 1);
    }

    #[tokio::test]
    async fn should_resolve_bot_messages_through_bot_info() {
        let (slack, mut lookup) = lookup(FakeSlack::new().with_bot("B1", "deploy")).await;

        let author = Author {
            bot_id: Some("B1"),
            ..Default::default()
        };
        let first = lookup.for_message(author).await.unwrap();
        let second = lookup.for_message(author).await.unwrap();

        assert_eq!(first.name(), "deploy");
        assert_eq!(first, second);
        assert_eq!(slack.calls("bots.info"), 1);
    }

    #[tokio::test]
    async fn should_match_username_case_insensitively() {
        let (_, mut lookup) = lookup(FakeSlack::new().with_user("U1", "Ana")).await;

        let identity = lookup
            .for_message(Author {
                bot_id: Some("B404"),
                username: Some("ana"),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(identity.id(), "U1");
    }

    #[tokio::test]
    async fn should_synthesize_from_username() {
        let (_, mut lookup) = lookup(FakeSlack::new()).await;

        let identity = lookup
            .for_message(Author {
                username: Some("github"),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(identity, Identity::synthetic("github"));
    }

    #[tokio::test]
    async fn should_synthesize_from_raw_ids_when_lookups_fail() {
        let (_, mut lookup) = lookup(FakeSlack::new()).await;

        let from_user = lookup
            .for_message(Author {
                user: Some("U404"),
                ..Default::default()
            })
            .await
            .unwrap();
        let from_bot = lookup
            .for_message(Author {
                bot_id: Some("B404"),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(from_user, Identity::synthetic("U404"));
        assert_eq!(from_bot, Identity::synthetic_bot("B404"));
    }

    #[tokio::test]
    async fn should_exhaust_chain_without_author_fields() {
        let (_, mut lookup) = lookup(FakeSlack::new()).await;

        let result = lookup.for_message(Author::default()).await;

        assert!(matches!(result, Err(Error::AuthorResolutionExhausted)));
    }

    #[test]
    fn should_ignore_empty_author_fields() {
        let mut msg = fake::message(1, "U1", "hi");
        msg.username = Some(String::new());

        let author = Author::from(&msg);

        assert_eq!(author.user, Some("U1"));
        assert_eq!(author.username, None);
    }
}
