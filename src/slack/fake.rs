use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};

use super::model::{
    AuthTest, Bot, Channel, Download, File, History, HistoryParams, Message, Team, Ts, User,
};
use super::{Client, Error, Result, SlackApi, SlackConnector};

#[derive(Default)]
pub(crate) struct FakeSlack {
    pub users: Vec<User>,
    pub bots: Vec<Bot>,
    pub channels: Vec<Channel>,
    pub members: HashMap<String, Vec<String>>,
    pub messages: HashMap<String, Vec<Message>>,
    pub emoji: HashMap<String, String>,
    pub files: Vec<File>,
    pub hidden_files: Vec<String>,
    pub team: Team,
    pub failing: Vec<&'static str>,
    calls: Mutex<HashMap<&'static str, usize>>,
    history_pages: AtomicUsize,
}

impl FakeSlack {
    pub fn new() -> Self {
        Self {
            team: Team {
                id: "T1".into(),
                name: "Acme".into(),
                domain: "acme".into(),
            },
            ..Default::default()
        }
    }

    pub fn with_user(mut self, id: &str, name: &str) -> Self {
        self.users.push(user(id, name));
        self
    }

    pub fn with_bot(mut self, id: &str, name: &str) -> Self {
        self.bots.push(Bot {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        });
        self
    }

    pub fn with_channel(mut self, channel: Channel) -> Self {
        self.channels.push(channel);
        self
    }

    pub fn with_members(mut self, channel: &str, members: &[&str]) -> Self {
        self.members.insert(
            channel.into(),
            members.iter().map(|m| m.to_string()).collect(),
        );
        self
    }

    pub fn with_messages(mut self, channel: &str, messages: Vec<Message>) -> Self {
        self.messages.insert(channel.into(), messages);
        self
    }

    pub fn with_emoji(mut self, name: &str, url: &str) -> Self {
        self.emoji.insert(name.into(), url.into());
        self
    }

    pub fn with_file(mut self, file: File) -> Self {
        self.files.push(file);
        self
    }

    pub fn with_hidden_file(mut self, id: &str) -> Self {
        self.hidden_files.push(id.into());
        self
    }

    pub fn failing(mut self, method: &'static str) -> Self {
        self.failing.push(method);
        self
    }

    pub fn calls(&self, method: &str) -> usize {
        self.calls
            .lock()
            .map(|c| c.get(method).copied().unwrap_or_default())
            .unwrap_or_default()
    }

    pub fn history_pages(&self) -> usize {
        self.history_pages.load(Ordering::SeqCst)
    }

    fn record(&self, method: &'static str) -> Result<()> {
        if let Ok(mut calls) = self.calls.lock() {
            *calls.entry(method).or_default() += 1;
        }
        if self.failing.contains(&method) {
            return Err(Error::api(method, "fatal_error"));
        }
        Ok(())
    }

    fn not_found(method: &str, what: &str) -> Error {
        Error::api(method, format!("{what}_not_found"))
    }
}

#[derive(Clone)]
pub(crate) struct FakeConnector(pub Arc<FakeSlack>);

impl SlackConnector for FakeConnector {
    fn connect(&self, _token: &str) -> Client {
        self.0.clone()
    }
}

pub(crate) fn user(id: &str, name: &str) -> User {
    User {
        id: id.into(),
        name: name.into(),
        profile: super::model::Profile {
            image_72: Some(format!("https://avatars/{id}.png")),
            email: Some(format!("{name}@example.com")),
            ..Default::default()
        },
        ..Default::default()
    }
}

pub(crate) fn message(ts: i64, user: &str, text: &str) -> Message {
    Message {
        kind: "message".into(),
        ts: Ts::new(format!("{ts}.000100")),
        user: Some(user.into()),
        text: text.into(),
        ..Default::default()
    }
}

fn seconds(ts: &Ts) -> f64 {
    ts.as_str().parse::<f64>().unwrap_or_default()
}

#[async_trait::async_trait]
impl SlackApi for FakeSlack {
    async fn auth_test(&self) -> Result<AuthTest> {
        self.record("auth.test")?;
        Ok(AuthTest {
            url: format!("https://{}.slack.com/", self.team.domain),
            team: self.team.name.clone(),
            user_id: self.users.first().map(|u| u.id.clone()).unwrap_or_default(),
        })
    }

    async fn team_info(&self) -> Result<Team> {
        self.record("team.info")?;
        Ok(self.team.clone())
    }

    async fn users(&self) -> Result<Vec<User>> {
        self.record("users.list")?;
        Ok(self.users.clone())
    }

    async fn user_info(&self, id: &str) -> Result<User> {
        self.record("users.info")?;
        self.users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or_else(|| Self::not_found("users.info", "user"))
    }

    async fn bot_info(&self, id: &str) -> Result<Bot> {
        self.record("bots.info")?;
        self.bots
            .iter()
            .find(|b| b.id == id)
            .cloned()
            .ok_or_else(|| Self::not_found("bots.info", "bot"))
    }

    async fn conversations(&self) -> Result<Vec<Channel>> {
        self.record("conversations.list")?;
        Ok(self
            .channels
            .iter()
            .filter(|c| !c.is_archived)
            .cloned()
            .collect())
    }

    async fn conversation_info(&self, id: &str) -> Result<Channel> {
        self.record("conversations.info")?;
        self.channels
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| Self::not_found("conversations.info", "channel"))
    }

    async fn conversation_members(&self, id: &str) -> Result<Vec<String>> {
        self.record("conversations.members")?;
        self.members
            .get(id)
            .cloned()
            .ok_or_else(|| Self::not_found("conversations.members", "channel"))
    }

    async fn history(&self, params: &HistoryParams) -> Result<History> {
        self.record("conversations.history")?;
        self.history_pages.fetch_add(1, Ordering::SeqCst);

        let (oldest, latest) = (seconds(&params.oldest), seconds(&params.latest));
        let mut in_window = self
            .messages
            .get(&params.channel)
            .map(|all| {
                all.iter()
                    .filter(|m| {
                        let ts = seconds(&m.ts);
                        ts > oldest && ts < latest
                    })
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        in_window.sort_by(|a, b| seconds(&b.ts).total_cmp(&seconds(&a.ts)));

        let has_more = in_window.len() > params.limit;
        in_window.truncate(params.limit);

        Ok(History {
            messages: in_window,
            has_more,
        })
    }

    async fn emoji(&self) -> Result<HashMap<String, String>> {
        self.record("emoji.list")?;
        Ok(self.emoji.clone())
    }

    async fn file_info(&self, id: &str) -> Result<File> {
        self.record("files.info")?;
        if self.hidden_files.iter().any(|f| f == id) {
            return Err(Error::api("files.info", "hidden_by_limit"));
        }
        self.files
            .iter()
            .find(|f| f.id == id)
            .cloned()
            .ok_or_else(|| Self::not_found("files.info", "file"))
    }

    async fn download(&self, url: &str) -> Result<Download> {
        self.record("download")?;
        Ok(Download {
            headers: vec![("content-type".into(), "image/png".into())],
            body: bytes::Bytes::from(url.as_bytes().to_vec()),
        })
    }
}
