use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::model::{
    AuthTest, Bot, Channel, Download, File, History, HistoryParams, Team, User,
};
use super::{Client, Error, Result};

const PAGE_LIMIT: &str = "200";
const MAX_ATTEMPTS: usize = 3;
const DEFAULT_RETRY_AFTER: u64 = 1;
const MAX_RETRY_AFTER: u64 = 30;
const CONVERSATION_TYPES: &str = "public_channel,private_channel,mpim,im";

const FORWARDED_HEADERS: [&str; 8] = [
    "cache-control",
    "content-length",
    "etag",
    "expires",
    "x-content-type-options",
    "x-frame-options",
    "content-type",
    "last-modified",
];

#[async_trait::async_trait]
pub trait SlackApi {
    async fn auth_test(&self) -> Result<AuthTest>;

    async fn team_info(&self) -> Result<Team>;

    async fn users(&self) -> Result<Vec<User>>;

    async fn user_info(&self, id: &str) -> Result<User>;

    async fn bot_info(&self, id: &str) -> Result<Bot>;

    async fn conversations(&self) -> Result<Vec<Channel>>;

    async fn conversation_info(&self, id: &str) -> Result<Channel>;

    async fn conversation_members(&self, id: &str) -> Result<Vec<String>>;

    async fn history(&self, params: &HistoryParams) -> Result<History>;

    /// Custom emoji of the team, name to image URL or `alias:<name>`.
    async fn emoji(&self) -> Result<HashMap<String, String>>;

    async fn file_info(&self, id: &str) -> Result<File>;

    async fn download(&self, url: &str) -> Result<Download>;
}

pub trait SlackConnector {
    fn connect(&self, token: &str) -> Client;
}

#[derive(Clone)]
pub struct HttpConnector {
    http: reqwest::Client,
    api_base: String,
}

impl HttpConnector {
    pub fn new(http: reqwest::Client, api_base: impl Into<String>) -> Self {
        Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }
}

impl SlackConnector for HttpConnector {
    fn connect(&self, token: &str) -> Client {
        Arc::new(HttpSlackClient {
            http: self.http.clone(),
            api_base: self.api_base.clone(),
            token: token.trim().to_string(),
        })
    }
}

pub struct HttpSlackClient {
    http: reqwest::Client,
    api_base: String,
    token: String,
}

#[derive(Deserialize)]
struct Envelope {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize, Default)]
struct ResponseMetadata {
    #[serde(default)]
    next_cursor: String,
}

impl HttpSlackClient {
    async fn call(&self, method: &str, query: &[(&str, &str)]) -> Result<Value> {
        let url = format!("{}/{method}", self.api_base);

        for attempt in 1..=MAX_ATTEMPTS {
            let resp = self
                .http
                .get(&url)
                .bearer_auth(&self.token)
                .query(query)
                .send()
                .await?;

            if resp.status() == StatusCode::TOO_MANY_REQUESTS {
                let delay = retry_after(resp.headers());
                warn!("{method} rate limited, attempt {attempt}/{MAX_ATTEMPTS}, retrying in {delay}s");
                tokio::time::sleep(Duration::from_secs(delay)).await;
                continue;
            }

            let body: Value = resp.error_for_status()?.json().await?;
            let envelope = Envelope::deserialize(&body)?;
            if !envelope.ok {
                let error = envelope.error.unwrap_or_else(|| "unknown_error".into());
                debug!("{method} failed: {error}");
                return Err(Error::api(method, error));
            }

            return Ok(body);
        }

        Err(Error::RateLimited(method.to_string()))
    }

    async fn field<T: DeserializeOwned>(
        &self,
        method: &str,
        field: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let mut body = self.call(method, query).await?;
        let value = body
            .get_mut(field)
            .map(Value::take)
            .ok_or_else(|| Error::UnexpectedResponse(method.to_string()))?;

        serde_json::from_value(value).map_err(Error::from)
    }

    async fn paginate<T: DeserializeOwned>(
        &self,
        method: &str,
        field: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut cursor = String::new();

        loop {
            let mut page_query = query.to_vec();
            page_query.push(("limit", PAGE_LIMIT));
            if !cursor.is_empty() {
                page_query.push(("cursor", cursor.as_str()));
            }

            let mut body = self.call(method, &page_query).await?;
            let page: Vec<T> = match body.get_mut(field).map(Value::take) {
                Some(value) => serde_json::from_value(value)?,
                None => return Err(Error::UnexpectedResponse(method.to_string())),
            };
            let next: ResponseMetadata = body
                .get_mut("response_metadata")
                .map(Value::take)
                .map(serde_json::from_value)
                .transpose()?
                .unwrap_or_default();

            let exhausted = page.is_empty();
            items.extend(page);
            if exhausted || next.next_cursor.is_empty() {
                return Ok(items);
            }
            cursor = next.next_cursor;
        }
    }
}

#[async_trait::async_trait]
impl SlackApi for HttpSlackClient {
    async fn auth_test(&self) -> Result<AuthTest> {
        let body = self.call("auth.test", &[]).await?;
        serde_json::from_value(body).map_err(Error::from)
    }

    async fn team_info(&self) -> Result<Team> {
        self.field("team.info", "team", &[]).await
    }

    async fn users(&self) -> Result<Vec<User>> {
        self.paginate("users.list", "members", &[]).await
    }

    async fn user_info(&self, id: &str) -> Result<User> {
        self.field("users.info", "user", &[("user", id)]).await
    }

    async fn bot_info(&self, id: &str) -> Result<Bot> {
        self.field("bots.info", "bot", &[("bot", id)]).await
    }

    async fn conversations(&self) -> Result<Vec<Channel>> {
        self.paginate(
            "conversations.list",
            "channels",
            &[("types", CONVERSATION_TYPES), ("exclude_archived", "true")],
        )
        .await
    }

    async fn conversation_info(&self, id: &str) -> Result<Channel> {
        self.field("conversations.info", "channel", &[("channel", id)])
            .await
    }

    async fn conversation_members(&self, id: &str) -> Result<Vec<String>> {
        self.paginate("conversations.members", "members", &[("channel", id)])
            .await
    }

    async fn history(&self, params: &HistoryParams) -> Result<History> {
        let limit = params.limit.to_string();
        let body = self
            .call(
                "conversations.history",
                &[
                    ("channel", params.channel.as_str()),
                    ("oldest", params.oldest.as_str()),
                    ("latest", params.latest.as_str()),
                    ("limit", limit.as_str()),
                    ("inclusive", if params.inclusive { "true" } else { "false" }),
                ],
            )
            .await?;

        serde_json::from_value(body).map_err(Error::from)
    }

    async fn emoji(&self) -> Result<HashMap<String, String>> {
        self.field("emoji.list", "emoji", &[]).await
    }

    async fn file_info(&self, id: &str) -> Result<File> {
        self.field("files.info", "file", &[("file", id)]).await
    }

    async fn download(&self, url: &str) -> Result<Download> {
        let resp = self
            .http
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await?
            .error_for_status()?;

        let headers = FORWARDED_HEADERS
            .iter()
            .filter_map(|name| {
                let values = resp.headers().get_all(*name).iter().collect::<Vec<_>>();
                match values.as_slice() {
                    [value] => value
                        .to_str()
                        .ok()
                        .map(|v| (name.to_string(), v.to_string())),
                    _ => None,
                }
            })
            .collect();
        let body = resp.bytes().await?;

        Ok(Download { headers, body })
    }
}

fn retry_after(headers: &HeaderMap) -> u64 {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(DEFAULT_RETRY_AFTER)
        .min(MAX_RETRY_AFTER)
}
