use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct Profile {
    #[serde(default)]
    pub real_name: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub image_72: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub is_bot: bool,
    #[serde(default)]
    pub tz: Option<String>,
    #[serde(default)]
    pub profile: Profile,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct BotIcons {
    #[serde(default)]
    pub image_48: Option<String>,
    #[serde(default)]
    pub image_72: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct Bot {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub icons: BotIcons,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct Purpose {
    #[serde(default)]
    pub value: String,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct Channel {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub is_channel: bool,
    #[serde(default)]
    pub is_group: bool,
    #[serde(default)]
    pub is_im: bool,
    #[serde(default)]
    pub is_mpim: bool,
    #[serde(default)]
    pub is_private: bool,
    #[serde(default)]
    pub is_archived: bool,
    #[serde(default)]
    pub is_member: bool,
    #[serde(default)]
    pub is_user_deleted: bool,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub purpose: Purpose,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct Team {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub domain: String,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct AuthTest {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub team: String,
    #[serde(default)]
    pub user_id: String,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct AttachmentField {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub value: String,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct Attachment {
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub pretext: Option<String>,
    #[serde(default)]
    pub author_name: Option<String>,
    #[serde(default)]
    pub author_link: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub title_link: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub fallback: Option<String>,
    #[serde(default)]
    pub thumb_url: Option<String>,
    #[serde(default)]
    pub footer: Option<String>,
    #[serde(default)]
    pub fields: Vec<AttachmentField>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct File {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub permalink: String,
    #[serde(default)]
    pub thumb_360: Option<String>,
    #[serde(default)]
    pub thumb_360_w: Option<u32>,
    #[serde(default)]
    pub thumb_360_h: Option<u32>,
    #[serde(default)]
    pub thumb_720: Option<String>,
}

impl File {
    /// Displayed at 360 dimensions, but the 720 variant is preferred for dense screens.
    pub fn thumbnail_url(&self) -> Option<&str> {
        self.thumb_720
            .as_deref()
            .or(self.thumb_360.as_deref())
            .filter(|u| !u.is_empty())
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct Reaction {
    pub name: String,
    #[serde(default)]
    pub count: u32,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct Message {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub subtype: Option<String>,
    #[serde(default)]
    pub ts: Ts,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub bot_id: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub files: Vec<File>,
    #[serde(default)]
    pub reactions: Vec<Reaction>,
}

/// Slack message timestamp, fixed-point seconds such as `"1710403200.000100"`.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq, Hash)]
pub struct Ts(String);

impl Ts {
    pub fn new(ts: impl Into<String>) -> Self {
        Self(ts.into())
    }

    pub fn from_unix(secs: i64) -> Self {
        Self(secs.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn parts(&self) -> Option<(i64, u32)> {
        let (secs, frac) = match self.0.split_once('.') {
            Some((secs, frac)) => (secs, frac),
            None => (self.0.as_str(), ""),
        };
        let secs = secs.parse::<i64>().ok()?;

        if frac.is_empty() {
            return Some((secs, 0));
        }
        if frac.len() > 9 || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        let nanos = format!("{frac:0<9}").parse::<u32>().ok()?;
        Some((secs, nanos))
    }
}

impl Display for Ts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct History {
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub has_more: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct HistoryParams {
    pub channel: String,
    pub oldest: Ts,
    pub latest: Ts,
    pub limit: usize,
    pub inclusive: bool,
}

#[derive(Clone, Debug)]
pub struct Download {
    pub headers: Vec<(String, String)>,
    pub body: bytes::Bytes,
}
