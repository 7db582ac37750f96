use serde::{Deserialize, Serialize};

use crate::slack::model::{Bot, User};

const SYNTHETIC_USER_PICTURE: &str =
    "https://i1.wp.com/slack.global.ssl.fastly.net/66f9/img/avatars/ava_0025-72.png?ssl=1";
const SYNTHETIC_BOT_PICTURE: &str =
    "https://slack.global.ssl.fastly.net/66f9/img/default_application_icon.png";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    id: String,
    name: String,
    real_name: Option<String>,
    picture: String,
    email: Option<String>,
    synthetic: bool,
}

impl Identity {
    pub fn new(id: impl Into<String>, name: impl Into<String>, picture: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            real_name: None,
            picture: picture.into(),
            email: None,
            synthetic: false,
        }
    }

    /// Placeholder for authors Slack cannot tell us about, keyed by `synthetic-<name>`.
    pub fn synthetic(name: &str) -> Self {
        Self {
            synthetic: true,
            ..Self::new(format!("synthetic-{name}"), name, SYNTHETIC_USER_PICTURE)
        }
    }

    pub fn synthetic_bot(name: &str) -> Self {
        Self {
            synthetic: true,
            ..Self::new(format!("synthetic-{name}"), name, SYNTHETIC_BOT_PICTURE)
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn real_name(&self) -> Option<&str> {
        self.real_name.as_deref()
    }

    pub fn picture(&self) -> &str {
        &self.picture
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub const fn is_synthetic(&self) -> bool {
        self.synthetic
    }
}

impl From<User> for Identity {
    fn from(user: User) -> Self {
        let picture = user
            .profile
            .image_72
            .unwrap_or_else(|| SYNTHETIC_USER_PICTURE.to_string());

        Self {
            id: user.id,
            name: user.name,
            real_name: user.profile.real_name.filter(|n| !n.is_empty()),
            picture,
            email: user.profile.email.filter(|e| !e.is_empty()),
            synthetic: false,
        }
    }
}

impl From<Bot> for Identity {
    fn from(bot: Bot) -> Self {
        let picture = bot
            .icons
            .image_72
            .or(bot.icons.image_48)
            .unwrap_or_else(|| SYNTHETIC_BOT_PICTURE.to_string());

        Self::new(bot.id, bot.name, picture)
    }
}
