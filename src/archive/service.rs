use chrono::{DateTime, Utc};
use log::{debug, info};

use crate::account::Account;
use crate::conversation::Conversation;
use crate::file::{self, ThumbnailLinks};
use crate::message::{self, Message, TextRenderer};
use crate::style::{self, StyleTable};
use crate::user::UserLookup;
use crate::{emoji, slack};

use super::{ArchiveWindow, ConversationArchive, Result, history};

#[derive(Clone)]
pub struct Assembler {
    emoji: emoji::Table,
    styles: style::Styles,
    codec: file::Codec,
    base_url: String,
}

impl Assembler {
    pub fn new(
        emoji: emoji::Table,
        styles: style::Styles,
        codec: file::Codec,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            emoji,
            styles,
            codec,
            base_url: base_url.into(),
        }
    }

    pub fn styles(&self) -> &StyleTable {
        &self.styles
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn build(
        &self,
        account: &Account,
        lookup: &mut UserLookup,
        conversation: Conversation,
        now: DateTime<Utc>,
    ) -> Result<ConversationArchive> {
        let tz = account.timezone()?;
        let window = ArchiveWindow::day_before(now, tz);

        let raw = history::fetch_history(lookup.slack(), &conversation, &window).await?;
        let messages = raw.into_iter().map(|m| Message::new(m, tz)).collect();
        let mut groups = message::group(message::resolve_authors(lookup, messages).await);

        if !groups.is_empty() {
            let team_url = team_url(account, lookup.slack()).await?;
            let links = ThumbnailLinks::new(self.codec.clone(), &self.base_url, &account.slack_user_id);
            let mut renderer = TextRenderer::new(lookup, &self.emoji, &self.styles, &team_url);

            for group in &mut groups {
                for message in group.messages_mut() {
                    message.render(&mut renderer, &links).await?;
                }
            }
        }

        let archive = ConversationArchive {
            conversation,
            window,
            groups,
        };
        info!(
            "Assembled {} messages of {} for {}",
            archive.message_count(),
            archive.conversation.id(),
            account.slack_user_id
        );
        Ok(archive)
    }
}

/// Older accounts may lack the team URL, Slack knows it.
async fn team_url(account: &Account, slack: &slack::Client) -> Result<String> {
    if !account.slack_team_url.is_empty() {
        return Ok(account.slack_team_url.clone());
    }

    debug!("No team URL stored for {}, asking Slack", account.slack_user_id);
    Ok(slack.auth_test().await?.url)
}
