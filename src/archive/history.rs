use log::debug;

use crate::conversation::Conversation;
use crate::slack::{self, model as wire};

use super::{ArchiveWindow, Result};

pub const PAGE_SIZE: usize = 1000;

/// All messages of the window, oldest first.
///
/// Slack returns pages newest first, so every page is prepended and the
/// `latest` cursor moves to the oldest message seen. A failing page discards
/// everything fetched so far.
pub async fn fetch_history(
    slack: &slack::Client,
    conversation: &Conversation,
    window: &ArchiveWindow,
) -> Result<Vec<wire::Message>> {
    let oldest = window.oldest();
    let mut latest = window.latest();
    let mut messages: Vec<wire::Message> = Vec::new();

    loop {
        let history = conversation
            .history(slack, oldest.clone(), latest.clone(), PAGE_SIZE)
            .await?;

        let Some(last) = history.messages.last() else {
            break;
        };
        latest = last.ts.clone();

        let mut page = history.messages;
        page.reverse();
        page.append(&mut messages);
        messages = page;

        if !history.has_more {
            break;
        }
    }

    debug!(
        "Fetched {} messages of {} from {} to {}",
        messages.len(),
        conversation.id(),
        window.start(),
        window.end()
    );
    Ok(messages)
}
