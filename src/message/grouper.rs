use log::warn;

use crate::user::{Author, Identity, UserLookup};

use super::{Message, MessageGroup};

pub async fn resolve_authors(
    lookup: &mut UserLookup,
    messages: Vec<Message>,
) -> Vec<(Message, Option<Identity>)> {
    let mut resolved = Vec::with_capacity(messages.len());

    for message in messages {
        let author = if message.is_hidden() {
            None
        } else {
            lookup
                .for_message(Author::from(message.raw()))
                .await
                .inspect_err(|e| warn!("{e} (ts {})", message.ts()))
                .ok()
        };
        resolved.push((message, author));
    }

    resolved
}

pub fn group(messages: Vec<(Message, Option<Identity>)>) -> Vec<MessageGroup> {
    let mut groups: Vec<MessageGroup> = Vec::new();

    for (message, author) in messages {
        if message.is_hidden() {
            continue;
        }
        let Some(author) = author else {
            let raw = message.raw();
            warn!(
                "could not determine author for message type {} (subtype {}), skipping",
                raw.kind,
                raw.subtype.as_deref().unwrap_or_default()
            );
            continue;
        };

        match groups.last_mut() {
            Some(current) if current.accepts(&message, &author) => current.push(message),
            _ => groups.push(MessageGroup::new(author, message)),
        }
    }

    groups
}
