use log::warn;

use crate::slack::{
    self,
    model::{Channel, History, HistoryParams, Ts},
};
use crate::user::{Identity, UserLookup};

use super::{Error, Kind, Result};

#[derive(Clone, Debug, PartialEq)]
pub enum Conversation {
    Channel(Channel),
    PrivateChannel(Channel),
    DirectMessage {
        channel: Channel,
        counterpart: Identity,
    },
    /// Members exclude the account's own user.
    MultiPartyDirectMessage {
        channel: Channel,
        members: Vec<Identity>,
    },
}

impl Conversation {
    pub async fn from_ref(
        kind: Kind,
        id: &str,
        lookup: &mut UserLookup,
        own_user_id: &str,
    ) -> Result<Self> {
        let channel = lookup.slack().conversation_info(id).await?;
        Self::from_channel(kind, channel, lookup, own_user_id).await
    }

    async fn from_channel(
        kind: Kind,
        channel: Channel,
        lookup: &mut UserLookup,
        own_user_id: &str,
    ) -> Result<Self> {
        let conversation = match kind {
            Kind::Channel => Self::Channel(channel),
            Kind::PrivateChannel => Self::PrivateChannel(channel),
            Kind::DirectMessage => {
                let user_id = channel
                    .user
                    .as_deref()
                    .ok_or_else(|| Error::MissingCounterpart(channel.id.clone()))?;
                let counterpart = lookup.user(user_id).await?;
                Self::DirectMessage {
                    channel,
                    counterpart,
                }
            }
            Kind::MultiPartyDirectMessage => {
                let member_ids = lookup.slack().conversation_members(&channel.id).await?;
                let mut members = Vec::with_capacity(member_ids.len());
                for member_id in member_ids.iter().filter(|m| *m != own_user_id) {
                    members.push(lookup.user(member_id).await?);
                }
                Self::MultiPartyDirectMessage { channel, members }
            }
        };

        Ok(conversation)
    }

    pub fn kind(&self) -> Kind {
        match self {
            Self::Channel(_) => Kind::Channel,
            Self::PrivateChannel(_) => Kind::PrivateChannel,
            Self::DirectMessage { .. } => Kind::DirectMessage,
            Self::MultiPartyDirectMessage { .. } => Kind::MultiPartyDirectMessage,
        }
    }

    pub fn channel(&self) -> &Channel {
        match self {
            Self::Channel(channel) | Self::PrivateChannel(channel) => channel,
            Self::DirectMessage { channel, .. } | Self::MultiPartyDirectMessage { channel, .. } => {
                channel
            }
        }
    }

    pub fn id(&self) -> &str {
        &self.channel().id
    }

    pub fn name(&self) -> String {
        match self {
            Self::Channel(channel) => format!("#{}", channel.name),
            Self::PrivateChannel(channel) => format!("🔒{}", channel.name),
            Self::DirectMessage { counterpart, .. } => counterpart.name().to_string(),
            Self::MultiPartyDirectMessage { members, .. } => members
                .iter()
                .map(Identity::name)
                .collect::<Vec<_>>()
                .join(", "),
        }
    }

    pub fn purpose(&self) -> &str {
        match self {
            Self::Channel(channel) | Self::PrivateChannel(channel) => &channel.purpose.value,
            Self::DirectMessage { .. } | Self::MultiPartyDirectMessage { .. } => "",
        }
    }

    pub fn to_ref(&self) -> (Kind, String) {
        (self.kind(), self.id().to_string())
    }

    pub fn archive_url(&self) -> String {
        format!("/archive/conversation/{}/{}", self.kind(), self.id())
    }

    pub async fn history(
        &self,
        slack: &slack::Client,
        oldest: Ts,
        latest: Ts,
        limit: usize,
    ) -> Result<History> {
        let history = slack
            .history(&HistoryParams {
                channel: self.id().to_string(),
                oldest,
                latest,
                limit,
                inclusive: false,
            })
            .await?;

        Ok(history)
    }
}

#[derive(Clone, Debug, Default)]
pub struct Conversations {
    pub channels: Vec<Conversation>,
    pub private_channels: Vec<Conversation>,
    pub direct_messages: Vec<Conversation>,
    pub multi_party_direct_messages: Vec<Conversation>,
}

impl Conversations {
    pub async fn load(lookup: &mut UserLookup, own_user_id: &str) -> Result<Self> {
        let mut conversations = Self::default();

        for channel in lookup.slack().conversations().await? {
            if channel.is_archived {
                continue;
            }

            match classify(&channel) {
                Some(Kind::Channel) if channel.is_member => {
                    conversations.channels.push(Conversation::Channel(channel));
                }
                Some(Kind::PrivateChannel) => {
                    conversations
                        .private_channels
                        .push(Conversation::PrivateChannel(channel));
                }
                Some(Kind::MultiPartyDirectMessage) => {
                    let mpdm = Conversation::from_channel(
                        Kind::MultiPartyDirectMessage,
                        channel,
                        lookup,
                        own_user_id,
                    )
                    .await?;
                    conversations.multi_party_direct_messages.push(mpdm);
                }
                Some(Kind::DirectMessage) if !channel.is_user_deleted => {
                    let id = channel.id.clone();
                    match Conversation::from_channel(
                        Kind::DirectMessage,
                        channel,
                        lookup,
                        own_user_id,
                    )
                    .await
                    {
                        Ok(dm) => conversations.direct_messages.push(dm),
                        Err(Error::MissingCounterpart(_)) => {
                            warn!("skipping direct message {id} without counterpart")
                        }
                        Err(e) => return Err(e),
                    }
                }
                _ => {}
            }
        }

        Ok(conversations)
    }

    /// Channels, private channels, direct messages, then multi-party direct messages.
    pub fn iter(&self) -> impl Iterator<Item = &Conversation> {
        self.channels
            .iter()
            .chain(&self.private_channels)
            .chain(&self.direct_messages)
            .chain(&self.multi_party_direct_messages)
    }

    pub fn len(&self) -> usize {
        self.channels.len()
            + self.private_channels.len()
            + self.direct_messages.len()
            + self.multi_party_direct_messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl IntoIterator for Conversations {
    type Item = Conversation;
    type IntoIter = std::vec::IntoIter<Conversation>;

    fn into_iter(self) -> Self::IntoIter {
        let mut all = self.channels;
        all.extend(self.private_channels);
        all.extend(self.direct_messages);
        all.extend(self.multi_party_direct_messages);
        all.into_iter()
    }
}

/// Relies on the structured flags; MPIMs also carry `is_group`, so they are checked first.
fn classify(channel: &Channel) -> Option<Kind> {
    if channel.is_im {
        Some(Kind::DirectMessage)
    } else if channel.is_mpim {
        Some(Kind::MultiPartyDirectMessage)
    } else if channel.is_private || channel.is_group {
        Some(Kind::PrivateChannel)
    } else if channel.is_channel {
        Some(Kind::Channel)
    } else {
        None
    }
}
