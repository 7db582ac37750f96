use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use log::warn;
use maud::Markup;

use crate::file::ThumbnailLinks;
use crate::slack::model::{self as wire, Attachment, Reaction, Ts};
use crate::user::Identity;

use super::{Result, TextRenderer};

const DISPLAY_TIMESTAMP_FORMAT: &str = "%-I:%M%P";
const ZERO_WIDTH_SPACE: char = '\u{200b}';

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StyleClass {
    Automated,
    Me,
}

impl StyleClass {
    pub fn of(subtype: Option<&str>) -> Option<Self> {
        match subtype? {
            s if s.starts_with("channel_") || s.starts_with("group_") => Some(Self::Automated),
            "me_message" => Some(Self::Me),
            _ => None,
        }
    }

    pub const fn path(&self) -> &'static str {
        match self {
            Self::Automated => "message.automated",
            Self::Me => "message.me",
        }
    }
}

#[derive(Clone, Debug)]
pub struct RenderedAttachment {
    pub raw: Attachment,
    pub pretext: Markup,
    pub text: Markup,
    pub fields: Vec<(String, Markup)>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Thumbnail {
    pub src: String,
    pub href: String,
    pub name: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Clone, Debug)]
pub struct RenderedReaction {
    pub emoji: Markup,
    pub count: u32,
}

#[derive(Clone, Debug)]
pub struct Rendered {
    pub body: Markup,
    pub attachments: Vec<RenderedAttachment>,
    pub thumbnails: Vec<Thumbnail>,
    pub reactions: Vec<RenderedReaction>,
}

#[derive(Clone, Debug)]
pub struct Message {
    raw: wire::Message,
    timestamp: DateTime<Tz>,
    rendered: Option<Rendered>,
}

impl Message {
    pub fn new(raw: wire::Message, tz: Tz) -> Self {
        let timestamp = to_local(&raw.ts, tz);
        Self {
            raw,
            timestamp,
            rendered: None,
        }
    }

    pub fn raw(&self) -> &wire::Message {
        &self.raw
    }

    pub fn ts(&self) -> &Ts {
        &self.raw.ts
    }

    pub fn timestamp(&self) -> &DateTime<Tz> {
        &self.timestamp
    }

    pub fn is_hidden(&self) -> bool {
        self.raw.hidden
    }

    pub fn style_class(&self) -> Option<StyleClass> {
        StyleClass::of(self.raw.subtype.as_deref())
    }

    pub fn reactions(&self) -> &[Reaction] {
        &self.raw.reactions
    }

    pub fn rendered(&self) -> Option<&Rendered> {
        self.rendered.as_ref()
    }

    pub async fn render(
        &mut self,
        renderer: &mut TextRenderer<'_>,
        links: &ThumbnailLinks,
    ) -> Result<()> {
        let body = renderer.render(&self.raw.text, false).await?;

        let mut attachments = Vec::with_capacity(self.raw.attachments.len());
        for attachment in &self.raw.attachments {
            let text = match (&attachment.text, &attachment.fallback) {
                (Some(text), _) if !text.is_empty() => text.as_str(),
                (_, Some(fallback)) => fallback.as_str(),
                _ => "",
            };

            let mut fields = Vec::with_capacity(attachment.fields.len());
            for field in &attachment.fields {
                fields.push((field.title.clone(), renderer.render(&field.value, false).await?));
            }

            attachments.push(RenderedAttachment {
                raw: attachment.clone(),
                pretext: renderer
                    .render(attachment.pretext.as_deref().unwrap_or_default(), false)
                    .await?,
                text: renderer.render(text, true).await?,
                fields,
            });
        }

        let mut thumbnails = Vec::new();
        for file in &self.raw.files {
            if file.thumbnail_url().is_none() {
                continue;
            }
            thumbnails.push(Thumbnail {
                src: links.url(&file.id)?,
                href: file.permalink.clone(),
                name: if file.title.is_empty() {
                    file.name.clone()
                } else {
                    file.title.clone()
                },
                width: file.thumb_360_w.unwrap_or(360),
                height: file.thumb_360_h.unwrap_or(360),
            });
        }

        let mut reactions = Vec::with_capacity(self.raw.reactions.len());
        for reaction in &self.raw.reactions {
            // `thumbsup::skin-tone-2` shows as the plain emoji
            let name = reaction.name.split("::").next().unwrap_or_default();
            reactions.push(RenderedReaction {
                emoji: renderer.render(&format!(":{name}:"), false).await?,
                count: reaction.count,
            });
        }

        self.rendered = Some(Rendered {
            body,
            attachments,
            thumbnails,
            reactions,
        });
        Ok(())
    }
}

fn to_local(ts: &Ts, tz: Tz) -> DateTime<Tz> {
    let utc = ts
        .parts()
        .and_then(|(secs, nanos)| Utc.timestamp_opt(secs, nanos).single())
        .unwrap_or_else(|| {
            warn!("could not parse message timestamp {ts:?}");
            DateTime::<Utc>::UNIX_EPOCH
        });

    utc.with_timezone(&tz)
}

#[derive(Clone, Debug)]
pub struct MessageGroup {
    author: Identity,
    messages: Vec<Message>,
}

impl MessageGroup {
    pub const MAX_GAP: TimeDelta = TimeDelta::minutes(10);

    pub fn new(author: Identity, first: Message) -> Self {
        Self {
            author,
            messages: vec![first],
        }
    }

    pub fn author(&self) -> &Identity {
        &self.author
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn messages_mut(&mut self) -> &mut [Message] {
        &mut self.messages
    }

    /// The gap is measured from the last message, so a group can span more than ten minutes.
    pub fn accepts(&self, message: &Message, author: &Identity) -> bool {
        if author.id() != self.author.id() {
            return false;
        }

        self.messages
            .last()
            .is_some_and(|last| {
                message.timestamp().signed_duration_since(last.timestamp()) <= Self::MAX_GAP
            })
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn display_timestamp(&self) -> String {
        let first = self.messages.first().map(Message::timestamp);
        first
            .map(|ts| safe_formatted_date(&ts.format(DISPLAY_TIMESTAMP_FORMAT).to_string()))
            .unwrap_or_default()
    }
}

/// Breaks the text with zero-width spaces every two characters so mail clients
/// do not turn it into a calendar link. Pairs touching a space are left alone.
pub fn safe_formatted_date(date: &str) -> String {
    let chars = date.chars().collect::<Vec<_>>();
    let mut safe = String::with_capacity(date.len() * 2);

    for (i, pair) in chars.chunks(2).enumerate() {
        safe.extend(pair);
        let is_last = (i + 1) * 2 >= chars.len();
        if pair.len() == 2 && !pair.contains(&' ') && !is_last {
            safe.push(ZERO_WIDTH_SPACE);
        }
    }

    safe
}

#[cfg(test)]
mod test {
    use chrono::Timelike;

    use super::*;
    use crate::slack::fake;

    #[test]
    fn should_classify_subtypes() {
        assert_eq!(StyleClass::of(Some("channel_join")), Some(StyleClass::Automated));
        assert_eq!(StyleClass::of(Some("group_topic")), Some(StyleClass::Automated));
        assert_eq!(StyleClass::of(Some("me_message")), Some(StyleClass::Me));
        assert_eq!(StyleClass::of(Some("bot_message")), None);
        assert_eq!(StyleClass::of(None), None);
    }

    #[test]
    fn should_convert_timestamp_to_account_timezone() {
        // 2024-03-14T17:00:00Z
        let msg = Message::new(
            fake::message(1710435600, "U1", "hi"),
            chrono_tz::America::Los_Angeles,
        );

        assert_eq!(msg.timestamp().hour(), 10);
    }

    #[test]
    fn should_map_unparsable_timestamp_to_epoch() {
        let mut raw = fake::message(0, "U1", "hi");
        raw.ts = Ts::new("yesterday");

        let msg = Message::new(raw, chrono_tz::UTC);

        assert_eq!(msg.timestamp().timestamp(), 0);
    }

    #[test]
    fn should_insert_zero_width_spaces() {
        assert_eq!(safe_formatted_date("3:04pm"), "3:\u{200b}04\u{200b}pm");
        assert_eq!(safe_formatted_date("10:04pm"), "10\u{200b}:0\u{200b}4p\u{200b}m");
        assert_eq!(safe_formatted_date("Mar 14"), "Ma\u{200b}r 14");
    }

    #[test]
    fn should_format_group_display_timestamp() {
        // 2024-03-14T22:04:00Z
        let msg = Message::new(fake::message(1710453840, "U1", "hi"), chrono_tz::UTC);
        let group = MessageGroup::new(Identity::synthetic("ana"), msg);

        assert_eq!(group.display_timestamp(), "10\u{200b}:0\u{200b}4p\u{200b}m");
    }
}
