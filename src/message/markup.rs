use maud::{Markup, Render, html};

use crate::style::StyleTable;

use super::model::{RenderedAttachment, RenderedReaction, Thumbnail};
use super::{Message, MessageGroup};

pub struct MessageGroupHtml<'a>(pub &'a MessageGroup, pub &'a StyleTable);

impl Render for MessageGroupHtml<'_> {
    fn render(&self) -> Markup {
        let (group, styles) = (self.0, self.1);
        let author = group.author();

        html! {
            .message-group style=(styles.get("message-group")) {
                img .author-image
                    src=(author.picture())
                    width="36"
                    height="36"
                    style=(styles.get("message-group.author-image"));
                span .author-name
                    title=[author.real_name()]
                    style=(styles.get("message-group.author-name")) {
                    (author.name())
                }
                span .timestamp style=(styles.get("message-group.timestamp")) {
                    (group.display_timestamp())
                }

                @for message in group.messages() {
                    (MessageHtml(message, styles))
                }
            }
        }
    }
}

pub struct MessageHtml<'a>(pub &'a Message, pub &'a StyleTable);

impl Render for MessageHtml<'_> {
    fn render(&self) -> Markup {
        let (message, styles) = (self.0, self.1);
        let style = match message.style_class() {
            Some(class) => styles.compose(&["message", class.path()]),
            None => styles.get("message").to_string(),
        };

        html! {
            .message style=(style) {
                @if let Some(rendered) = message.rendered() {
                    (rendered.body)

                    @for attachment in &rendered.attachments {
                        (AttachmentHtml(attachment, styles))
                    }
                    @for thumbnail in &rendered.thumbnails {
                        (ThumbnailHtml(thumbnail, styles))
                    }
                    @if !rendered.reactions.is_empty() {
                        .reactions {
                            @for reaction in &rendered.reactions {
                                (ReactionHtml(reaction, styles))
                            }
                        }
                    }
                } @else {
                    (message.raw().text)
                }
            }
        }
    }
}

pub struct AttachmentHtml<'a>(pub &'a RenderedAttachment, pub &'a StyleTable);

impl Render for AttachmentHtml<'_> {
    fn render(&self) -> Markup {
        let (attachment, styles) = (self.0, self.1);
        let raw = &attachment.raw;
        let style = match raw.color.as_deref().and_then(border_color) {
            Some(color) => format!("{}border-left-color:{color};", styles.get("attachment")),
            None => styles.get("attachment").to_string(),
        };
        let link_style = styles.get("message.link");

        html! {
            @if !attachment.pretext.0.is_empty() {
                .attachment-pretext style=(styles.get("attachment.pretext")) {
                    (attachment.pretext)
                }
            }
            .attachment style=(style) {
                @if let Some(author) = &raw.author_name {
                    .attachment-author style=(styles.get("attachment.author")) {
                        @match &raw.author_link {
                            Some(link) => { a href=(link) style=(link_style) { (author) } },
                            None => { (author) },
                        }
                    }
                }
                @if let Some(title) = &raw.title {
                    .attachment-title style=(styles.get("attachment.title")) {
                        @match &raw.title_link {
                            Some(link) => { a href=(link) style=(link_style) { (title) } },
                            None => { (title) },
                        }
                    }
                }

                .attachment-text { (attachment.text) }

                @for (title, value) in &attachment.fields {
                    .attachment-field {
                        .attachment-field-title style=(styles.get("attachment.field-title")) {
                            (title)
                        }
                        div { (value) }
                    }
                }
                @if let Some(footer) = &raw.footer {
                    .attachment-footer style=(styles.get("attachment.footer")) { (footer) }
                }
            }
        }
    }
}

/// Attachment colors come as hex without `#` or as Slack's named levels.
fn border_color(color: &str) -> Option<String> {
    match color {
        "good" => Some("#2eb886".into()),
        "warning" => Some("#daa038".into()),
        "danger" => Some("#a30200".into()),
        _ => {
            let hex = color.trim_start_matches('#');
            let valid = matches!(hex.len(), 3 | 6) && hex.bytes().all(|b| b.is_ascii_hexdigit());
            valid.then(|| format!("#{hex}"))
        }
    }
}

pub struct ThumbnailHtml<'a>(pub &'a Thumbnail, pub &'a StyleTable);

impl Render for ThumbnailHtml<'_> {
    fn render(&self) -> Markup {
        let (thumbnail, styles) = (self.0, self.1);

        html! {
            .file {
                a href=(thumbnail.href) {
                    img .file-thumbnail
                        src=(thumbnail.src)
                        width=(thumbnail.width)
                        height=(thumbnail.height)
                        alt=(thumbnail.name)
                        style=(styles.get("file.thumbnail"));
                }
                a .file-name href=(thumbnail.href) style=(styles.get("file.name")) {
                    (thumbnail.name)
                }
            }
        }
    }
}

pub struct ReactionHtml<'a>(pub &'a RenderedReaction, pub &'a StyleTable);

impl Render for ReactionHtml<'_> {
    fn render(&self) -> Markup {
        html! {
            span .reaction style=(self.1.get("reaction")) {
                (self.0.emoji) " " (self.0.count)
            }
        }
    }
}
