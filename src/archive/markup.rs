use maud::{DOCTYPE, Markup, Render, html};

use crate::conversation::markup::NameHtml;
use crate::message::markup::MessageGroupHtml;
use crate::message::model::safe_formatted_date;
use crate::style::StyleTable;

use super::ConversationArchive;

const WINDOW_DATE_FORMAT: &str = "%A, %B %-d, %Y";

pub struct ArchiveHtml<'a>(pub &'a ConversationArchive, pub &'a StyleTable);

impl Render for ArchiveHtml<'_> {
    fn render(&self) -> Markup {
        let (archive, styles) = (self.0, self.1);
        let purpose = archive.conversation.purpose();
        let date = archive.window.start().format(WINDOW_DATE_FORMAT).to_string();

        html! {
            .archive style=(styles.get("archive")) {
                h1 .archive-header style=(styles.get("archive.header")) {
                    (NameHtml(&archive.conversation, styles))
                }
                @if !purpose.is_empty() {
                    .purpose style=(styles.get("archive.purpose")) { (purpose) }
                }
                .window style=(styles.get("archive.window")) {
                    (safe_formatted_date(&date))
                }

                @if archive.is_empty() {
                    .empty style=(styles.get("archive.empty")) { "No messages." }
                } @else {
                    @for group in &archive.groups {
                        (MessageGroupHtml(group, styles))
                    }
                }
            }
        }
    }
}

pub struct ArchivePage<'a>(pub &'a ConversationArchive, pub &'a StyleTable);

impl Render for ArchivePage<'_> {
    fn render(&self) -> Markup {
        let (kind, id) = self.0.conversation.to_ref();

        html! {
            (ArchiveHtml(self.0, self.1))

            form .send method="post" action="/archive/conversation/send" {
                input type="hidden" name="conversation_type" value=(kind);
                input type="hidden" name="conversation_ref" value=(id);
                button type="submit" { "Email this archive now" }
            }
            p {
                a href="/" { "All conversations" }
            }
        }
    }
}

pub struct ArchiveEmail<'a> {
    pub archive: &'a ConversationArchive,
    pub styles: &'a StyleTable,
    pub base_url: &'a str,
}

impl Render for ArchiveEmail<'_> {
    fn render(&self) -> Markup {
        let (archive, styles) = (self.archive, self.styles);
        let web_url = format!(
            "{}{}",
            self.base_url.trim_end_matches('/'),
            archive.conversation.archive_url()
        );

        html! {
            (DOCTYPE)
            html {
                head {
                    meta charset="utf-8";
                    title { (archive.conversation.name()) " Archive" }
                }
                body style=(styles.get("body")) {
                    (ArchiveHtml(archive, styles))

                    .footer style=(styles.get("archive.footer")) {
                        a href=(web_url) style=(styles.get("message.link")) {
                            "View this archive on the web"
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use chrono_tz::Tz;

    use super::*;
    use crate::archive::ArchiveWindow;
    use crate::archive::service::test::now;
    use crate::conversation::Conversation;
    use crate::conversation::model::test::public;
    use crate::message::{Message, MessageGroup};
    use crate::slack::fake;
    use crate::user::Identity;

    fn archive(groups: Vec<MessageGroup>) -> ConversationArchive {
        ConversationArchive {
            conversation: Conversation::Channel(public("C1", "general")),
            window: ArchiveWindow::day_before(now(), chrono_tz::America::Los_Angeles),
            groups,
        }
    }

    fn styles() -> StyleTable {
        StyleTable::parse(r#"{"archive": {"empty": {"font-style": "italic"}}}"#).unwrap()
    }

    #[test]
    fn should_render_empty_archive_notice() {
        let actual = ArchiveHtml(&archive(vec![]), &styles()).render().into_string();

        assert!(actual.contains(r#"<div class="empty" style="font-style:italic;">No messages.</div>"#));
        assert!(actual.contains("all about general"));
    }

    #[test]
    fn should_break_window_date_for_mail_clients() {
        let actual = ArchiveHtml(&archive(vec![]), &styles()).render().into_string();

        assert!(actual.contains("Th\u{200b}ur\u{200b}sd\u{200b}ay\u{200b},"));
        assert!(!actual.contains("Thursday"));
    }

    #[test]
    fn should_post_conversation_ref_from_page() {
        let actual = ArchivePage(&archive(vec![]), &styles()).render().into_string();

        assert!(actual.contains(r#"<form class="send" method="post" action="/archive/conversation/send">"#));
        assert!(actual.contains(r#"name="conversation_type" value="channel""#));
        assert!(actual.contains(r#"name="conversation_ref" value="C1""#));
    }

    #[test]
    fn should_link_mail_back_to_web_archive() {
        let group = MessageGroup::new(
            Identity::new("U1", "ana", "https://avatars/U1.png"),
            Message::new(fake::message(1710403200, "U1", "hi"), Tz::UTC),
        );

        let actual = ArchiveEmail {
            archive: &archive(vec![group]),
            styles: &styles(),
            base_url: "https://archive.example/",
        }
        .render()
        .into_string();

        assert!(actual.starts_with("<!DOCTYPE html>"));
        assert!(actual.contains("<title>#general Archive</title>"));
        assert!(actual.contains(r#"href="https://archive.example/archive/conversation/channel/C1""#));
        assert!(actual.contains(r#"<div class="message" style="">hi</div>"#));
    }
}
