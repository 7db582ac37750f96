use maud::{Markup, Render, html};

use crate::account::{Account, DigestAddress, model::DEFAULT_TIMEZONE};
use crate::style::StyleTable;
use crate::user::Identity;

use super::{Conversation, Conversations};

/// Conversation title with its kind marker: `#`, lock, avatar or member count.
pub struct NameHtml<'a>(pub &'a Conversation, pub &'a StyleTable);

impl Render for NameHtml<'_> {
    fn render(&self) -> Markup {
        let styles = self.1;
        match self.0 {
            Conversation::Channel(channel) => html! {
                span .hash style=(styles.get("conversation.hash")) { "#" }
                (channel.name)
            },
            Conversation::PrivateChannel(channel) => html! {
                span .lock style=(styles.get("conversation.lock")) { "🔒" }
                (channel.name)
            },
            Conversation::DirectMessage { counterpart, .. } => html! {
                img .user-image
                    src=(counterpart.picture())
                    width="36"
                    height="36"
                    style=(styles.get("conversation.user-image"));
                (counterpart.name())
            },
            Conversation::MultiPartyDirectMessage { members, .. } => html! {
                span .count style=(styles.get("conversation.mpdm-count")) { (members.len()) }
                (self.0.name())
            },
        }
    }
}

pub struct ArchiveLink<'a>(pub &'a Conversation, pub &'a StyleTable);

impl Render for ArchiveLink<'_> {
    fn render(&self) -> Markup {
        html! {
            li {
                a href=(self.0.archive_url()) { (NameHtml(self.0, self.1)) }
            }
        }
    }
}

pub struct Index<'a> {
    pub user: &'a Identity,
    pub team_name: &'a str,
    pub account: &'a Account,
    /// None when neither an override nor a profile email exists.
    pub address: Option<&'a DigestAddress>,
    pub conversations: &'a Conversations,
    pub styles: &'a StyleTable,
}

impl Render for Index<'_> {
    fn render(&self) -> Markup {
        let (account, conversations, styles) = (self.account, self.conversations, self.styles);
        let sent = if account.direct_messages_only {
            conversations.iter().filter(|c| c.kind().is_direct()).count()
        } else {
            conversations.len()
        };
        let sections = [
            ("Channels", &conversations.channels),
            ("Private Channels", &conversations.private_channels),
            ("Direct Messages", &conversations.direct_messages),
            ("Group Messages", &conversations.multi_party_direct_messages),
        ];

        html! {
            h1 { (self.team_name) " Slack Archive" }
            p .user {
                img src=(self.user.picture())
                    width="36"
                    height="36"
                    style=(styles.get("conversation.user-image"));
                "Signed in as " b { (self.user.name()) }
                @if let Some(real_name) = self.user.real_name() {
                    " (" (real_name) ")"
                }
                @if let Some(email) = self.user.email() {
                    br;
                    small { (email) }
                }
            }
            p .summary {
                @match self.address {
                    Some(DigestAddress::To(address)) => {
                        "Yesterday's archives of " (sent) " conversations are emailed to "
                        b { (address) } " every morning."
                    },
                    Some(DigestAddress::Disabled) => { "Daily archives are disabled." },
                    None => { "Your Slack profile has no email address, set one below." },
                }
            }

            @if conversations.is_empty() {
                p .empty { "No conversations to archive yet." }
            }
            @for (title, list) in sections {
                @if !list.is_empty() {
                    h2 { (title) }
                    ul {
                        @for conversation in list {
                            (ArchiveLink(conversation, styles))
                        }
                    }
                }
            }

            form .send-all method="post" action="/archive/send" {
                button type="submit" { "Email all archives now" }
            }

            h2 { "Settings" }
            form .settings method="post" action="/account/settings" {
                label {
                    "Timezone "
                    input type="text"
                        name="timezone_name"
                        value=(account.timezone_name)
                        placeholder=(DEFAULT_TIMEZONE.name());
                }
                label {
                    "Email address "
                    input type="text"
                        name="email_address"
                        value=(account.digest_email_address)
                        placeholder="disabled turns digests off";
                }
                label {
                    input type="checkbox"
                        name="direct_messages_only"
                        value="true"
                        checked[account.direct_messages_only];
                    " Direct messages only"
                }
                button type="submit" { "Save" }
            }
            form .delete method="post" action="/account/delete" {
                button type="submit" { "Delete account" }
            }
        }
    }
}

pub struct SignedOut;

impl Render for SignedOut {
    fn render(&self) -> Markup {
        html! {
            h1 { "Slack Archive" }
            p { "Sign in with Slack to get yesterday's conversations in your inbox every morning." }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::conversation::model::test::{im, mpim, private, public};

    fn styles() -> StyleTable {
        StyleTable::parse(r#"{"conversation": {"hash": {"color": "grey"}}}"#).unwrap()
    }

    #[test]
    fn should_escape_channel_name() {
        let channel = Conversation::Channel(public("C1", "<b>general</b>"));

        let actual = NameHtml(&channel, &styles()).render().into_string();

        assert_eq!(
            actual,
            r#"<span class="hash" style="color:grey;">#</span>&lt;b&gt;general&lt;/b&gt;"#
        );
    }

    #[test]
    fn should_mark_private_channel_with_lock() {
        let channel = Conversation::PrivateChannel(private("G1", "secret"));

        let actual = NameHtml(&channel, &styles()).render().into_string();

        assert_eq!(actual, r#"<span class="lock" style="">🔒</span>secret"#);
    }

    #[test]
    fn should_show_avatar_for_direct_message() {
        let dm = Conversation::DirectMessage {
            channel: im("D1", "U1"),
            counterpart: Identity::new("U1", "ana", "https://avatars/U1.png"),
        };

        let actual = NameHtml(&dm, &styles()).render().into_string();

        assert_eq!(
            actual,
            r#"<img class="user-image" src="https://avatars/U1.png" width="36" height="36" style="">ana"#
        );
    }

    #[test]
    fn should_count_mpdm_members() {
        let mpdm = Conversation::MultiPartyDirectMessage {
            channel: mpim("G2"),
            members: vec![
                Identity::new("U1", "ana", "a.png"),
                Identity::new("U2", "bob", "b.png"),
            ],
        };

        let actual = NameHtml(&mpdm, &styles()).render().into_string();

        assert_eq!(actual, r#"<span class="count" style="">2</span>ana, bob"#);
    }

    #[test]
    fn should_link_to_archive_page() {
        let channel = Conversation::Channel(public("C1", "general"));

        let actual = ArchiveLink(&channel, &styles()).render().into_string();

        assert!(actual.starts_with(r#"<li><a href="/archive/conversation/channel/C1">"#));
    }

    #[test]
    fn should_list_sections_and_settings() {
        let conversations = Conversations {
            channels: vec![Conversation::Channel(public("C1", "general"))],
            ..Default::default()
        };
        let mut account = Account::new("U1", "Acme", "https://acme.slack.com/", "xoxp-1");
        account.direct_messages_only = true;
        let address = DigestAddress::To("ana@example.com".into());

        let actual = Index {
            user: &Identity::new("U1", "ana", "https://avatars/U1.png"),
            team_name: "Acme",
            account: &account,
            address: Some(&address),
            conversations: &conversations,
            styles: &styles(),
        }
        .render()
        .into_string();

        assert!(actual.contains("<h2>Channels</h2>"));
        assert!(!actual.contains("Direct Messages"));
        assert!(actual.contains("of 0 conversations are emailed to <b>ana@example.com</b>"));
        assert!(actual.contains(r#"name="direct_messages_only" value="true" checked>"#));
        assert!(actual.contains(r#"placeholder="America/Los_Angeles""#));
    }
}
