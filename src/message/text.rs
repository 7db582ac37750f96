use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::LazyLock;

use log::warn;
use maud::{Markup, PreEscaped, html};
use regex::{Captures, Regex};

use crate::emoji::{Emoji, EmojiTable};
use crate::style::StyleTable;
use crate::user::UserLookup;

use super::Result;

const MAX_PREVIEW_CHARS: usize = 700;
const MAX_PREVIEW_LINES: usize = 5;
const ELLIPSIS: &str = "…";
const BLOCKQUOTE_PREFIXES: [&str; 2] = ["&gt;", ">"];
const ZERO_WIDTH_SPACE: &str = "\u{200b}";

static CONTROL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<([^<>\n]*)>").expect("control token pattern"));
static SHORTCODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":([A-Za-z0-9_+\-]+):").expect("shortcode pattern"));

/// Turns Slack message markup into HTML.
///
/// Message text arrives HTML-escaped from Slack and is passed through as is.
/// Names taken from user and channel records are escaped here.
pub struct TextRenderer<'a> {
    lookup: &'a mut UserLookup,
    emoji: &'a EmojiTable,
    styles: &'a StyleTable,
    team_url: String,
    custom_emoji: Option<HashMap<String, String>>,
    channel_names: HashMap<String, Option<String>>,
}

impl<'a> TextRenderer<'a> {
    pub fn new(
        lookup: &'a mut UserLookup,
        emoji: &'a EmojiTable,
        styles: &'a StyleTable,
        team_url: &str,
    ) -> Self {
        let team_url = if team_url.ends_with('/') {
            team_url.to_string()
        } else {
            format!("{team_url}/")
        };

        Self {
            lookup,
            emoji,
            styles,
            team_url,
            custom_emoji: None,
            channel_names: HashMap::new(),
        }
    }

    pub async fn render(&mut self, text: &str, truncate: bool) -> Result<Markup> {
        let text = if truncate {
            clip(text)
        } else {
            Cow::Borrowed(text)
        };

        let mut html = String::with_capacity(text.len());
        let mut previous_quoted = false;

        for (i, line) in text.split('\n').enumerate() {
            let quoted = BLOCKQUOTE_PREFIXES
                .iter()
                .find_map(|prefix| line.strip_prefix(prefix));

            match quoted {
                Some(rest) => {
                    let content = if rest.is_empty() {
                        ZERO_WIDTH_SPACE.to_string()
                    } else {
                        self.line(rest).await?
                    };
                    html.push_str(&format!(
                        r#"<blockquote style="{}">{content}</blockquote>"#,
                        self.styles.get("message.blockquote")
                    ));
                }
                None => {
                    if i > 0 && !previous_quoted {
                        html.push_str("<br>");
                    }
                    html.push_str(&self.line(line).await?);
                }
            }

            previous_quoted = quoted.is_some();
        }

        Ok(PreEscaped(html))
    }

    async fn line(&mut self, line: &str) -> Result<String> {
        let mut html = String::with_capacity(line.len());
        let mut last = 0;

        let controls = CONTROL
            .captures_iter(line)
            .filter_map(|c| Some((c.get(0)?.range(), c.get(1)?.as_str())))
            .collect::<Vec<_>>();

        for (range, inner) in controls {
            html.push_str(&self.emojify(&line[last..range.start]).await?);
            html.push_str(&self.control(inner).await);
            last = range.end;
        }
        html.push_str(&self.emojify(&line[last..]).await?);

        Ok(html)
    }

    async fn control(&mut self, inner: &str) -> String {
        let (target, label) = match inner.rsplit_once('|') {
            Some((target, label)) => (target, Some(label)),
            None => (inner, None),
        };

        if let Some(id) = target
            .strip_prefix('@')
            .filter(|id| id.starts_with('U') || id.starts_with('W'))
        {
            return match self.lookup.user(id).await {
                Ok(user) => {
                    let name = escape(user.name());
                    self.link(&format!("{}team/{name}", self.team_url), &format!("@{name}"))
                }
                Err(e) => {
                    warn!("could not render user mention {id}: {e}");
                    label.unwrap_or(target).to_string()
                }
            };
        }

        if let Some(id) = target.strip_prefix('#').filter(|id| id.starts_with('C')) {
            return match self.channel_name(id).await {
                Some(name) => {
                    let name = escape(&name);
                    self.link(&format!("{}archives/{id}", self.team_url), &format!("#{name}"))
                }
                None => label.unwrap_or(target).to_string(),
            };
        }

        if let Some(command) = target.strip_prefix('!') {
            let shown = label.map(|l| l.trim_start_matches('@')).unwrap_or(command);
            return format!("<b>@{shown}</b>");
        }

        self.link(&target.replace('"', "&quot;"), label.unwrap_or(target))
    }

    fn link(&self, href: &str, label: &str) -> String {
        format!(
            r#"<a href="{href}" style="{}">{label}</a>"#,
            self.styles.get("message.link")
        )
    }

    async fn channel_name(&mut self, id: &str) -> Option<String> {
        if let Some(name) = self.channel_names.get(id) {
            return name.clone();
        }

        let name = match self.lookup.slack().conversation_info(id).await {
            Ok(channel) => Some(channel.name),
            Err(e) => {
                warn!("could not render channel mention {id}: {e}");
                None
            }
        };
        self.channel_names.insert(id.to_string(), name.clone());
        name
    }

    /// Custom emoji are fetched at most once per renderer, and only if a shortcode misses the standard table.
    async fn emojify(&mut self, text: &str) -> Result<String> {
        let needs_custom = SHORTCODE
            .captures_iter(text)
            .any(|c| self.emoji.get(&c[1]).is_none());
        if needs_custom && self.custom_emoji.is_none() {
            self.custom_emoji = Some(self.lookup.slack().emoji().await?);
        }

        let none = HashMap::new();
        let custom = self.custom_emoji.as_ref().unwrap_or(&none);
        let emoji = self.emoji;

        let html = SHORTCODE.replace_all(text, |c: &Captures| match emoji.resolve(custom, &c[1]) {
            Some(Emoji::Unicode(refs)) => refs.to_string(),
            Some(Emoji::Image(url)) => html! {
                img src=(url) alt="" width="20" height="20" style="vertical-align:text-bottom";
            }
            .into_string(),
            None => c[0].to_string(),
        });

        Ok(html.into_owned())
    }
}

fn escape(text: &str) -> String {
    html! { (text) }.into_string()
}

/// Shortens attachment previews. A control token cut open by the clip is dropped.
fn clip(text: &str) -> Cow<'_, str> {
    let mut clipped = Cow::Borrowed(text);

    if text.chars().count() > MAX_PREVIEW_CHARS {
        let head = text.chars().take(MAX_PREVIEW_CHARS).collect::<String>();
        clipped = Cow::Owned(format!("{}{ELLIPSIS}", without_open_control(&head)));
    }

    let lines = clipped.split('\n').collect::<Vec<_>>();
    if lines.len() > MAX_PREVIEW_LINES {
        let head = lines[..MAX_PREVIEW_LINES].join("\n");
        return Cow::Owned(format!("{}\n{ELLIPSIS}", without_open_control(&head)));
    }

    clipped
}

fn without_open_control(text: &str) -> &str {
    match (text.rfind('<'), text.rfind('>')) {
        (Some(open), Some(close)) if close > open => text,
        (Some(open), _) => &text[..open],
        _ => text,
    }
}
