use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use log::debug;
use serde::Deserialize;

type Result<T> = std::result::Result<T, Error>;
pub type Table = Arc<EmojiTable>;

/// Slack aliases can point at other aliases; a cycle must not hang rendering.
const MAX_ALIAS_HOPS: usize = 8;
const ALIAS_PREFIX: &str = "alias:";

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    _Io(#[from] std::io::Error),
    #[error(transparent)]
    _ParseJson(#[from] serde_json::Error),
}

#[derive(Deserialize)]
struct Entry {
    unified: String,
    #[serde(default)]
    short_names: Vec<String>,
}

#[derive(Debug, Default)]
pub struct EmojiTable(HashMap<String, String>);

impl EmojiTable {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::parse(&json)
    }

    pub fn parse(json: &str) -> Result<Self> {
        let entries: Vec<Entry> = serde_json::from_str(json)?;

        let mut table = HashMap::new();
        for entry in entries {
            let html = char_refs(&entry.unified);
            for name in entry.short_names {
                table.insert(name, html.clone());
            }
        }
        debug!("loaded {} emoji short names", table.len());

        Ok(Self(table))
    }

    pub fn get(&self, short_name: &str) -> Option<&str> {
        self.0.get(short_name).map(String::as_str)
    }

    pub fn resolve<'a>(
        &'a self,
        custom: &'a HashMap<String, String>,
        short_name: &'a str,
    ) -> Option<Emoji<'a>> {
        let mut name = short_name;
        for _ in 0..=MAX_ALIAS_HOPS {
            if let Some(html) = self.get(name) {
                return Some(Emoji::Unicode(html));
            }

            let value = custom.get(name)?;
            match value.strip_prefix(ALIAS_PREFIX) {
                Some(target) => name = target,
                None => return Some(Emoji::Image(value)),
            }
        }

        None
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Emoji<'a> {
    Unicode(&'a str),
    Image(&'a str),
}

/// `1F468-200D-1F4BB` becomes `&#x1F468;&#x200D;&#x1F4BB;`.
fn char_refs(unified: &str) -> String {
    unified
        .split('-')
        .map(|cp| format!("&#x{cp};"))
        .collect()
}
