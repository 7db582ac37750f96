use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use log::warn;
use serde_json::{Map, Value};

type Result<T> = std::result::Result<T, Error>;
pub type Styles = Arc<StyleTable>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("styles must be a JSON object")]
    NotAnObject,

    #[error(transparent)]
    _Io(#[from] std::io::Error),
    #[error(transparent)]
    _ParseJson(#[from] serde_json::Error),
}

/// Inline CSS keyed by dotted path, e.g. `message.blockquote`.
#[derive(Debug, Default)]
pub struct StyleTable(HashMap<String, String>);

impl StyleTable {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::parse(&json)
    }

    pub fn parse(json: &str) -> Result<Self> {
        let Value::Object(root) = serde_json::from_str(json)? else {
            return Err(Error::NotAnObject);
        };

        let mut styles = HashMap::new();
        flatten("", &root, &mut styles);
        Ok(Self(styles))
    }

    pub fn get(&self, path: &str) -> &str {
        self.0.get(path).map(String::as_str).unwrap_or_default()
    }

    pub fn compose(&self, paths: &[&str]) -> String {
        paths.iter().map(|p| self.get(p)).collect()
    }
}

fn flatten(prefix: &str, object: &Map<String, Value>, styles: &mut HashMap<String, String>) {
    for (key, value) in object {
        let Value::Object(nested) = value else {
            if prefix.is_empty() {
                warn!("ignoring top level style property {key}");
            }
            continue;
        };

        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };

        let declarations = nested
            .iter()
            .filter_map(|(property, v)| v.as_str().map(|v| format!("{property}:{v};")))
            .collect::<String>();
        styles.insert(path.clone(), declarations);

        flatten(&path, nested, styles);
    }
}
