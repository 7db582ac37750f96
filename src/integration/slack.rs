use std::env;
use std::sync::Arc;
use std::time::Duration;

use crate::integration::{self, Result};
use crate::slack::{Connector, HttpConnector};

const DEFAULT_API_BASE: &str = "https://slack.com/api";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct Config {
    api_base: String,
    timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl Config {
    pub fn env() -> Result<Self> {
        let api_base = env::var("SLACK_API_URL").unwrap_or_else(|_| DEFAULT_API_BASE.into());
        let timeout = match env::var("SLACK_TIMEOUT_SECS") {
            Ok(secs) => Duration::from_secs(secs.parse()?),
            Err(_) => DEFAULT_TIMEOUT,
        };
        Ok(Self { api_base, timeout })
    }

    pub fn connector(&self) -> Connector {
        Arc::new(HttpConnector::new(
            integration::init_http_client(self.timeout),
            self.api_base.as_str(),
        ))
    }
}
