use std::env;
use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info};
use serde::Serialize;

use crate::integration;

type Result<T> = std::result::Result<T, Error>;
pub type Mailer = Arc<dyn MailTransport + Send + Sync>;

const DEFAULT_SENDER_ADDRESS: &str = "archive@slack-archive.local";

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("mail API rejected message to {to}: {status}")]
    Rejected { to: String, status: u16 },

    #[error(transparent)]
    _Env(#[from] env::VarError),
    #[error(transparent)]
    _Reqwest(#[from] reqwest::Error),
}

impl Error {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::_Reqwest(e) if e.is_timeout())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Mail {
    pub sender: String,
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[async_trait]
pub trait MailTransport {
    async fn send(&self, mail: &Mail) -> Result<()>;
}

pub struct HttpMailer {
    http: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

#[async_trait]
impl MailTransport for HttpMailer {
    async fn send(&self, mail: &Mail) -> Result<()> {
        debug!("Sending '{}' to {}", mail.subject, mail.to);

        let mut req = self.http.post(&self.url).json(mail);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let resp = req.send().await?;
        if !resp.status().is_success() {
            return Err(Error::Rejected {
                to: mail.to.clone(),
                status: resp.status().as_u16(),
            });
        }
        Ok(())
    }
}

pub struct LogMailer;

#[async_trait]
impl MailTransport for LogMailer {
    async fn send(&self, mail: &Mail) -> Result<()> {
        info!(
            "Mail from {} to {}: '{}' ({} bytes of HTML)",
            mail.sender,
            mail.to,
            mail.subject,
            mail.html.len()
        );
        Ok(())
    }
}

#[derive(Clone)]
pub struct Config {
    api_url: Option<String>,
    api_key: Option<String>,
    sender_address: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: None,
            api_key: None,
            sender_address: DEFAULT_SENDER_ADDRESS.to_string(),
        }
    }
}

impl Config {
    pub fn env() -> Result<Self> {
        let api_url = env::var("MAIL_API_URL")?;
        Ok(Self {
            api_url: Some(api_url),
            api_key: env::var("MAIL_API_KEY").ok(),
            sender_address: env::var("MAIL_SENDER_ADDRESS")
                .unwrap_or_else(|_| DEFAULT_SENDER_ADDRESS.into()),
        })
    }

    pub fn sender_address(&self) -> &str {
        &self.sender_address
    }

    pub fn mailer(&self) -> Mailer {
        match &self.api_url {
            Some(url) => Arc::new(HttpMailer {
                http: integration::init_http_client(std::time::Duration::from_secs(30)),
                url: url.clone(),
                api_key: self.api_key.clone(),
            }),
            None => {
                info!("MAIL_API_URL is not set, mail will only be logged");
                Arc::new(LogMailer)
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod test {
    use std::sync::Mutex;

    use httpmock::prelude::*;
    use serde_json::json;

    use super::*;

    #[derive(Default)]
    pub(crate) struct RecordingMailer {
        sent: Mutex<Vec<Mail>>,
    }

    impl RecordingMailer {
        pub fn sent(&self) -> Vec<Mail> {
            self.sent.lock().map(|s| s.clone()).unwrap_or_default()
        }
    }

    #[async_trait]
    impl MailTransport for RecordingMailer {
        async fn send(&self, mail: &Mail) -> Result<()> {
            if let Ok(mut sent) = self.sent.lock() {
                sent.push(mail.clone());
            }
            Ok(())
        }
    }

    fn mail() -> Mail {
        Mail {
            sender: "Acme Slack Archive <archive@example.com>".into(),
            to: "ana@example.com".into(),
            subject: "#general Archive".into(),
            html: "<p>hi</p>".into(),
        }
    }

    fn http_mailer(server: &MockServer) -> HttpMailer {
        HttpMailer {
            http: reqwest::Client::new(),
            url: server.url("/send"),
            api_key: Some("secret".into()),
        }
    }

    #[tokio::test]
    async fn should_post_mail_as_json() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/send")
                .header("authorization", "Bearer secret")
                .json_body(json!({
                    "sender": "Acme Slack Archive <archive@example.com>",
                    "to": "ana@example.com",
                    "subject": "#general Archive",
                    "html": "<p>hi</p>"
                }));
            then.status(202);
        });

        http_mailer(&server).send(&mail()).await.unwrap();

        mock.assert();
    }

    #[tokio::test]
    async fn should_fail_when_relay_rejects() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/send");
            then.status(500);
        });

        let err = http_mailer(&server).send(&mail()).await.unwrap_err();

        assert!(matches!(err, Error::Rejected { status: 500, .. }));
    }

    #[test]
    fn should_fall_back_to_log_mailer() {
        let config = Config::default();

        assert_eq!(config.sender_address(), DEFAULT_SENDER_ADDRESS);
        assert!(config.api_url.is_none());
    }
}
