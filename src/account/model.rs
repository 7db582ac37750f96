use std::fmt;

use chrono_tz::Tz;
use email_address::EmailAddress;
use serde::{Deserialize, Serialize};

use crate::slack;

use super::{Error, Result};

pub const DEFAULT_TIMEZONE: Tz = chrono_tz::America::Los_Angeles;
/// Digest address override that turns digests off.
pub const DIGESTS_DISABLED: &str = "disabled";

#[derive(Clone, PartialEq, Deserialize, Serialize)]
pub struct Account {
    pub slack_user_id: String,
    pub slack_team_name: String,
    pub slack_team_url: String,
    pub api_token: String,
    #[serde(default)]
    pub timezone_name: String,
    #[serde(default)]
    pub digest_email_address: String,
    #[serde(default)]
    pub direct_messages_only: bool,
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("slack_user_id", &self.slack_user_id)
            .field("slack_team_name", &self.slack_team_name)
            .field("timezone_name", &self.timezone_name)
            .field("direct_messages_only", &self.direct_messages_only)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum DigestAddress {
    Disabled,
    To(String),
}

impl Account {
    pub fn new(
        slack_user_id: impl Into<String>,
        slack_team_name: impl Into<String>,
        slack_team_url: impl Into<String>,
        api_token: impl Into<String>,
    ) -> Self {
        Self {
            slack_user_id: slack_user_id.into(),
            slack_team_name: slack_team_name.into(),
            slack_team_url: slack_team_url.into(),
            api_token: api_token.into(),
            timezone_name: String::new(),
            digest_email_address: String::new(),
            direct_messages_only: false,
        }
    }

    pub fn timezone(&self) -> Result<Tz> {
        parse_timezone(&self.timezone_name)
    }

    /// The override wins, then the email of the Slack profile.
    pub async fn digest_address(&self, slack: &slack::Client) -> Result<DigestAddress> {
        match self.digest_email_address.trim() {
            DIGESTS_DISABLED => return Ok(DigestAddress::Disabled),
            "" => {}
            address => return Ok(DigestAddress::To(address.to_string())),
        }

        slack
            .user_info(&self.slack_user_id)
            .await?
            .profile
            .email
            .filter(|e| !e.is_empty())
            .map(DigestAddress::To)
            .ok_or_else(|| Error::MissingEmailAddress(self.slack_user_id.clone()))
    }

    pub fn apply(&mut self, settings: Settings) -> Result<()> {
        let timezone_name = settings.timezone_name.trim();
        parse_timezone(timezone_name)?;

        let email_address = settings.email_address.trim();
        if !email_address.is_empty()
            && email_address != DIGESTS_DISABLED
            && !EmailAddress::is_valid(email_address)
        {
            return Err(Error::InvalidEmailAddress(email_address.to_string()));
        }

        self.timezone_name = timezone_name.to_string();
        self.digest_email_address = email_address.to_string();
        self.direct_messages_only = settings.direct_messages_only.as_deref() == Some("true");
        Ok(())
    }
}

fn parse_timezone(name: &str) -> Result<Tz> {
    if name.is_empty() {
        return Ok(DEFAULT_TIMEZONE);
    }

    name.parse::<Tz>()
        .map_err(|_| Error::MalformedTimezone(name.to_string()))
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub timezone_name: String,
    #[serde(default)]
    pub email_address: String,
    #[serde(default)]
    pub direct_messages_only: Option<String>,
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use super::*;
    use crate::slack::fake::FakeSlack;

    fn account() -> Account {
        Account::new("U1", "Acme", "https://acme.slack.com/", "xoxp-1")
    }

    fn settings(timezone_name: &str, email_address: &str, dms_only: Option<&str>) -> Settings {
        Settings {
            timezone_name: timezone_name.into(),
            email_address: email_address.into(),
            direct_messages_only: dms_only.map(String::from),
        }
    }

    #[test]
    fn should_default_empty_timezone_to_los_angeles() {
        assert_eq!(account().timezone().unwrap(), chrono_tz::America::Los_Angeles);
    }

    #[test]
    fn should_reject_malformed_timezone() {
        let mut account = account();
        account.timezone_name = "Mars/Olympus_Mons".into();

        assert!(matches!(account.timezone(), Err(Error::MalformedTimezone(tz)) if tz == "Mars/Olympus_Mons"));
    }

    #[tokio::test]
    async fn should_prefer_address_override() {
        let slack: slack::Client = Arc::new(FakeSlack::new().with_user("U1", "ana"));
        let mut account = account();
        account.digest_email_address = "digest@example.com".into();

        let address = account.digest_address(&slack).await.unwrap();

        assert_eq!(address, DigestAddress::To("digest@example.com".into()));
        assert_eq!(account.digest_address(&slack).await.unwrap(), address);
    }

    #[tokio::test]
    async fn should_fall_back_to_profile_email() {
        let slack: slack::Client = Arc::new(FakeSlack::new().with_user("U1", "ana"));

        let address = account().digest_address(&slack).await.unwrap();

        assert_eq!(address, DigestAddress::To("ana@example.com".into()));
    }

    #[tokio::test]
    async fn should_disable_digests_without_calling_slack() {
        let fake = Arc::new(FakeSlack::new());
        let slack: slack::Client = fake.clone();
        let mut account = account();
        account.digest_email_address = "disabled".into();

        assert_eq!(account.digest_address(&slack).await.unwrap(), DigestAddress::Disabled);
        assert_eq!(fake.calls("users.info"), 0);
    }

    #[tokio::test]
    async fn should_fail_without_any_address() {
        let mut user = crate::slack::fake::user("U1", "ana");
        user.profile.email = None;
        let mut fake = FakeSlack::new();
        fake.users.push(user);
        let slack: slack::Client = Arc::new(fake);

        let err = account().digest_address(&slack).await.unwrap_err();

        assert!(matches!(err, Error::MissingEmailAddress(id) if id == "U1"));
    }

    #[test]
    fn should_apply_settings() {
        let mut account = account();

        account
            .apply(settings("Europe/Chisinau", " me@example.com ", Some("true")))
            .unwrap();

        assert_eq!(account.timezone().unwrap(), chrono_tz::Europe::Chisinau);
        assert_eq!(account.digest_email_address, "me@example.com");
        assert!(account.direct_messages_only);
    }

    #[test]
    fn should_accept_disabled_address() {
        let mut account = account();

        account.apply(settings("", "disabled", None)).unwrap();

        assert_eq!(account.digest_email_address, "disabled");
        assert!(!account.direct_messages_only);
    }

    #[test]
    fn should_leave_account_untouched_on_invalid_settings() {
        let mut account = account();

        let tz = account.apply(settings("Nowhere", "me@example.com", Some("true")));
        let email = account.apply(settings("UTC", "not an address", None));

        assert!(matches!(tz, Err(Error::MalformedTimezone(_))));
        assert!(matches!(email, Err(Error::InvalidEmailAddress(_))));
        assert_eq!(account, self::account());
    }

    #[test]
    fn should_not_leak_token_in_debug_output() {
        assert!(!format!("{:?}", account()).contains("xoxp"));
    }
}
