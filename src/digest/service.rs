use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use maud::{Render, html};

use crate::account::{self, Account, DigestAddress};
use crate::archive::{Assembler, markup::ArchiveEmail};
use crate::conversation::{Conversation, Conversations, Kind};
use crate::integration::Env;
use crate::mail::{self, Mail};
use crate::slack;
use crate::user::UserLookup;

use super::{Error, Job, Result, is_past_midnight};

#[async_trait]
pub trait DigestService {
    /// Mails one archive; false when it was empty or digests are disabled.
    async fn send_conversation_archive(&self, account: &Account, kind: Kind, id: &str)
    -> Result<bool>;

    async fn send_archive(&self, account: &Account) -> Result<usize>;

    async fn due_accounts(&self, now: DateTime<Utc>) -> Result<Vec<Account>>;

    async fn run(&self, job: &Job) -> Result<Vec<Job>>;

    async fn alert(&self, job: &Job, error: &Error);
}

#[derive(Clone)]
pub struct DigestServiceImpl {
    accounts: account::Repository,
    connector: slack::Connector,
    assembler: Assembler,
    mailer: mail::Mailer,
    sender_address: String,
    operator_email: Option<String>,
    env: Env,
    now: fn() -> DateTime<Utc>,
}

impl DigestServiceImpl {
    pub fn new(
        accounts: account::Repository,
        connector: slack::Connector,
        assembler: Assembler,
        mailer: mail::Mailer,
        sender_address: impl Into<String>,
        operator_email: Option<String>,
        env: Env,
    ) -> Self {
        Self {
            accounts,
            connector,
            assembler,
            mailer,
            sender_address: sender_address.into(),
            operator_email,
            env,
            now: Utc::now,
        }
    }

    #[cfg(test)]
    pub fn with_clock(mut self, now: fn() -> DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    async fn deliver(
        &self,
        account: &Account,
        lookup: &mut UserLookup,
        to: &str,
        conversation: Conversation,
    ) -> Result<bool> {
        let archive = self
            .assembler
            .build(account, lookup, conversation, (self.now)())
            .await?;
        if archive.is_empty() {
            debug!(
                "Archive of {} for {} is empty, not sending",
                archive.conversation.id(),
                account.slack_user_id
            );
            return Ok(false);
        }

        let team = lookup.slack().team_info().await?;
        let mail = Mail {
            sender: format!("{} Slack Archive <{}>", team.name, self.sender_address),
            to: to.to_string(),
            subject: format!("{} Archive", archive.conversation.name()),
            html: ArchiveEmail {
                archive: &archive,
                styles: self.assembler.styles(),
                base_url: self.assembler.base_url(),
            }
            .render()
            .into_string(),
        };
        self.mailer.send(&mail).await?;

        info!("Emailed '{}' for {}", mail.subject, account.slack_user_id);
        Ok(true)
    }
}

#[async_trait]
impl DigestService for DigestServiceImpl {
    async fn send_conversation_archive(
        &self,
        account: &Account,
        kind: Kind,
        id: &str,
    ) -> Result<bool> {
        let slack = self.connector.connect(&account.api_token);
        let DigestAddress::To(to) = account.digest_address(&slack).await? else {
            debug!("Digests disabled for {}", account.slack_user_id);
            return Ok(false);
        };

        let mut lookup = UserLookup::new(slack).await?;
        let conversation =
            Conversation::from_ref(kind, id, &mut lookup, &account.slack_user_id).await?;

        self.deliver(account, &mut lookup, &to, conversation).await
    }

    async fn send_archive(&self, account: &Account) -> Result<usize> {
        let slack = self.connector.connect(&account.api_token);
        let DigestAddress::To(to) = account.digest_address(&slack).await? else {
            debug!("Digests disabled for {}", account.slack_user_id);
            return Ok(0);
        };

        let mut lookup = UserLookup::new(slack).await?;
        let conversations = Conversations::load(&mut lookup, &account.slack_user_id).await?;

        let mut sent = 0;
        for conversation in conversations {
            if self.deliver(account, &mut lookup, &to, conversation).await? {
                sent += 1;
            }
        }
        Ok(sent)
    }

    async fn due_accounts(&self, now: DateTime<Utc>) -> Result<Vec<Account>> {
        let due = self
            .accounts
            .find_all()
            .await?
            .into_iter()
            .filter(|account| match account.timezone() {
                Ok(tz) => is_past_midnight(now, tz),
                Err(e) => {
                    warn!("Skipping {}: {e}", account.slack_user_id);
                    false
                }
            })
            .collect::<Vec<_>>();

        debug!("{} accounts due at {now}", due.len());
        Ok(due)
    }

    async fn run(&self, job: &Job) -> Result<Vec<Job>> {
        match job {
            Job::SendAccount { slack_user_id } => {
                let account = self.accounts.find(slack_user_id).await?;
                let slack = self.connector.connect(&account.api_token);
                if account.digest_address(&slack).await? == DigestAddress::Disabled {
                    info!("Digests disabled for {slack_user_id}, nothing to enqueue");
                    return Ok(vec![]);
                }

                let mut lookup = UserLookup::new(slack).await?;
                let jobs = Conversations::load(&mut lookup, slack_user_id)
                    .await?
                    .into_iter()
                    .filter(|c| !account.direct_messages_only || c.kind().is_direct())
                    .map(|c| {
                        let (kind, id) = c.to_ref();
                        Job::SendConversation {
                            slack_user_id: slack_user_id.clone(),
                            kind,
                            id,
                        }
                    })
                    .collect::<Vec<_>>();

                info!("Fanning out {} conversations of {slack_user_id}", jobs.len());
                Ok(jobs)
            }
            Job::SendConversation {
                slack_user_id,
                kind,
                id,
            } => {
                let account = self.accounts.find(slack_user_id).await?;
                let sent = self.send_conversation_archive(&account, *kind, id).await?;
                debug!("{job} done, sent: {sent}");
                Ok(vec![])
            }
        }
    }

    async fn alert(&self, job: &Job, error: &Error) {
        if self.env.is_development() || error.is_transient() {
            debug!("Not alerting about {job}: {error}");
            return;
        }
        let Some(operator) = &self.operator_email else {
            return;
        };

        let mail = Mail {
            sender: format!("Slack Archive Admin <{}>", self.sender_address),
            to: operator.clone(),
            subject: format!("Slack Archive Send Error for {}", job.slack_user_id()),
            html: html! {
                p { "Job: " (job) }
                pre { (error) }
            }
            .into_string(),
        };
        if let Err(e) = self.mailer.send(&mail).await {
            error!("Could not alert operator about {job}: {e}");
        }
    }
}
