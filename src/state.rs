use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use log::info;

use crate::account::repository::RedisAccountRepository;
use crate::digest::service::DigestServiceImpl;
use crate::emoji::EmojiTable;
use crate::integration::{self, cache};
use crate::style::StyleTable;
use crate::{account, archive, auth, digest, file, mail, slack, style};

const STYLES_PATH: &str = "config/styles.json";
const EMOJI_PATH: &str = "config/emoji.json";

#[derive(Clone, FromRef)]
pub struct AppState {
    pub cookie_key: Key,
    pub accounts: account::Repository,
    pub slack: slack::Connector,
    pub codec: file::Codec,
    pub styles: style::Styles,
    pub assembler: archive::Assembler,
    pub digest_service: digest::Service,
    pub queue: digest::Queue,
}

impl AppState {
    pub async fn init(config: &integration::Config) -> crate::Result<Self> {
        let styles = Arc::new(StyleTable::load(STYLES_PATH)?);
        let emoji = Arc::new(EmojiTable::load(EMOJI_PATH)?);
        info!("Loaded styles and emoji tables");

        let redis = cache::init(&config.redis).await?;
        let accounts: account::Repository = Arc::new(RedisAccountRepository::new(redis));

        let slack = config.slack.connector();
        let codec = file::Config::env().unwrap_or_default().codec();
        let assembler = archive::Assembler::new(emoji, styles.clone(), codec.clone(), &config.base_url);

        let mail_config = mail::Config::env().unwrap_or_default();
        let digest_service: digest::Service = Arc::new(DigestServiceImpl::new(
            accounts.clone(),
            slack.clone(),
            assembler.clone(),
            mail_config.mailer(),
            mail_config.sender_address(),
            config.operator_email.clone(),
            config.env,
        ));
        let queue = digest::Queue::start(digest_service.clone());

        Ok(Self {
            cookie_key: auth::Config::env().unwrap_or_default().key(),
            accounts,
            slack,
            codec,
            styles,
            assembler,
            digest_service,
            queue,
        })
    }
}
