//! # configs
//!
//! Environment-sourced settings for the relay bot. Variables use the
//! `RELAY__` prefix with `__` as the section separator, e.g.
//! `RELAY__TELEGRAM__BOT_TOKEN` or `RELAY__RELAY__MAX_POSTS_PER_DAY`;
//! a local `.env` file is honored when present.

use config::{Config, Environment};
use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub telegram: TelegramSettings,
    pub database: DatabaseSettings,
    pub relay: RelaySettings,
}

#[derive(Debug, Deserialize)]
pub struct TelegramSettings {
    pub bot_token: SecretString,
    /// Channel every submission is relayed to.
    pub primary_chat_id: i64,
    /// Channel popular posts are promoted to.
    pub popular_chat_id: i64,
    /// Discussion group linked to the primary channel.
    pub comments_group_id: i64,
    /// Public tag of the discussion group, used for comment deep links.
    pub comments_group_tag: String,
}

#[derive(Debug, Deserialize)]
pub struct DatabaseSettings {
    pub url: SecretString,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize)]
pub struct RelaySettings {
    pub max_posts_per_day: i64,
    pub popular_min_percent: u8,
    pub popular_min_up_votes: i64,
    pub welcome_text: String,
}

const DEFAULT_WELCOME_TEXT: &str = "Hi! Send me a text message or a photo and I will publish it \
to the channel. Once your post resonates with other readers it will also appear on the popular \
channel.";

impl Settings {
    pub fn load() -> Result<Settings, SettingsError> {
        dotenvy::dotenv().ok();

        let cfg = Config::builder()
            .set_default("database.max_connections", 5)?
            .set_default("relay.max_posts_per_day", 5)?
            .set_default("relay.popular_min_percent", 80)?
            .set_default("relay.popular_min_up_votes", 20)?
            .set_default("relay.welcome_text", DEFAULT_WELCOME_TEXT)?
            .add_source(
                Environment::with_prefix("RELAY")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = cfg.try_deserialize()?;
        tracing::debug!(
            primary = settings.telegram.primary_chat_id,
            popular = settings.telegram.popular_chat_id,
            "settings loaded"
        );
        Ok(settings)
    }
}
