//! # relay-bot
//!
//! The entry point that assembles the bot: settings, database pool, store
//! and gateway adapters, core services, and the update dispatcher. Every
//! dependency is constructed here and injected explicitly; nothing holds a
//! lazily-initialized global.

use std::sync::Arc;

use secrecy::ExposeSecret;
use teloxide::Bot;
use tracing_subscriber::EnvFilter;

use api_adapters::{BotContext, TelegramGateway};
use domains::{ChannelGateway, PostStore, VoteStore};
use services::{ChannelIds, PromotionPolicy, SubmissionService, SyncService};
use storage_adapters::{PgPostStore, PgVoteStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = configs::Settings::load()?;

    // 1. Storage: pool, migrations, store adapters.
    let pool = storage_adapters::connect(
        settings.database.url.expose_secret(),
        settings.database.max_connections,
    )
    .await?;
    let votes: Arc<dyn VoteStore> = Arc::new(PgVoteStore::new(pool.clone()));
    let posts: Arc<dyn PostStore> = Arc::new(PgPostStore::new(pool));

    // 2. Chat platform gateway.
    let bot = Bot::new(settings.telegram.bot_token.expose_secret());
    let gateway: Arc<dyn ChannelGateway> = Arc::new(TelegramGateway::new(bot.clone()));

    // 3. Core services.
    let policy = PromotionPolicy {
        min_percent: settings.relay.popular_min_percent,
        min_up_votes: settings.relay.popular_min_up_votes,
    };
    let channels = ChannelIds {
        primary: settings.telegram.primary_chat_id,
        popular: settings.telegram.popular_chat_id,
    };
    let sync = Arc::new(SyncService::new(
        votes.clone(),
        posts.clone(),
        gateway.clone(),
        policy,
        channels,
        settings.telegram.comments_group_tag.clone(),
    ));
    let submission = Arc::new(SubmissionService::new(
        posts,
        gateway,
        settings.telegram.primary_chat_id,
        settings.relay.max_posts_per_day,
    ));
    let ctx = Arc::new(BotContext {
        comments_group_id: settings.telegram.comments_group_id,
        welcome_text: settings.relay.welcome_text.clone(),
    });

    tracing::info!(
        primary = settings.telegram.primary_chat_id,
        popular = settings.telegram.popular_chat_id,
        "relay bot starting"
    );
    api_adapters::run_dispatcher(bot, sync, submission, votes, ctx).await;
    Ok(())
}
