//! # api-adapters
//!
//! The Telegram surface of the relay bot, behind the `bot-telegram`
//! feature: the update dispatch tree, update-to-event mapping, and the
//! `ChannelGateway` implementation over the Bot API.

#[cfg(feature = "bot-telegram")]
mod gateway;
#[cfg(feature = "bot-telegram")]
mod handlers;

#[cfg(feature = "bot-telegram")]
pub use gateway::TelegramGateway;
#[cfg(feature = "bot-telegram")]
pub use handlers::{run_dispatcher, schema, BotContext, Command};
