//! # TelegramGateway
//!
//! Maps the platform-neutral `ChannelGateway` port onto the Bot API.
//! Media is relayed by file id, never downloaded.

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, InputFile, MessageId};
use teloxide::{ApiError, RequestError};
use url::Url;

use domains::{AppError, Button, ButtonKind, ChannelGateway, Keyboard, PostContent, Result};

pub struct TelegramGateway {
    bot: Bot,
}

impl TelegramGateway {
    pub fn new(bot: Bot) -> Self {
        TelegramGateway { bot }
    }
}

// Bot API message ids fit 32 bits; the domain carries them as i64 to match
// the storage schema.
fn msg_id(id: i64) -> MessageId {
    MessageId(id as i32)
}

fn gateway_err(err: RequestError) -> AppError {
    AppError::Gateway(err.to_string())
}

fn to_markup(keyboard: &Keyboard) -> InlineKeyboardMarkup {
    let rows: Vec<Vec<InlineKeyboardButton>> = keyboard
        .rows
        .iter()
        .map(|row| row.iter().filter_map(to_button).collect())
        .collect();
    InlineKeyboardMarkup::new(rows)
}

fn to_button(button: &Button) -> Option<InlineKeyboardButton> {
    match &button.kind {
        ButtonKind::Callback(value) => Some(InlineKeyboardButton::callback(
            button.label.clone(),
            value.symbol(),
        )),
        ButtonKind::Link(link) => match Url::parse(link) {
            Ok(url) => Some(InlineKeyboardButton::url(button.label.clone(), url)),
            Err(err) => {
                tracing::warn!(%err, link, "dropping keyboard button with invalid url");
                None
            }
        },
    }
}

#[async_trait]
impl ChannelGateway for TelegramGateway {
    async fn publish_post<'a>(
        &self,
        chat_id: i64,
        content: &PostContent,
        keyboard: Option<&'a Keyboard>,
    ) -> Result<i64> {
        let message = match content {
            PostContent::Text(text) => {
                let mut request = self.bot.send_message(ChatId(chat_id), text.clone());
                if let Some(keyboard) = keyboard {
                    request = request.reply_markup(to_markup(keyboard));
                }
                request.await.map_err(gateway_err)?
            }
            PostContent::Photo {
                file_id, caption, ..
            } => {
                let mut request = self
                    .bot
                    .send_photo(ChatId(chat_id), InputFile::file_id(file_id.clone()));
                if let Some(caption) = caption {
                    request = request.caption(caption.clone());
                }
                if let Some(keyboard) = keyboard {
                    request = request.reply_markup(to_markup(keyboard));
                }
                request.await.map_err(gateway_err)?
            }
        };
        Ok(i64::from(message.id.0))
    }

    async fn update_keyboard(
        &self,
        chat_id: i64,
        message_id: i64,
        keyboard: &Keyboard,
    ) -> Result<()> {
        let request = self
            .bot
            .edit_message_reply_markup(ChatId(chat_id), msg_id(message_id))
            .reply_markup(to_markup(keyboard));
        match request.await {
            Ok(_) => Ok(()),
            // Re-pushing an identical keyboard is a success, not a failure.
            Err(RequestError::Api(ApiError::MessageNotModified)) => Ok(()),
            Err(err) => Err(gateway_err(err)),
        }
    }

    async fn copy_post(&self, from_chat: i64, message_id: i64, to_chat: i64) -> Result<i64> {
        let copy = self
            .bot
            .copy_message(ChatId(to_chat), ChatId(from_chat), msg_id(message_id))
            .await
            .map_err(gateway_err)?;
        Ok(i64::from(copy.0))
    }

    async fn delete_post(&self, chat_id: i64, message_id: i64) -> Result<()> {
        self.bot
            .delete_message(ChatId(chat_id), msg_id(message_id))
            .await
            .map_err(gateway_err)?;
        Ok(())
    }

    async fn answer_interaction<'a>(
        &self,
        interaction_id: &str,
        text: Option<&'a str>,
    ) -> Result<()> {
        let mut request = self.bot.answer_callback_query(interaction_id.to_string());
        if let Some(text) = text {
            request = request.text(text.to_string());
        }
        request.await.map_err(gateway_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::ButtonValue;

    #[test]
    fn markup_preserves_rows_and_callback_data() {
        let keyboard = services::keyboard::render(2, 1, Some(77), "@comments");
        let markup = to_markup(&keyboard);

        assert_eq!(markup.inline_keyboard.len(), 2);
        assert_eq!(markup.inline_keyboard[0].len(), 3);
        assert_eq!(markup.inline_keyboard[0][1].text, "+2");

        use teloxide::types::InlineKeyboardButtonKind;
        match &markup.inline_keyboard[0][0].kind {
            InlineKeyboardButtonKind::CallbackData(data) => {
                assert_eq!(data, ButtonValue::Up.symbol());
            }
            other => panic!("expected callback button, got {other:?}"),
        }
        match &markup.inline_keyboard[1][0].kind {
            InlineKeyboardButtonKind::Url(url) => {
                assert_eq!(url.as_str(), "https://t.me/comments/77/77");
            }
            other => panic!("expected url button, got {other:?}"),
        }
    }

    #[test]
    fn invalid_link_buttons_are_dropped() {
        let keyboard = Keyboard {
            rows: vec![vec![Button {
                label: "broken".to_string(),
                kind: ButtonKind::Link("not a url".to_string()),
            }]],
        };
        let markup = to_markup(&keyboard);
        assert!(markup.inline_keyboard[0].is_empty());
    }
}
