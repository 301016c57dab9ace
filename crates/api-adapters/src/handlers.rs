//! # Update Handlers
//!
//! The dptree dispatch tree: callback taps become vote events, private
//! messages become submissions, and traffic in the linked discussion group
//! becomes thread links and comment events.

use std::sync::Arc;

use teloxide::dispatching::UpdateHandler;
use teloxide::error_handlers::LoggingErrorHandler;
use teloxide::prelude::*;
use teloxide::types::MessageKind;
use teloxide::utils::command::BotCommands;

use domains::{ButtonValue, CommentEvent, NewPostEvent, PostContent, VoteEvent, VoteStore};
use services::{SubmissionOutcome, SubmissionService, SyncService};

/// Bot-facing configuration shared across handlers.
pub struct BotContext {
    /// Discussion group linked to the primary channel.
    pub comments_group_id: i64,
    /// Reply to `/start` in private chats.
    pub welcome_text: String,
}

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Supported commands:")]
pub enum Command {
    #[command(description = "how the bot works.")]
    Start,
    #[command(description = "the overall rating your posts have collected.")]
    Karma,
}

/// The discussion group's automatic forward of a channel post: it opens the
/// comment thread for that post.
#[derive(Debug, Clone, Copy)]
struct ThreadLink {
    origin_message_id: i64,
    thread_id: i64,
}

/// Builds the full dispatch tree.
pub fn schema() -> UpdateHandler<anyhow::Error> {
    let private_messages = Update::filter_message()
        .filter(|msg: Message| msg.chat.is_private())
        .branch(
            teloxide::filter_command::<Command, _>().endpoint(on_command),
        )
        .branch(dptree::filter_map(submission_event).endpoint(on_submission))
        .branch(dptree::endpoint(on_unsupported));

    let group_messages = Update::filter_message()
        .filter(|msg: Message, ctx: Arc<BotContext>| msg.chat.id.0 == ctx.comments_group_id)
        .branch(dptree::filter_map(thread_link).endpoint(on_thread_link))
        .branch(dptree::filter_map(comment_event).endpoint(on_comment));

    dptree::entry()
        .branch(Update::filter_callback_query().endpoint(on_callback))
        .branch(private_messages)
        .branch(group_messages)
}

/// Builds and runs the long-polling dispatcher until shutdown.
pub async fn run_dispatcher(
    bot: Bot,
    sync: Arc<SyncService>,
    submission: Arc<SubmissionService>,
    votes: Arc<dyn VoteStore>,
    ctx: Arc<BotContext>,
) {
    Dispatcher::builder(bot, schema())
        .dependencies(dptree::deps![sync, submission, votes, ctx])
        .default_handler(|update| async move {
            tracing::debug!(?update, "unhandled update");
        })
        .error_handler(LoggingErrorHandler::with_custom_text("update handler failed"))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

async fn on_callback(query: CallbackQuery, sync: Arc<SyncService>) -> anyhow::Result<()> {
    let Some(data) = query.data.as_deref() else {
        return Ok(());
    };
    let Some(button) = ButtonValue::from_symbol(data) else {
        tracing::warn!(data, "unknown callback payload, dropping");
        return Ok(());
    };
    // Old keyboards outlive their messages; without the message there is
    // nothing to resolve the post from.
    let Some(message) = query.message.as_ref() else {
        return Ok(());
    };
    let event = VoteEvent {
        message_id: i64::from(message.id.0),
        user_id: query.from.id.0 as i64,
        button,
        interaction_id: query.id.clone(),
    };
    sync.handle_vote(&event).await?;
    Ok(())
}

async fn on_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    ctx: Arc<BotContext>,
    votes: Arc<dyn VoteStore>,
) -> anyhow::Result<()> {
    match cmd {
        Command::Start => {
            bot.send_message(msg.chat.id, ctx.welcome_text.clone()).await?;
        }
        Command::Karma => {
            if let Some(from) = msg.from() {
                let karma = votes.get_user_aggregate_rating(from.id.0 as i64).await?;
                bot.send_message(
                    msg.chat.id,
                    format!("Your posts have collected a total rating of {karma:+}."),
                )
                .await?;
            }
        }
    }
    Ok(())
}

async fn on_submission(
    bot: Bot,
    msg: Message,
    event: NewPostEvent,
    submission: Arc<SubmissionService>,
) -> anyhow::Result<()> {
    match submission.submit(&event).await? {
        SubmissionOutcome::LimitReached { cap } => {
            bot.send_message(
                msg.chat.id,
                format!("You have reached the daily limit of {cap} posts. Try again tomorrow!"),
            )
            .await?;
        }
        SubmissionOutcome::Published { .. } | SubmissionOutcome::AlbumContinued => {}
    }
    Ok(())
}

async fn on_unsupported(msg: Message) -> anyhow::Result<()> {
    tracing::warn!(chat_id = msg.chat.id.0, message_id = msg.id.0, "unsupported content, dropping");
    Ok(())
}

async fn on_thread_link(link: ThreadLink, sync: Arc<SyncService>) -> anyhow::Result<()> {
    sync.link_thread(link.origin_message_id, link.thread_id).await?;
    Ok(())
}

async fn on_comment(event: CommentEvent, sync: Arc<SyncService>) -> anyhow::Result<()> {
    sync.handle_comment(event.thread_id).await?;
    Ok(())
}

/// Maps a private message onto a submission, if it carries relayable content.
fn submission_event(msg: Message) -> Option<NewPostEvent> {
    let from = msg.from()?;
    if from.is_bot {
        return None;
    }
    let content = if let Some(text) = msg.text() {
        // Unknown slash commands are not submissions.
        if text.starts_with('/') {
            return None;
        }
        PostContent::Text(text.to_string())
    } else if let Some(sizes) = msg.photo() {
        // The largest rendition is last.
        let photo = sizes.last()?;
        PostContent::Photo {
            file_id: photo.file.id.clone(),
            caption: msg.caption().map(str::to_string),
            media_group: msg.media_group_id().map(str::to_string),
        }
    } else {
        return None;
    };
    Some(NewPostEvent {
        author_id: from.id.0 as i64,
        author_name: Some(from.first_name.clone()).filter(|name| !name.is_empty()),
        username: from.username.clone(),
        content,
    })
}

fn thread_link(msg: Message) -> Option<ThreadLink> {
    let MessageKind::Common(common) = &msg.kind else {
        return None;
    };
    if !common.is_automatic_forward {
        return None;
    }
    let origin = common.forward.as_ref()?.message_id?;
    Some(ThreadLink {
        origin_message_id: i64::from(origin),
        thread_id: i64::from(msg.id.0),
    })
}

fn comment_event(msg: Message) -> Option<CommentEvent> {
    let MessageKind::Common(common) = &msg.kind else {
        return None;
    };
    // The thread root itself is handled by `thread_link`.
    if common.is_automatic_forward {
        return None;
    }
    let thread_id = msg
        .thread_id
        .map(i64::from)
        .or_else(|| msg.reply_to_message().map(|reply| i64::from(reply.id.0)))?;
    Some(CommentEvent { thread_id })
}
