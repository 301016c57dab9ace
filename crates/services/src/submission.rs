//! # Submission
//!
//! Relays a private submission into the primary channel: daily-cap check,
//! author signature, album continuation, and the Post row that anchors all
//! later vote and comment traffic.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, info};

use domains::{ChannelGateway, NewPostEvent, Post, PostContent, PostStore, Result};

use crate::keyboard;

/// What became of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// Relayed to the primary channel with a fresh keyboard.
    Published { message_id: i64 },
    /// Another item of an already published album; relayed without a
    /// keyboard, no new Post row.
    AlbumContinued,
    /// The author hit the daily cap. A precondition, not an error: the
    /// caller should explain, not log a failure.
    LimitReached { cap: i64 },
}

/// Publishes user submissions into the primary channel.
pub struct SubmissionService {
    posts: Arc<dyn PostStore>,
    gateway: Arc<dyn ChannelGateway>,
    primary_chat: i64,
    daily_cap: i64,
}

impl SubmissionService {
    pub fn new(
        posts: Arc<dyn PostStore>,
        gateway: Arc<dyn ChannelGateway>,
        primary_chat: i64,
        daily_cap: i64,
    ) -> Self {
        SubmissionService {
            posts,
            gateway,
            primary_chat,
            daily_cap,
        }
    }

    pub async fn submit(&self, event: &NewPostEvent) -> Result<SubmissionOutcome> {
        // Later items of a media group ride along with the first: no second
        // keyboard, no second Post row, no charge against the daily cap.
        if let Some(group) = event.content.media_group() {
            if let Some(post) = self.posts.get_by_media_group(group).await? {
                debug!(
                    media_group = group,
                    message_id = post.message_id,
                    "album continuation"
                );
                self.gateway
                    .publish_post(self.primary_chat, &signed_content(event), None)
                    .await?;
                return Ok(SubmissionOutcome::AlbumContinued);
            }
        }

        let since = Utc::now() - Duration::hours(24);
        let recent = self.posts.count_posts_since(event.author_id, since).await?;
        if recent >= self.daily_cap {
            debug!(author_id = event.author_id, recent, "daily post cap reached");
            return Ok(SubmissionOutcome::LimitReached {
                cap: self.daily_cap,
            });
        }

        let content = signed_content(event);
        let markup = keyboard::render(0, 0, None, "");
        let message_id = self
            .gateway
            .publish_post(self.primary_chat, &content, Some(&markup))
            .await?;

        self.posts
            .create(Post {
                message_id,
                user_id: event.author_id,
                date: Utc::now(),
                comment_thread_id: None,
                comment_count: 0,
                popular_id: None,
                best_id: None,
                media_group: event.content.media_group().map(str::to_string),
            })
            .await?;
        info!(message_id, author_id = event.author_id, "submission published");
        Ok(SubmissionOutcome::Published { message_id })
    }
}

/// Prefixes the content with the author's signature: first name when shared,
/// otherwise the @username, otherwise anonymous.
fn signed_content(event: &NewPostEvent) -> PostContent {
    let signature = match (&event.author_name, &event.username) {
        (Some(name), _) => name.clone(),
        (None, Some(username)) => format!("@{username}"),
        (None, None) => "Anonymous".to_string(),
    };
    match &event.content {
        PostContent::Text(text) => PostContent::Text(format!("{signature}:\n{text}")),
        PostContent::Photo {
            file_id,
            caption,
            media_group,
        } => PostContent::Photo {
            file_id: file_id.clone(),
            // An uncaptioned photo stays uncaptioned.
            caption: caption.as_ref().map(|c| format!("{signature}: {c}")),
            media_group: media_group.clone(),
        },
    }
}
