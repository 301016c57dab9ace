//! # Core Traits (Ports)
//!
//! Any adapter must implement these traits to be used by the binary.
//! Store handles are constructed explicitly and dependency-injected; their
//! lifecycle is owned by the process entry point.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{Keyboard, Post, PostContent, Rating, Vote};

/// Persistence contract for votes and their aggregates.
///
/// Insert/delete are primitives; the vote state machine in the services
/// crate decides which of the two applies for a given tap.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait VoteStore: Send + Sync {
    async fn get_user_vote(&self, message_id: i64, user_id: i64) -> Result<Option<Vote>>;

    async fn insert_vote(&self, message_id: i64, user_id: i64, vote: Vote) -> Result<()>;

    async fn delete_vote(&self, message_id: i64, user_id: i64) -> Result<()>;

    /// Grouped counts over the stored votes. A post nobody voted on yields
    /// the default (0, 0) rating, never an error.
    async fn get_rating(&self, message_id: i64) -> Result<Rating>;

    /// Sum over all of a user's posts of +1 per up-vote and -1 per down-vote
    /// cast by *other* users. Self-votes on own posts are excluded.
    async fn get_user_aggregate_rating(&self, user_id: i64) -> Result<i64>;
}

/// Persistence contract for per-post metadata.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait PostStore: Send + Sync {
    async fn create(&self, post: Post) -> Result<()>;

    async fn get(&self, message_id: i64) -> Result<Option<Post>>;

    async fn get_by_popular_id(&self, popular_id: i64) -> Result<Option<Post>>;

    async fn get_by_media_group(&self, media_group: &str) -> Result<Option<Post>>;

    /// Bumps the comment counter of the post owning `thread_id` and returns
    /// the updated row. None when no post owns that thread.
    async fn increment_comment_count(&self, thread_id: i64) -> Result<Option<Post>>;

    /// Records the discussion-thread id, first writer wins. Returns the
    /// updated row, or None when the post is unknown or already linked.
    async fn set_comment_thread(&self, message_id: i64, thread_id: i64) -> Result<Option<Post>>;

    /// Conditionally records the promoted-copy id: set only if currently
    /// null. Returns whether the row changed, so callers can detect a lost
    /// race instead of promoting twice.
    async fn mark_popular(&self, message_id: i64, popular_id: i64) -> Result<bool>;

    /// Number of posts the author created since `since`. Rate-limit
    /// precondition for new submissions.
    async fn count_posts_since(&self, user_id: i64, since: DateTime<Utc>) -> Result<i64>;
}

/// Outbound contract towards the chat platform.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ChannelGateway: Send + Sync {
    /// Publishes content to a chat, returning the new message id.
    async fn publish_post<'a>(
        &self,
        chat_id: i64,
        content: &PostContent,
        keyboard: Option<&'a Keyboard>,
    ) -> Result<i64>;

    /// Replaces the keyboard on a live message. Editing to an identical
    /// keyboard is a success, not an error.
    async fn update_keyboard(&self, chat_id: i64, message_id: i64, keyboard: &Keyboard)
        -> Result<()>;

    /// Copies a message into another chat, returning the copy's message id.
    async fn copy_post(&self, from_chat: i64, message_id: i64, to_chat: i64) -> Result<i64>;

    async fn delete_post(&self, chat_id: i64, message_id: i64) -> Result<()>;

    /// Answers a keyboard interaction, optionally with ephemeral text.
    async fn answer_interaction<'a>(
        &self,
        interaction_id: &str,
        text: Option<&'a str>,
    ) -> Result<()>;
}
