//! # Sync Orchestrator
//!
//! Drives a single vote or comment event end to end: mutate the vote rows,
//! recompute the tally, push the re-rendered keyboard to every live copy of
//! the post, and promote to the popular channel on the first threshold
//! crossing. Each event runs to completion or fails outright; there is no
//! retry layer here.

use std::sync::Arc;

use tracing::{debug, info, warn};

use domains::{ChannelGateway, Post, PostStore, Rating, Result, VoteEvent, VoteStore};

use crate::keyboard;
use crate::promotion::PromotionPolicy;
use crate::vote::{transition, VoteAction};

/// Chat ids of the two channels carrying live keyboards.
#[derive(Debug, Clone, Copy)]
pub struct ChannelIds {
    pub primary: i64,
    pub popular: i64,
}

/// Keeps the origin copy, the promoted copy, and the stored tally in sync.
pub struct SyncService {
    votes: Arc<dyn VoteStore>,
    posts: Arc<dyn PostStore>,
    gateway: Arc<dyn ChannelGateway>,
    policy: PromotionPolicy,
    channels: ChannelIds,
    comments_tag: String,
}

impl SyncService {
    pub fn new(
        votes: Arc<dyn VoteStore>,
        posts: Arc<dyn PostStore>,
        gateway: Arc<dyn ChannelGateway>,
        policy: PromotionPolicy,
        channels: ChannelIds,
        comments_tag: String,
    ) -> Self {
        SyncService {
            votes,
            posts,
            gateway,
            policy,
            channels,
            comments_tag,
        }
    }

    /// Handles one keyboard tap.
    pub async fn handle_vote(&self, event: &VoteEvent) -> Result<()> {
        // The tap may have landed on either live copy; votes are always
        // keyed by the origin message id.
        let Some(post) = self.resolve(event.message_id).await? else {
            debug!(message_id = event.message_id, "vote on unknown message, dropping");
            self.gateway.answer_interaction(&event.interaction_id, None).await?;
            return Ok(());
        };

        let Some(requested) = event.button.as_vote() else {
            // The "show rating" affordance: tally as an ephemeral answer.
            let rating = self.votes.get_rating(post.message_id).await?;
            return self.answer_tally(&event.interaction_id, rating).await;
        };

        let current = self
            .votes
            .get_user_vote(post.message_id, event.user_id)
            .await?;
        match transition(current, requested) {
            VoteAction::Keep => {
                let rating = self.votes.get_rating(post.message_id).await?;
                return self.answer_tally(&event.interaction_id, rating).await;
            }
            VoteAction::Insert => {
                self.votes
                    .insert_vote(post.message_id, event.user_id, requested)
                    .await?;
            }
            VoteAction::Remove => {
                self.votes
                    .delete_vote(post.message_id, event.user_id)
                    .await?;
            }
        }
        self.gateway
            .answer_interaction(&event.interaction_id, None)
            .await?;

        let rating = self.votes.get_rating(post.message_id).await?;
        self.push_keyboards(&post, rating).await?;

        if post.popular_id.is_none() && self.policy.is_popular(rating) {
            self.promote(&post, rating).await?;
        }
        Ok(())
    }

    /// Handles one new message inside a discussion thread.
    ///
    /// A comment whose thread matches no post is a no-op: the thread may
    /// belong to an older deployment or a foreign pinned message.
    pub async fn handle_comment(&self, thread_id: i64) -> Result<()> {
        let Some(post) = self.posts.increment_comment_count(thread_id).await? else {
            debug!(thread_id, "comment in unknown thread, ignoring");
            return Ok(());
        };
        let rating = self.votes.get_rating(post.message_id).await?;
        self.push_keyboards(&post, rating).await
    }

    /// Records the discussion thread the comments group opened for a post
    /// and re-renders the keyboard so the comments button appears.
    pub async fn link_thread(&self, message_id: i64, thread_id: i64) -> Result<()> {
        let Some(post) = self.posts.set_comment_thread(message_id, thread_id).await? else {
            debug!(message_id, thread_id, "thread link for unknown or already linked post");
            return Ok(());
        };
        info!(message_id, thread_id, "discussion thread linked");
        let rating = self.votes.get_rating(post.message_id).await?;
        self.push_keyboards(&post, rating).await
    }

    async fn resolve(&self, message_id: i64) -> Result<Option<Post>> {
        if let Some(post) = self.posts.get(message_id).await? {
            return Ok(Some(post));
        }
        self.posts.get_by_popular_id(message_id).await
    }

    async fn answer_tally(&self, interaction_id: &str, rating: Rating) -> Result<()> {
        self.gateway
            .answer_interaction(interaction_id, Some(&tally_text(rating)))
            .await
    }

    /// Pushes the freshly rendered keyboard to the origin copy and, if the
    /// post was promoted, to the popular copy.
    async fn push_keyboards(&self, post: &Post, rating: Rating) -> Result<()> {
        let markup = keyboard::render(
            rating.score(),
            post.comment_count,
            post.comment_thread_id,
            &self.comments_tag,
        );
        self.gateway
            .update_keyboard(self.channels.primary, post.message_id, &markup)
            .await?;
        if let Some(popular_id) = post.popular_id {
            self.gateway
                .update_keyboard(self.channels.popular, popular_id, &markup)
                .await?;
        }
        Ok(())
    }

    /// Creates the promoted copy exactly once.
    ///
    /// The copy is created first and the id claimed second with a
    /// conditional update; if another event claimed the post in between,
    /// our copy is the duplicate and gets deleted.
    async fn promote(&self, post: &Post, rating: Rating) -> Result<()> {
        let copy_id = self
            .gateway
            .copy_post(self.channels.primary, post.message_id, self.channels.popular)
            .await?;
        if !self.posts.mark_popular(post.message_id, copy_id).await? {
            warn!(
                message_id = post.message_id,
                copy_id, "lost the promotion claim, removing duplicate copy"
            );
            return self.gateway.delete_post(self.channels.popular, copy_id).await;
        }
        info!(
            message_id = post.message_id,
            copy_id,
            up = rating.up,
            down = rating.down,
            "post promoted to the popular channel"
        );
        let markup = keyboard::render(
            rating.score(),
            post.comment_count,
            post.comment_thread_id,
            &self.comments_tag,
        );
        self.gateway
            .update_keyboard(self.channels.popular, copy_id, &markup)
            .await
    }
}

/// Ephemeral text shown for the "show rating" affordance.
pub fn tally_text(rating: Rating) -> String {
    format!("Upvotes: +{}\nDownvotes: -{}", rating.up, rating.down)
}
