//! # integration-tests
//!
//! Test doubles shared by the scenario suites: an in-memory implementation
//! of both store ports and a gateway that records every outbound call.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use domains::{
    ChannelGateway, Keyboard, Post, PostContent, PostStore, Rating, Result, Vote, VoteStore,
};

/// In-memory vote and post storage with the same contracts as the Postgres
/// adapters.
#[derive(Default)]
pub struct InMemoryStore {
    votes: Mutex<HashMap<(i64, i64), Vote>>,
    posts: Mutex<HashMap<i64, Post>>,
}

impl InMemoryStore {
    pub fn add_post(&self, post: Post) {
        self.posts.lock().unwrap().insert(post.message_id, post);
    }

    pub fn post(&self, message_id: i64) -> Option<Post> {
        self.posts.lock().unwrap().get(&message_id).cloned()
    }

    pub fn post_count(&self) -> usize {
        self.posts.lock().unwrap().len()
    }

    pub fn stored_vote(&self, message_id: i64, user_id: i64) -> Option<Vote> {
        self.votes.lock().unwrap().get(&(message_id, user_id)).copied()
    }
}

/// A bare post in the primary channel, the common case in scenarios.
pub fn post(message_id: i64, user_id: i64) -> Post {
    Post {
        message_id,
        user_id,
        date: Utc::now(),
        comment_thread_id: None,
        comment_count: 0,
        popular_id: None,
        best_id: None,
        media_group: None,
    }
}

#[async_trait]
impl VoteStore for InMemoryStore {
    async fn get_user_vote(&self, message_id: i64, user_id: i64) -> Result<Option<Vote>> {
        Ok(self.stored_vote(message_id, user_id))
    }

    async fn insert_vote(&self, message_id: i64, user_id: i64, vote: Vote) -> Result<()> {
        self.votes
            .lock()
            .unwrap()
            .entry((message_id, user_id))
            .or_insert(vote);
        Ok(())
    }

    async fn delete_vote(&self, message_id: i64, user_id: i64) -> Result<()> {
        self.votes.lock().unwrap().remove(&(message_id, user_id));
        Ok(())
    }

    async fn get_rating(&self, message_id: i64) -> Result<Rating> {
        let votes = self.votes.lock().unwrap();
        let mut rating = Rating::default();
        for ((vote_message, _), vote) in votes.iter() {
            if *vote_message != message_id {
                continue;
            }
            match vote {
                Vote::Up => rating.up += 1,
                Vote::Down => rating.down += 1,
            }
        }
        Ok(rating)
    }

    async fn get_user_aggregate_rating(&self, user_id: i64) -> Result<i64> {
        let posts = self.posts.lock().unwrap();
        let votes = self.votes.lock().unwrap();
        let mut karma = 0;
        for ((vote_message, voter), vote) in votes.iter() {
            let Some(post) = posts.get(vote_message) else {
                continue;
            };
            if post.user_id != user_id || *voter == user_id {
                continue;
            }
            karma += match vote {
                Vote::Up => 1,
                Vote::Down => -1,
            };
        }
        Ok(karma)
    }
}

#[async_trait]
impl PostStore for InMemoryStore {
    async fn create(&self, post: Post) -> Result<()> {
        self.add_post(post);
        Ok(())
    }

    async fn get(&self, message_id: i64) -> Result<Option<Post>> {
        Ok(self.post(message_id))
    }

    async fn get_by_popular_id(&self, popular_id: i64) -> Result<Option<Post>> {
        let posts = self.posts.lock().unwrap();
        Ok(posts
            .values()
            .find(|post| post.popular_id == Some(popular_id))
            .cloned())
    }

    async fn get_by_media_group(&self, media_group: &str) -> Result<Option<Post>> {
        let posts = self.posts.lock().unwrap();
        Ok(posts
            .values()
            .find(|post| post.media_group.as_deref() == Some(media_group))
            .cloned())
    }

    async fn increment_comment_count(&self, thread_id: i64) -> Result<Option<Post>> {
        let mut posts = self.posts.lock().unwrap();
        let post = posts
            .values_mut()
            .find(|post| post.comment_thread_id == Some(thread_id));
        Ok(post.map(|post| {
            post.comment_count += 1;
            post.clone()
        }))
    }

    async fn set_comment_thread(&self, message_id: i64, thread_id: i64) -> Result<Option<Post>> {
        let mut posts = self.posts.lock().unwrap();
        match posts.get_mut(&message_id) {
            Some(post) if post.comment_thread_id.is_none() => {
                post.comment_thread_id = Some(thread_id);
                Ok(Some(post.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn mark_popular(&self, message_id: i64, popular_id: i64) -> Result<bool> {
        let mut posts = self.posts.lock().unwrap();
        match posts.get_mut(&message_id) {
            Some(post) if post.popular_id.is_none() => {
                post.popular_id = Some(popular_id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn count_posts_since(&self, user_id: i64, since: DateTime<Utc>) -> Result<i64> {
        let posts = self.posts.lock().unwrap();
        Ok(posts
            .values()
            .filter(|post| post.user_id == user_id && post.date >= since)
            .count() as i64)
    }
}

/// Records every outbound gateway call; publish/copy mint sequential ids.
pub struct RecordingGateway {
    calls: Mutex<Vec<GatewayCall>>,
    next_id: AtomicI64,
}

impl Default for RecordingGateway {
    fn default() -> Self {
        RecordingGateway {
            calls: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1000),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GatewayCall {
    Publish {
        chat_id: i64,
        message_id: i64,
        content: PostContent,
        with_keyboard: bool,
    },
    UpdateKeyboard {
        chat_id: i64,
        message_id: i64,
        keyboard: Keyboard,
    },
    Copy {
        from_chat: i64,
        message_id: i64,
        to_chat: i64,
        new_id: i64,
    },
    Delete {
        chat_id: i64,
        message_id: i64,
    },
    Answer {
        interaction_id: String,
        text: Option<String>,
    },
}

impl RecordingGateway {
    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn copies(&self) -> Vec<GatewayCall> {
        self.calls()
            .into_iter()
            .filter(|call| matches!(call, GatewayCall::Copy { .. }))
            .collect()
    }

    /// Keyboards pushed to one particular message, in order.
    pub fn keyboards_for(&self, chat: i64, message: i64) -> Vec<Keyboard> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                GatewayCall::UpdateKeyboard {
                    chat_id,
                    message_id,
                    keyboard,
                } if chat_id == chat && message_id == message => Some(keyboard),
                _ => None,
            })
            .collect()
    }

    pub fn answers(&self) -> Vec<Option<String>> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                GatewayCall::Answer { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl ChannelGateway for RecordingGateway {
    async fn publish_post<'a>(
        &self,
        chat_id: i64,
        content: &PostContent,
        keyboard: Option<&'a Keyboard>,
    ) -> Result<i64> {
        let message_id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.calls.lock().unwrap().push(GatewayCall::Publish {
            chat_id,
            message_id,
            content: content.clone(),
            with_keyboard: keyboard.is_some(),
        });
        Ok(message_id)
    }

    async fn update_keyboard(
        &self,
        chat_id: i64,
        message_id: i64,
        keyboard: &Keyboard,
    ) -> Result<()> {
        self.calls.lock().unwrap().push(GatewayCall::UpdateKeyboard {
            chat_id,
            message_id,
            keyboard: keyboard.clone(),
        });
        Ok(())
    }

    async fn copy_post(&self, from_chat: i64, message_id: i64, to_chat: i64) -> Result<i64> {
        let new_id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.calls.lock().unwrap().push(GatewayCall::Copy {
            from_chat,
            message_id,
            to_chat,
            new_id,
        });
        Ok(new_id)
    }

    async fn delete_post(&self, chat_id: i64, message_id: i64) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(GatewayCall::Delete { chat_id, message_id });
        Ok(())
    }

    async fn answer_interaction<'a>(
        &self,
        interaction_id: &str,
        text: Option<&'a str>,
    ) -> Result<()> {
        self.calls.lock().unwrap().push(GatewayCall::Answer {
            interaction_id: interaction_id.to_string(),
            text: text.map(str::to_string),
        });
        Ok(())
    }
}
