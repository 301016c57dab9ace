//! # Domain Models
//!
//! These structs represent the core entities of the relay bot. All ids are
//! the chat platform's own 64-bit identifiers; the bot mints none of its own.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single user's vote on a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Vote {
    Up,
    Down,
}

impl Vote {
    /// Wire symbol stored in the database and carried in callback data.
    pub fn symbol(self) -> &'static str {
        match self {
            Vote::Up => "+",
            Vote::Down => "-",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Vote> {
        match symbol {
            "+" => Some(Vote::Up),
            "-" => Some(Vote::Down),
            _ => None,
        }
    }
}

/// The closed set of callback buttons a post keyboard carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonValue {
    Up,
    Down,
    ShowRating,
}

impl ButtonValue {
    pub fn symbol(self) -> &'static str {
        match self {
            ButtonValue::Up => "+",
            ButtonValue::Down => "-",
            ButtonValue::ShowRating => "=",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<ButtonValue> {
        match symbol {
            "+" => Some(ButtonValue::Up),
            "-" => Some(ButtonValue::Down),
            "=" => Some(ButtonValue::ShowRating),
            _ => None,
        }
    }

    /// The vote a button casts, if it casts one at all.
    pub fn as_vote(self) -> Option<Vote> {
        match self {
            ButtonValue::Up => Some(Vote::Up),
            ButtonValue::Down => Some(Vote::Down),
            ButtonValue::ShowRating => None,
        }
    }
}

/// A user submission republished to the primary channel.
///
/// Keyed by its message id there. Rows are append-only history: posts are
/// never deleted, and `popular_id`, once set, is never cleared or changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Message id of the copy in the primary channel.
    pub message_id: i64,
    /// Author of the submission.
    pub user_id: i64,
    pub date: DateTime<Utc>,
    /// Root message of the discussion thread in the comments group.
    /// None until the group's automatic forward of the post arrives.
    pub comment_thread_id: Option<i64>,
    /// Monotonic comment counter, starts at 0.
    pub comment_count: i64,
    /// Message id of the copy in the popular channel. Set at most once.
    pub popular_id: Option<i64>,
    /// Message id of the copy in the "best" channel. Set at most once.
    pub best_id: Option<i64>,
    /// Album identifier shared by submissions sent as a media group.
    pub media_group: Option<String>,
}

/// Aggregate vote tally for a post. Derived, never stored: recomputed from
/// the vote rows after every mutation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
    pub up: i64,
    pub down: i64,
}

impl Rating {
    pub fn total(self) -> i64 {
        self.up + self.down
    }

    /// The signed score shown on the keyboard.
    pub fn score(self) -> i64 {
        self.up - self.down
    }
}

/// Relayable content of a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostContent {
    Text(String),
    Photo {
        /// Platform file id; the bot relays media by reference, never by bytes.
        file_id: String,
        caption: Option<String>,
        /// Album id when the photo arrived as part of a media group.
        media_group: Option<String>,
    },
}

impl PostContent {
    pub fn media_group(&self) -> Option<&str> {
        match self {
            PostContent::Text(_) => None,
            PostContent::Photo { media_group, .. } => media_group.as_deref(),
        }
    }
}

/// A voting-keyboard button, platform-neutral.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub kind: ButtonKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ButtonKind {
    Callback(ButtonValue),
    Link(String),
}

/// The inline keyboard attached to every live copy of a post.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keyboard {
    pub rows: Vec<Vec<Button>>,
}

/// A tap on one of a post's keyboard buttons.
#[derive(Debug, Clone)]
pub struct VoteEvent {
    /// Message the keyboard hangs off: either the origin copy in the primary
    /// channel or the promoted copy in the popular channel.
    pub message_id: i64,
    pub user_id: i64,
    pub button: ButtonValue,
    /// Handle for the ephemeral answer to this interaction.
    pub interaction_id: String,
}

/// A new message inside a post's discussion thread.
#[derive(Debug, Clone, Copy)]
pub struct CommentEvent {
    pub thread_id: i64,
}

/// A private submission to be relayed to the primary channel.
#[derive(Debug, Clone)]
pub struct NewPostEvent {
    pub author_id: i64,
    pub author_name: Option<String>,
    pub username: Option<String>,
    pub content: PostContent,
}
