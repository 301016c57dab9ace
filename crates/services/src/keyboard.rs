//! # Keyboard Rendering
//!
//! Builds the platform-neutral voting keyboard attached to every live copy
//! of a post: one row of 👍 / signed score / 👎 callback buttons, plus a
//! comments link once the post has a discussion thread.

use domains::{Button, ButtonKind, ButtonValue, Keyboard};

/// Renders the keyboard for a post.
///
/// `thread_id` is the root message of the post's discussion thread; while it
/// is unknown the comments row is omitted. `group_tag` is the public tag of
/// the comments group (with or without a leading `@`).
pub fn render(score: i64, comment_count: i64, thread_id: Option<i64>, group_tag: &str) -> Keyboard {
    let mut rows = vec![vec![
        callback("👍", ButtonValue::Up),
        callback(&format!("{score:+}"), ButtonValue::ShowRating),
        callback("👎", ButtonValue::Down),
    ]];

    if let Some(thread_id) = thread_id {
        let label = if comment_count == 0 {
            "Comments 💬".to_string()
        } else {
            format!("Comments ({comment_count}) 💬")
        };
        let url = format!(
            "https://t.me/{}/{}/{}",
            group_tag.trim_start_matches('@'),
            thread_id,
            thread_id
        );
        rows.push(vec![Button {
            label,
            kind: ButtonKind::Link(url),
        }]);
    }

    Keyboard { rows }
}

fn callback(label: &str, value: ButtonValue) -> Button {
    Button {
        label: label.to_string(),
        kind: ButtonKind::Callback(value),
    }
}
