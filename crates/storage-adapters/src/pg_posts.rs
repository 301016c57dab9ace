//! # PgPostStore
//!
//! Per-post metadata. Posts are append-only history: nothing here deletes a
//! row, and the promoted-copy id is claimed with a conditional update so
//! promotion can never record twice.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgRow};
use sqlx::Row;

use chrono::{DateTime, Utc};
use domains::{Post, PostStore, Result};

use crate::storage_err;

pub struct PgPostStore {
    pool: PgPool,
}

impl PgPostStore {
    pub fn new(pool: PgPool) -> Self {
        PgPostStore { pool }
    }
}

const POST_COLUMNS: &str =
    "message_id, user_id, date, comment_thread_id, comment_count, popular_id, best_id, media_group";

fn post_from_row(row: &PgRow) -> Post {
    Post {
        message_id: row.get("message_id"),
        user_id: row.get("user_id"),
        date: row.get("date"),
        comment_thread_id: row.get("comment_thread_id"),
        comment_count: row.get("comment_count"),
        popular_id: row.get("popular_id"),
        best_id: row.get("best_id"),
        media_group: row.get("media_group"),
    }
}

#[async_trait]
impl PostStore for PgPostStore {
    async fn create(&self, post: Post) -> Result<()> {
        sqlx::query(
            "INSERT INTO posts (message_id, user_id, date, comment_thread_id, comment_count, \
                                popular_id, best_id, media_group) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(post.message_id)
        .bind(post.user_id)
        .bind(post.date)
        .bind(post.comment_thread_id)
        .bind(post.comment_count)
        .bind(post.popular_id)
        .bind(post.best_id)
        .bind(post.media_group)
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;
        Ok(())
    }

    async fn get(&self, message_id: i64) -> Result<Option<Post>> {
        let row = sqlx::query(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE message_id = $1"
        ))
        .bind(message_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_err)?;
        Ok(row.as_ref().map(post_from_row))
    }

    async fn get_by_popular_id(&self, popular_id: i64) -> Result<Option<Post>> {
        let row = sqlx::query(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE popular_id = $1"
        ))
        .bind(popular_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_err)?;
        Ok(row.as_ref().map(post_from_row))
    }

    async fn get_by_media_group(&self, media_group: &str) -> Result<Option<Post>> {
        let row = sqlx::query(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE media_group = $1"
        ))
        .bind(media_group)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_err)?;
        Ok(row.as_ref().map(post_from_row))
    }

    async fn increment_comment_count(&self, thread_id: i64) -> Result<Option<Post>> {
        let row = sqlx::query(&format!(
            "UPDATE posts SET comment_count = comment_count + 1 \
             WHERE comment_thread_id = $1 RETURNING {POST_COLUMNS}"
        ))
        .bind(thread_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_err)?;
        Ok(row.as_ref().map(post_from_row))
    }

    async fn set_comment_thread(&self, message_id: i64, thread_id: i64) -> Result<Option<Post>> {
        // First writer wins; a repeated automatic forward changes nothing.
        let row = sqlx::query(&format!(
            "UPDATE posts SET comment_thread_id = $2 \
             WHERE message_id = $1 AND comment_thread_id IS NULL RETURNING {POST_COLUMNS}"
        ))
        .bind(message_id)
        .bind(thread_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_err)?;
        Ok(row.as_ref().map(post_from_row))
    }

    async fn mark_popular(&self, message_id: i64, popular_id: i64) -> Result<bool> {
        // Compare-and-set: two concurrent promotions race on this update
        // and exactly one observes a changed row.
        let result = sqlx::query(
            "UPDATE posts SET popular_id = $2 \
             WHERE message_id = $1 AND popular_id IS NULL",
        )
        .bind(message_id)
        .bind(popular_id)
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;
        Ok(result.rows_affected() == 1)
    }

    async fn count_posts_since(&self, user_id: i64, since: DateTime<Utc>) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM posts WHERE user_id = $1 AND date >= $2")
            .bind(user_id)
            .bind(since)
            .fetch_one(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(row.get("n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore = "needs a running Postgres and DATABASE_URL"]
    async fn mark_popular_claims_only_once() {
        let url = std::env::var("DATABASE_URL").unwrap();
        let pool = crate::connect(&url, 1).await.unwrap();
        let store = PgPostStore::new(pool);

        store
            .create(Post {
                message_id: 9100,
                user_id: 1,
                date: Utc::now(),
                comment_thread_id: None,
                comment_count: 0,
                popular_id: None,
                best_id: None,
                media_group: None,
            })
            .await
            .unwrap();

        assert!(store.mark_popular(9100, 501).await.unwrap());
        assert!(!store.mark_popular(9100, 502).await.unwrap());
        let post = store.get(9100).await.unwrap().unwrap();
        assert_eq!(post.popular_id, Some(501));
    }
}
