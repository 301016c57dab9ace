//! # PgVoteStore
//!
//! Vote rows and their aggregates. Ratings are never cached: every call
//! recounts the rows, so "no votes yet" is simply the (0, 0) group.

use async_trait::async_trait;
use sqlx::{postgres::PgPool, Row};

use domains::{AppError, Rating, Result, Vote, VoteStore};

use crate::storage_err;

pub struct PgVoteStore {
    pool: PgPool,
}

impl PgVoteStore {
    pub fn new(pool: PgPool) -> Self {
        PgVoteStore { pool }
    }
}

#[async_trait]
impl VoteStore for PgVoteStore {
    async fn get_user_vote(&self, message_id: i64, user_id: i64) -> Result<Option<Vote>> {
        let row = sqlx::query("SELECT vote FROM votes WHERE message_id = $1 AND user_id = $2")
            .bind(message_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_err)?;

        match row {
            None => Ok(None),
            Some(row) => {
                let symbol: String = row.get("vote");
                Vote::from_symbol(&symbol)
                    .map(Some)
                    .ok_or_else(|| AppError::Storage(format!("unexpected vote symbol {symbol:?}")))
            }
        }
    }

    /// Duplicate delivery of the same tap is absorbed by the conflict
    /// clause rather than surfacing as a constraint violation.
    async fn insert_vote(&self, message_id: i64, user_id: i64, vote: Vote) -> Result<()> {
        sqlx::query(
            "INSERT INTO votes (message_id, user_id, vote) VALUES ($1, $2, $3) \
             ON CONFLICT (message_id, user_id) DO NOTHING",
        )
        .bind(message_id)
        .bind(user_id)
        .bind(vote.symbol())
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;
        Ok(())
    }

    async fn delete_vote(&self, message_id: i64, user_id: i64) -> Result<()> {
        sqlx::query("DELETE FROM votes WHERE message_id = $1 AND user_id = $2")
            .bind(message_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(())
    }

    async fn get_rating(&self, message_id: i64) -> Result<Rating> {
        let row = sqlx::query(
            "SELECT COUNT(*) FILTER (WHERE vote = '+') AS up_votes, \
                    COUNT(*) FILTER (WHERE vote = '-') AS down_votes \
             FROM votes WHERE message_id = $1",
        )
        .bind(message_id)
        .fetch_one(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(Rating {
            up: row.get("up_votes"),
            down: row.get("down_votes"),
        })
    }

    async fn get_user_aggregate_rating(&self, user_id: i64) -> Result<i64> {
        // Join through posts to pick up every vote on the user's posts,
        // minus the votes they cast on their own.
        let row = sqlx::query(
            "SELECT COALESCE(SUM(CASE v.vote WHEN '+' THEN 1 ELSE -1 END), 0) AS karma \
             FROM votes v \
             JOIN posts p ON p.message_id = v.message_id \
             WHERE p.user_id = $1 AND v.user_id <> $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(row.get("karma"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Round-trip against a live database; the logic-level coverage of the
    // vote contract lives in the integration-tests crate over fakes.
    #[tokio::test]
    #[ignore = "needs a running Postgres and DATABASE_URL"]
    async fn vote_round_trip() {
        let url = std::env::var("DATABASE_URL").unwrap();
        let pool = crate::connect(&url, 1).await.unwrap();
        sqlx::query("INSERT INTO posts (message_id, user_id) VALUES (9001, 1) ON CONFLICT DO NOTHING")
            .execute(&pool)
            .await
            .unwrap();

        let store = PgVoteStore::new(pool);
        store.insert_vote(9001, 2, Vote::Up).await.unwrap();
        assert_eq!(store.get_user_vote(9001, 2).await.unwrap(), Some(Vote::Up));
        assert_eq!(store.get_rating(9001).await.unwrap(), Rating { up: 1, down: 0 });

        store.delete_vote(9001, 2).await.unwrap();
        assert_eq!(store.get_user_vote(9001, 2).await.unwrap(), None);
        assert_eq!(store.get_rating(9001).await.unwrap(), Rating::default());
    }
}
