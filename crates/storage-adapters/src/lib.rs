//! # storage-adapters
//!
//! Postgres implementations of the `domains` store ports, gated behind the
//! `db-postgres` feature. Queries are plain runtime `sqlx::query` calls with
//! explicit row mapping; the schema lives in `migrations/`.

#[cfg(feature = "db-postgres")]
mod pg_posts;
#[cfg(feature = "db-postgres")]
mod pg_votes;
#[cfg(feature = "db-postgres")]
mod pool;

#[cfg(feature = "db-postgres")]
pub use pg_posts::PgPostStore;
#[cfg(feature = "db-postgres")]
pub use pg_votes::PgVoteStore;
#[cfg(feature = "db-postgres")]
pub use pool::connect;

#[cfg(feature = "db-postgres")]
pub(crate) fn storage_err(err: sqlx::Error) -> domains::AppError {
    domains::AppError::Storage(err.to_string())
}
