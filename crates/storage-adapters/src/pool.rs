//! Pool construction and schema migration.
//!
//! The pool is built once by the process entry point and handed to each
//! store explicitly; there is no lazily initialized global connection.

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

/// Connects to Postgres and brings the schema up to date.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    info!(max_connections, "database ready");
    Ok(pool)
}
