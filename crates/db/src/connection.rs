//! SQLite pool construction for the intake store.

use std::time::Duration;

use sqlx::sqlite::SqlitePoolOptions;

pub type DbPool = sqlx::SqlitePool;

const BUSY_TIMEOUT_MS: u32 = 5000;

/// Opens a pool sized from the `[database]` config section. Every new
/// connection enables foreign keys (the agreement table references
/// quote_request), switches to WAL, and sets a busy timeout so concurrent
/// intake writes queue instead of failing.
pub async fn connect_with_settings(
    database_url: &str,
    max_connections: u32,
    timeout_secs: u64,
) -> Result<DbPool, sqlx::Error> {
    SqlitePoolOptions::new()
        .max_connections(max_connections.max(1))
        .acquire_timeout(Duration::from_secs(timeout_secs.max(1)))
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                sqlx::query("PRAGMA foreign_keys = ON").execute(&mut *conn).await?;
                sqlx::query("PRAGMA journal_mode = WAL").execute(&mut *conn).await?;
                sqlx::query(&format!("PRAGMA busy_timeout = {BUSY_TIMEOUT_MS}"))
                    .execute(&mut *conn)
                    .await?;
                Ok(())
            })
        })
        .connect(database_url)
        .await
}

#[cfg(test)]
mod tests {
    use super::connect_with_settings;

    #[tokio::test]
    async fn new_connections_enforce_foreign_keys() {
        let pool =
            connect_with_settings("sqlite::memory:", 1, 5).await.expect("in-memory pool");

        let (enabled,): (i64,) = sqlx::query_as("PRAGMA foreign_keys")
            .fetch_one(&pool)
            .await
            .expect("pragma query");
        assert_eq!(enabled, 1);

        pool.close().await;
    }

    #[tokio::test]
    async fn zero_pool_settings_are_clamped_to_minimums() {
        let pool =
            connect_with_settings("sqlite::memory:", 0, 0).await.expect("clamped pool");

        assert_eq!(pool.options().get_max_connections(), 1);

        pool.close().await;
    }
}
