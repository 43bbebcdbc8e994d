use anyhow::{Context, Result};
use diesel::{Connection, PgConnection};
use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::bb8::Pool;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness};

pub type DbPool = Pool<AsyncPgConnection>;

pub async fn connect(database_url: &str) -> Result<DbPool> {
    let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(database_url);
    Pool::builder()
        .build(manager)
        .await
        .context("Failed to build database connection pool")
}

/// Runs embedded migrations on a blocking thread. Diesel's migration harness
/// is synchronous, so this must not run on the async executor directly.
pub async fn run_migrations_blocking(
    migrations: EmbeddedMigrations,
    database_url: &str,
) -> Result<usize> {
    let database_url = database_url.to_string();
    tokio::task::spawn_blocking(move || {
        let mut conn = PgConnection::establish(&database_url)
            .context("Failed to connect to the database for migrations")?;
        let applied = conn
            .run_pending_migrations(migrations)
            .map_err(|e| anyhow::anyhow!("Failed to run migrations: {e}"))?;
        Ok::<usize, anyhow::Error>(applied.len())
    })
    .await
    .context("Migration task panicked")?
}
