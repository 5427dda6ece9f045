use anyhow::{Context, anyhow};
use diesel::Connection;
use diesel_async::{
    AsyncPgConnection, async_connection_wrapper::AsyncConnectionWrapper,
    pooled_connection::{AsyncDieselConnectionManager, PoolError},
};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::info;

use crate::utils::types::Pool;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

pub async fn get_pool(db_url: &str) -> Result<Pool, PoolError> {
    let config = AsyncDieselConnectionManager::<AsyncPgConnection>::new(db_url);

    bb8::Pool::builder().max_size(16).build(config).await
}

/// Pool that only connects on first checkout. Used where no query may run yet,
/// e.g. routing tests.
pub fn lazy_pool(db_url: &str) -> Pool {
    let config = AsyncDieselConnectionManager::<AsyncPgConnection>::new(db_url);

    bb8::Pool::builder().max_size(4).build_unchecked(config)
}

pub async fn run_migrations(db_url: &str) -> anyhow::Result<usize> {
    let db_url = db_url.to_owned();

    tokio::task::spawn_blocking(move || {
        let mut conn = AsyncConnectionWrapper::<AsyncPgConnection>::establish(&db_url)
            .context("failed to connect for migrations")?;

        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| anyhow!("failed to run migrations: {e}"))?;

        for version in &applied {
            info!(%version, "applied migration");
        }

        Ok(applied.len())
    })
    .await
    .context("migration task panicked")?
}
