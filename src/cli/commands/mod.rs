pub mod migrate;
pub mod seed;
pub mod serve;

use anyhow::Context;

use crate::app::AppState;
use crate::config::AppConfig;
use crate::database::DatabaseManager;

/// Build application state on the chosen store. Postgres is migrated before use.
pub(crate) async fn build_state(config: AppConfig, in_memory: bool) -> anyhow::Result<AppState> {
    if in_memory {
        tracing::warn!("Using the in-memory store; nothing will be persisted");
        return AppState::in_memory(config).context("JWT_SECRET must be set");
    }

    let database = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to Postgres (set DATABASE_URL or pass --in-memory)")?;
    database.migrate().await.context("failed to apply migrations")?;

    AppState::postgres(config, database).context("JWT_SECRET must be set")
}
