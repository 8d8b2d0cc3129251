use std::sync::Arc;

use anyhow::{Context, Result};
use diesel_migrations::{EmbeddedMigrations, embed_migrations};
use minishop::{
    app_state::AppState,
    bootstrap, config,
    config::StoreKind,
    db, routes,
    store::{MemoryStore, PgStore, ShopStore},
};

/// Migrations embedded into the binary which helps with streamlining image building process
const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

#[tokio::main]
async fn main() -> Result<()> {
    bootstrap::init_tracing();
    bootstrap::init_env();

    let config = config::load()?;

    let store: Arc<dyn ShopStore> = match (&config.store, &config.database) {
        (StoreKind::Postgres, Some(database)) => {
            tracing::info!("Running migrations...");
            let migrations_count = db::run_migrations_blocking(MIGRATIONS, &database.url).await?;
            tracing::info!("Run {} new migrations successfully", migrations_count);

            let pool = db::create_pool(database).await?;
            Arc::new(PgStore::new(pool))
        }
        (StoreKind::Postgres, None) => {
            return Err(anyhow::anyhow!("Postgres store selected without a database"))
                .context("Invalid configuration");
        }
        (StoreKind::Memory, _) => {
            tracing::warn!("Using the in-memory demo store, data is lost on exit");
            Arc::new(MemoryStore::demo())
        }
    };

    let server = config.server.clone();
    let app = routes::app(AppState::new(store, config));

    bootstrap::serve("CatalogService", app, &server).await
}
