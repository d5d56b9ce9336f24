use std::sync::Arc;

use anyhow::Context;
use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ecosteps_backend::config::Config;
use ecosteps_backend::handlers;
use ecosteps_backend::repositories::{InMemoryStore, SeaOrmStore, Store};
use ecosteps_backend::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,ecosteps_backend=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env().context("invalid configuration")?;

    let store: Arc<dyn Store> = match &config.database_url {
        Some(database_url) => {
            tracing::info!("Connecting to database...");
            let db = Database::connect(database_url)
                .await
                .context("failed to connect to database")?;

            if config.run_migrations {
                tracing::info!("Running migrations...");
                migration::Migrator::up(&db, None)
                    .await
                    .context("failed to run migrations")?;
            }

            Arc::new(SeaOrmStore::new(db))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using the in-memory store; data is lost on exit");
            Arc::new(InMemoryStore::new())
        }
    };

    if config.reviewer_ids.is_empty() {
        tracing::warn!("REVIEWER_IDS is empty, nobody can review submissions or settle sales");
    }

    let state = AppState::new(store, &config);

    let cors = if config.cors_permissive {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
    };

    let app = handlers::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
