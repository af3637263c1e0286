use std::sync::Arc;

use secrecy::ExposeSecret;
use thiserror::Error;
use tracing::info;
use vaulted_core::config::{AppConfig, ConfigError, LoadOptions};
use vaulted_core::{ListingSearch, MarketDataSource, ValuationEngine};
use vaulted_db::{connect_with_settings, migrations, DbPool, SqlAgreementRepository, SqlQuoteRepository};
use vaulted_market::{
    CategoryEstimatorSource, CompletedSalesSource, DisabledListingSearch, HttpListingSearch,
    Jitter, ShoppingSearchSource,
};
use vaulted_signing::{HttpSigningService, NoopSigningService, SigningService};

use crate::quotes::AppState;

const SIGNING_TIMEOUT_SECS: u64 = 30;

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub state: AppState,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error("market collaborator setup failed: {0}")]
    Market(String),
    #[error("signing collaborator setup failed: {0}")]
    Signing(String),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(event_name = "system.bootstrap.start", "starting application bootstrap");

    let db_pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(BootstrapError::DatabaseConnect)?;
    info!(event_name = "system.bootstrap.database_connected", "database connection established");

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(event_name = "system.bootstrap.migrations_applied", "database migrations applied");

    let state = build_state(&config, db_pool.clone())?;
    Ok(Application { config, db_pool, state })
}

fn build_state(config: &AppConfig, db_pool: DbPool) -> Result<AppState, BootstrapError> {
    let jitter = Arc::new(Jitter::from_entropy());

    let shopping_key =
        config.market.shopping_api_key.as_ref().map(|key| key.expose_secret().to_string());
    let sources: Vec<Arc<dyn MarketDataSource>> = vec![
        Arc::new(CompletedSalesSource::new(jitter.clone())),
        Arc::new(
            ShoppingSearchSource::new(
                config.market.shopping_base_url.clone(),
                shopping_key,
                config.market.timeout_secs,
            )
            .map_err(|error| BootstrapError::Market(error.to_string()))?,
        ),
        Arc::new(CategoryEstimatorSource::new(jitter)),
    ];

    let listing: Arc<dyn ListingSearch> = match config.market.search_api_key.as_ref() {
        Some(key) => Arc::new(
            HttpListingSearch::new(
                config.market.search_base_url.clone(),
                key.expose_secret(),
                config.market.timeout_secs,
            )
            .map_err(|error| BootstrapError::Market(error.to_string()))?,
        ),
        None => Arc::new(DisabledListingSearch),
    };

    let signing: Arc<dyn SigningService> = if config.signing.enabled {
        let api_key = config
            .signing
            .api_key
            .as_ref()
            .map(|key| key.expose_secret().to_string())
            .unwrap_or_default();
        Arc::new(
            HttpSigningService::new(
                config.signing.base_url.clone(),
                api_key,
                SIGNING_TIMEOUT_SECS,
            )
            .map_err(|error| BootstrapError::Signing(error.to_string()))?,
        )
    } else {
        Arc::new(NoopSigningService::new())
    };

    info!(
        event_name = "system.bootstrap.collaborators_wired",
        listing_search = if config.market.search_api_key.is_some() { "http" } else { "disabled" },
        shopping_source = if config.market.shopping_api_key.is_some() { "http" } else { "silent" },
        signing_service = if config.signing.enabled { "http" } else { "noop" },
        "engine collaborators wired"
    );

    Ok(AppState {
        engine: Arc::new(ValuationEngine::new(listing, sources)),
        quotes: Arc::new(SqlQuoteRepository::new(db_pool.clone())),
        agreements: Arc::new(SqlAgreementRepository::new(db_pool)),
        signing,
        webhook_secret: config.signing.webhook_secret.clone(),
        return_url: config.signing.return_url.clone(),
    })
}

#[cfg(test)]
mod tests {
    use vaulted_core::config::{ConfigOverrides, LoadOptions};

    use super::bootstrap;

    fn options(database_url: &str) -> LoadOptions {
        LoadOptions {
            overrides: ConfigOverrides {
                database_url: Some(database_url.to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        }
    }

    #[tokio::test]
    async fn bootstrap_prepares_schema_and_wires_state() {
        let app = bootstrap(options("sqlite::memory:?cache=shared"))
            .await
            .expect("bootstrap should succeed against an in-memory database");

        let (table_count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master \
             WHERE type = 'table' AND name IN ('quote_request', 'agreement')",
        )
        .fetch_one(&app.db_pool)
        .await
        .expect("expected schema check to succeed");
        assert_eq!(table_count, 2, "bootstrap should create the intake tables");

        app.db_pool.close().await;
    }

    #[tokio::test]
    async fn bootstrap_fails_fast_on_unreachable_database() {
        let result = bootstrap(options("sqlite:///nonexistent-dir/vaulted.db")).await;
        assert!(result.is_err());
    }
}
