use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use stockcast_ai::{
    FeatureVectorBuilder, ForecastOrchestrator, HistoricalDemandAggregator, ModelRegistry,
};
use stockcast_core::{Clock, SystemClock};
use stockcast_infra::{
    CachedModelRegistry, InMemoryIssuanceLog, InMemoryModelRegistry, IssuanceLog, ServiceConfig,
};

#[cfg(feature = "postgres")]
use anyhow::Context;
#[cfg(feature = "postgres")]
use sqlx::PgPool;
#[cfg(feature = "postgres")]
use stockcast_infra::{
    issuance_log::PostgresIssuanceLog, model_registry::PostgresModelRegistry,
};

pub type SharedIssuanceLog = Arc<dyn IssuanceLog>;
pub type SharedModelRegistry = Arc<dyn ModelRegistry>;
pub type Orchestrator = ForecastOrchestrator<SharedIssuanceLog, SharedModelRegistry>;

/// Everything a handler needs, shared behind one `Arc`.
pub struct AppServices {
    orchestrator: Orchestrator,
    issuances: SharedIssuanceLog,
    clock: Arc<dyn Clock>,
}

impl AppServices {
    /// Wire the forecast pipeline over the given stores.
    ///
    /// The registry is wrapped in a [`CachedModelRegistry`] using the
    /// configured TTL, so registrations made through these services
    /// invalidate the cache immediately.
    pub fn new(
        issuances: SharedIssuanceLog,
        registry: SharedModelRegistry,
        clock: Arc<dyn Clock>,
        config: &ServiceConfig,
    ) -> Self {
        let registry: SharedModelRegistry =
            Arc::new(CachedModelRegistry::new(registry, config.registry_cache_ttl));

        let aggregator = HistoricalDemandAggregator::new(issuances.clone())
            .with_lookback_days(config.lookback_days);
        let orchestrator =
            ForecastOrchestrator::new(FeatureVectorBuilder::new(aggregator), registry)
                .with_default_model(config.model_name.clone());

        Self {
            orchestrator,
            issuances,
            clock,
        }
    }

    pub fn in_memory(config: &ServiceConfig, clock: Arc<dyn Clock>) -> Self {
        Self::new(
            Arc::new(InMemoryIssuanceLog::new()),
            Arc::new(InMemoryModelRegistry::new()),
            clock,
            config,
        )
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    pub fn registry(&self) -> &SharedModelRegistry {
        self.orchestrator.registry()
    }

    pub fn issuances(&self) -> &SharedIssuanceLog {
        &self.issuances
    }

    /// Request time. Read once per request and threaded through the pipeline.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}

/// Build services from configuration.
///
/// With the `postgres` feature and `DATABASE_URL` set, issuances and model
/// artifacts live in Postgres; otherwise both stores are in-memory.
pub async fn build_services(config: &ServiceConfig) -> anyhow::Result<AppServices> {
    #[cfg(feature = "postgres")]
    {
        if let Some(url) = config.database_url.as_deref() {
            return build_persistent_services(url, config).await;
        }
    }

    #[cfg(not(feature = "postgres"))]
    {
        if config.database_url.is_some() {
            tracing::warn!("DATABASE_URL is set but the postgres feature is disabled; ignoring it");
        }
    }

    info!("using in-memory issuance log and model registry");
    Ok(AppServices::in_memory(config, Arc::new(SystemClock)))
}

#[cfg(feature = "postgres")]
async fn build_persistent_services(
    database_url: &str,
    config: &ServiceConfig,
) -> anyhow::Result<AppServices> {
    let pool = PgPool::connect(database_url)
        .await
        .context("failed to connect to Postgres")?;

    let issuances = PostgresIssuanceLog::new(pool.clone());
    issuances.migrate().await.context("issuance schema migration failed")?;

    let registry = PostgresModelRegistry::new(pool);
    registry.migrate().await.context("model registry schema migration failed")?;

    info!("using Postgres issuance log and model registry");
    Ok(AppServices::new(
        Arc::new(issuances),
        Arc::new(registry),
        Arc::new(SystemClock),
        config,
    ))
}
