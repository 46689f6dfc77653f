use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::clients::imagery::ImageryProvider;
use crate::clients::usgs::UsgsClient;
use crate::config::Config;
use crate::db::Store;
use crate::services::{LandsatService, SeaOrmLandsatService};

/// Build a shared HTTP client for imagery calls.
/// Every outbound request is bounded by `timeout`.
fn build_shared_http_client(timeout: Duration) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("LandsatExplorer/", env!("CARGO_PKG_VERSION")))
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build shared HTTP client: {e}"))
}

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub landsat_service: Arc<dyn LandsatService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let http_client = build_shared_http_client(config.imagery.request_timeout())?;
        let imagery = Arc::new(UsgsClient::with_shared_client(
            http_client,
            config.imagery.usgs(),
        )) as Arc<dyn ImageryProvider>;

        Self::with_imagery(config, imagery).await
    }

    /// Builds the state around an existing imagery provider.
    pub async fn with_imagery(
        config: Config,
        imagery: Arc<dyn ImageryProvider>,
    ) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let landsat_service = Arc::new(SeaOrmLandsatService::new(
            store.clone(),
            imagery,
            config.imagery.clone(),
        )) as Arc<dyn LandsatService>;

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            store,
            landsat_service,
        })
    }
}
