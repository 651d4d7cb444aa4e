use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::clients::tmdb::TmdbClient;
use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AuthService, CatalogService, ImageUrls, MetadataService, SeaOrmAuthService,
    SeaOrmCatalogService, SeaOrmUserContentService, StreamUrlBuilder, TmdbMetadataService,
    UserContentService,
};

/// Build a shared HTTP client with reasonable defaults for API calls.
/// This client should be reused across all HTTP-based services to enable
/// connection pooling and avoid socket exhaustion.
fn build_shared_http_client(timeout_seconds: u64) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_seconds))
        .user_agent(concat!("Reelhub/", env!("CARGO_PKG_VERSION")))
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build shared HTTP client: {e}"))
}

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub metadata_service: Arc<dyn MetadataService>,

    pub catalog_service: Arc<dyn CatalogService>,

    pub user_content_service: Arc<dyn UserContentService>,

    pub auth_service: Arc<dyn AuthService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        Self::with_store(config, store)
    }

    /// Wires every service on top of an already migrated store.
    pub fn with_store(config: Config, store: Store) -> anyhow::Result<Self> {
        let http_client = build_shared_http_client(config.tmdb.request_timeout_seconds)?;

        let images = ImageUrls::new(&config.tmdb.image_base_url);
        let streams = StreamUrlBuilder::new(&config.streaming)?;
        let tmdb = TmdbClient::new(http_client.clone(), &config.tmdb);

        let metadata_service = Arc::new(TmdbMetadataService::new(
            tmdb,
            http_client,
            images.clone(),
            streams,
            Duration::from_secs(config.streaming.probe_timeout_seconds),
        )) as Arc<dyn MetadataService>;

        let catalog_service =
            Arc::new(SeaOrmCatalogService::new(store.clone())) as Arc<dyn CatalogService>;

        let user_content_service = Arc::new(SeaOrmUserContentService::new(store.clone(), images))
            as Arc<dyn UserContentService>;

        let auth_service = Arc::new(SeaOrmAuthService::new(
            store.clone(),
            config.security.clone(),
        )) as Arc<dyn AuthService>;

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            store,
            metadata_service,
            catalog_service,
            user_content_service,
            auth_service,
        })
    }
}
