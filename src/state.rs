use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AuthService, CatalogService, LibraryService, SeaOrmAuthService, SeaOrmCatalogService,
    SeaOrmLibraryService,
};

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub auth_service: Arc<dyn AuthService>,

    pub catalog_service: Arc<dyn CatalogService>,

    pub library_service: Arc<dyn LibraryService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        Ok(Self::with_store(config, store))
    }

    /// Wires the services around an already-migrated store.
    #[must_use]
    pub fn with_store(config: Config, store: Store) -> Self {
        let page_size = config.catalog.page_size;

        let auth_service = Arc::new(SeaOrmAuthService::new(
            store.clone(),
            config.security.clone(),
        )) as Arc<dyn AuthService + Send + Sync + 'static>;

        let catalog_service = Arc::new(SeaOrmCatalogService::new(store.clone(), page_size))
            as Arc<dyn CatalogService + Send + Sync + 'static>;

        let library_service = Arc::new(SeaOrmLibraryService::new(store.clone(), page_size))
            as Arc<dyn LibraryService + Send + Sync + 'static>;

        Self {
            config: Arc::new(RwLock::new(config)),
            store,
            auth_service,
            catalog_service,
            library_service,
        }
    }

    pub async fn config(&self) -> Config {
        self.config.read().await.clone()
    }
}
