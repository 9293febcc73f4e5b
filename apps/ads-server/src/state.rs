//! Application state - shared across all handlers.

use std::sync::Arc;

use ads_core::AdRepository;
use ads_infra::{
    ConnectError, DatabaseConnection, InMemoryAdRepository, MongoAdRepository, MongoConfig,
};

/// Connection string that selects the process-local store instead of MongoDB.
pub const IN_MEMORY_STORE: &str = "memory";

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub ads: Arc<dyn AdRepository>,
}

impl AppState {
    pub fn new(ads: Arc<dyn AdRepository>) -> Self {
        Self { ads }
    }

    /// Build the state for the configured store.
    ///
    /// With [`IN_MEMORY_STORE`] as the URI no database is contacted and no
    /// connection is returned. Ads then live only as long as the process.
    pub async fn from_config(
        config: &MongoConfig,
    ) -> Result<(Self, Option<DatabaseConnection>), ConnectError> {
        if config.uri == IN_MEMORY_STORE {
            tracing::warn!("Using the in-memory ad store; data is not persisted");
            return Ok((Self::new(Arc::new(InMemoryAdRepository::new())), None));
        }

        let (state, connection) = Self::connect(config).await?;
        Ok((state, Some(connection)))
    }

    /// Connect to MongoDB and build the state around the verified session.
    ///
    /// The returned connection stays with the caller, which closes it at shutdown.
    pub async fn connect(config: &MongoConfig) -> Result<(Self, DatabaseConnection), ConnectError> {
        let connection = DatabaseConnection::init(config).await?;
        tracing::info!(
            database = connection.database_name(),
            collection = connection.collection_name(),
            "MongoDB connected"
        );

        let ads = Arc::new(MongoAdRepository::new(&connection));
        tracing::info!("Application state initialized");

        Ok((Self::new(ads), connection))
    }
}
