use axum::extract::FromRef;

use crate::catalog_store::CatalogStore;
use crate::metadata::MetadataFetcher;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use super::ServerConfig;

pub type GuardedCatalogStore = Arc<Mutex<CatalogStore>>;
pub type GuardedMetadataFetcher = Arc<dyn MetadataFetcher>;

/// Locks the store. A panic in another handler leaves the book list
/// consistent (every mutation is a single push/remove/assign), so a poisoned
/// lock is recovered rather than propagated.
pub fn lock_catalog(catalog_store: &GuardedCatalogStore) -> MutexGuard<'_, CatalogStore> {
    catalog_store
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub catalog_store: GuardedCatalogStore,
    pub metadata_fetcher: GuardedMetadataFetcher,
    pub hash: String,
}

impl ServerState {
    pub fn new(
        config: ServerConfig,
        catalog_store: GuardedCatalogStore,
        metadata_fetcher: GuardedMetadataFetcher,
    ) -> ServerState {
        ServerState {
            config,
            start_time: Instant::now(),
            catalog_store,
            metadata_fetcher,
            hash: env!("GIT_HASH").to_owned(),
        }
    }
}

impl FromRef<ServerState> for GuardedCatalogStore {
    fn from_ref(input: &ServerState) -> Self {
        input.catalog_store.clone()
    }
}

impl FromRef<ServerState> for GuardedMetadataFetcher {
    fn from_ref(input: &ServerState) -> Self {
        input.metadata_fetcher.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
