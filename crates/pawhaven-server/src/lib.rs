#![forbid(unsafe_code)]
//! HTTP surface of the pawhaven catalog.
//!
//! `main` builds a store, an optional media host, and a [`ServerConfig`],
//! then hands them to [`AppState::new`] and serves [`build_router`]. The
//! [`PetCatalog`] in the state owns the listing cache, so every mutation
//! routed through it keeps the public list view consistent with the store.

mod cache;
mod catalog;
pub mod config;
mod handlers;
mod metrics;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use pawhaven_media::MediaHost;
use pawhaven_store::PetStore;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;

pub use cache::{CacheStats, ListingCache, PETS_COLLECTION};
pub use catalog::{CommitError, PetCatalog};
pub use config::{MediaHostConfig, ServerConfig, StoreBackendConfig};
pub use metrics::Metrics;

pub const CRATE_NAME: &str = "pawhaven-server";

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<PetCatalog>,
    pub cache: Arc<ListingCache>,
    pub config: ServerConfig,
    pub(crate) metrics: Arc<Metrics>,
    pub(crate) request_id_seed: Arc<AtomicU64>,
}

impl AppState {
    #[must_use]
    pub fn new(
        store: Arc<dyn PetStore>,
        media: Option<Arc<dyn MediaHost>>,
        config: ServerConfig,
    ) -> Self {
        let cache = Arc::new(ListingCache::new(config.cache_enabled));
        let catalog = Arc::new(PetCatalog::new(
            store,
            media,
            cache.clone(),
            config.similar_limit,
        ));
        Self {
            catalog,
            cache,
            config,
            metrics: Arc::new(Metrics::default()),
            request_id_seed: Arc::new(AtomicU64::new(1)),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let max_body_bytes = state.config.max_body_bytes;
    Router::new()
        .route("/healthz", get(handlers::healthz_handler))
        .route("/readyz", get(handlers::readyz_handler))
        .route("/version", get(handlers::version_handler))
        .route("/metrics", get(handlers::metrics_handler))
        .route("/openapi.json", get(handlers::openapi_handler))
        .route(
            "/api/pets",
            get(handlers::list_pets_handler).post(handlers::create_pet_handler),
        )
        .route("/api/pets/filter", post(handlers::filter_pets_handler))
        .route(
            "/api/pets/:id",
            get(handlers::get_pet_handler)
                .put(handlers::update_pet_handler)
                .delete(handlers::delete_pet_handler),
        )
        .route("/api/pets/:id/similar", get(handlers::similar_pets_handler))
        .route("/api/pets/:id/media", post(handlers::commit_media_handler))
        .route("/api/admin/stats", get(handlers::admin_stats_handler))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(state)
}
