use axum::{
    Router,
    http::HeaderValue,
    routing::get,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::clients::geocoding::GeocodingClient;
use crate::clients::places::PlacesClient;
use crate::config::Config;
use crate::db::Store;
use crate::db::repositories::business::RatingThresholds;
use crate::services::{BusinessService, ReconcileService, SeaOrmBusinessService, SearchPolicy};

mod businesses;
mod error;
mod types;
mod validation;

pub use error::ApiError;
pub use types::*;

pub struct AppState {
    pub config: Arc<Config>,
    pub store: Store,
    pub geocoding: Arc<GeocodingClient>,
    pub reconciler: Arc<ReconcileService>,
    pub businesses: Arc<dyn BusinessService>,
}

fn build_shared_http_client(timeout_seconds: u64) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_seconds))
        .user_agent("Prospectr/1.0")
        .pool_max_idle_per_host(10)
        .build()
        .map_err(Into::into)
}

pub async fn create_app_state(config: Config) -> anyhow::Result<Arc<AppState>> {
    let store = Store::with_pool_options(
        &config.general.database_path,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await?;

    let http_client = build_shared_http_client(config.google.request_timeout_seconds)?;

    let geocoding = Arc::new(GeocodingClient::new(
        http_client.clone(),
        config.google.geocode_url.clone(),
        config.google.api_key.clone(),
    ));

    let places = Arc::new(PlacesClient::new(
        http_client,
        config.google.places_url.clone(),
        config.google.api_key.clone(),
        config.search.max_radius_meters,
        config.google.fetch_details,
    ));

    let reconciler = Arc::new(ReconcileService::new(
        geocoding.clone(),
        places,
        Arc::new(store.clone()),
        SearchPolicy::from(&config.search),
    ));

    let thresholds = RatingThresholds {
        ceiling: config.search.rating_ceiling,
        floor: config.search.review_floor,
    };
    let businesses: Arc<dyn BusinessService> = Arc::new(SeaOrmBusinessService::new(
        store.clone(),
        thresholds,
        config.search.page_size,
    ));

    Ok(Arc::new(AppState {
        config: Arc::new(config),
        store,
        geocoding,
        reconciler,
        businesses,
    }))
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors_origins = state.config.server.cors_allowed_origins.clone();

    let api_router = Router::new()
        .route("/businesses", get(businesses::list_businesses))
        .route("/businesses/search", get(businesses::search_businesses))
        .route("/businesses/stats", get(businesses::get_stats))
        .route("/businesses/test-api", get(businesses::test_api))
        .route("/businesses/export", get(businesses::export_businesses))
        .route("/businesses/{id}", get(businesses::get_business))
        .with_state(state);

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}
