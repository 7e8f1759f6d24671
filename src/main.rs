use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use travelogue::cache::{MemoryTripCache, NoopTripCache, RedisTripCache, TripCache};
use travelogue::config::{CacheBackend, Config};
use travelogue::constants::DEFAULT_MEMORY_CACHE_MAX_ENTRIES;
use travelogue::services::google_directions::GoogleDirectionsClient;
use travelogue::services::google_places::GooglePlacesClient;
use travelogue::services::timezone::TzSearchLookup;
use travelogue::services::trip_generator::TripGenerator;
use travelogue::services::weatherbit::WeatherbitClient;
use travelogue::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "travelogue=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().map_err(|e| format!("Failed to load configuration: {}", e))?;

    tracing::info!("Starting Travelogue API server");
    tracing::info!("Configuration loaded successfully");

    let memory_cache = || -> Arc<dyn TripCache> {
        Arc::new(MemoryTripCache::new(
            config.trip_cache_ttl,
            DEFAULT_MEMORY_CACHE_MAX_ENTRIES,
        ))
    };

    // Initialize cache: Redis falls back to in-memory when unreachable
    let cache: Arc<dyn TripCache> = match (config.cache_backend, config.redis_url.as_deref()) {
        (CacheBackend::Redis, Some(redis_url)) => {
            tracing::info!("Connecting to Redis cache...");
            match RedisTripCache::new(redis_url, config.trip_cache_ttl).await {
                Ok(redis_cache) => {
                    tracing::info!("Redis cache connection established");
                    Arc::new(redis_cache)
                }
                Err(e) => {
                    tracing::warn!(
                        "Failed to connect to Redis: {}. Falling back to in-memory cache.",
                        e
                    );
                    memory_cache()
                }
            }
        }
        (CacheBackend::None, _) => {
            tracing::info!("Trip cache disabled");
            Arc::new(NoopTripCache)
        }
        _ => {
            tracing::info!("Using in-memory trip cache");
            memory_cache()
        }
    };

    // Initialize services
    let trip_generator = TripGenerator::new(
        Arc::new(GooglePlacesClient::new(config.google_places_api_key.clone())),
        Arc::new(GoogleDirectionsClient::new(
            config.google_directions_api_key.clone(),
        )),
        Arc::new(TzSearchLookup),
        config.trip_generator.clone(),
    )
    .with_cache(cache);

    let weather_client = config.weatherbit_api_key.clone().map(WeatherbitClient::new);
    if weather_client.is_none() {
        tracing::info!("WEATHERBIT_API_KEY not set. Weather endpoints disabled.");
    }

    // Create application state
    let state = Arc::new(AppState {
        trip_generator,
        weather_client,
    });

    // Build router with CORS and tracing
    let app = Router::new()
        .nest("/api/v1", travelogue::routes::create_router(state))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = config.server_address();
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
