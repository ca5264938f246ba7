use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use std::io;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use eventpros_matching::config::Settings;
use eventpros_matching::error::{json_config, path_config, query_config};
use eventpros_matching::routes::{self, AppState};
use eventpros_matching::services::{CacheManager, PostgresClient};

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        io::Error::new(io::ErrorKind::InvalidInput, e.to_string())
    })?;

    init_tracing(&settings.logging.level, &settings.logging.format);

    info!("Starting EventPros matching service...");

    // Initialize PostgreSQL client
    let postgres = PostgresClient::from_settings(
        &settings.database.url,
        settings.database.max_connections,
        settings.database.min_connections,
        settings.database.acquire_timeout_secs,
        settings.database.idle_timeout_secs,
    )
    .await
    .map_err(|e| {
        error!("Failed to connect to PostgreSQL: {}", e);
        io::Error::new(io::ErrorKind::ConnectionRefused, e.to_string())
    })?;

    info!("PostgreSQL client initialized");

    // Redis is optional; the in-process tier alone is enough to serve
    let cache_ttl = settings.cache.ttl_secs;
    let l1_cache_size = settings.cache.l1_cache_size;

    let cache = match &settings.cache.redis_url {
        Some(url) => match CacheManager::with_redis(url, l1_cache_size, cache_ttl).await {
            Ok(cache) => {
                info!("Cache manager initialized with Redis (L1: {} entries, TTL: {}s)", l1_cache_size, cache_ttl);
                cache
            }
            Err(e) => {
                warn!("Failed to connect to Redis ({}), using in-process cache only", e);
                CacheManager::in_memory(l1_cache_size, cache_ttl)
            }
        },
        None => {
            info!("Cache manager initialized (L1: {} entries, TTL: {}s)", l1_cache_size, cache_ttl);
            CacheManager::in_memory(l1_cache_size, cache_ttl)
        }
    };

    if settings.mapbox.access_token.is_empty() {
        warn!("MAPBOX_ACCESS_TOKEN not set, geocoding is disabled");
    }
    if settings.auth.jwt_secret.is_empty() {
        warn!("SUPABASE_JWT_SECRET not set, authenticated routes will reject every request");
    }

    let app_state = AppState::new(&settings, postgres, cache).map_err(|e| {
        error!("Failed to build application state: {}", e);
        io::Error::new(io::ErrorKind::Other, e.to_string())
    })?;

    info!("Matcher initialized with weights: {:?}", app_state.matcher.weights());

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(json_config())
            .app_data(query_config())
            .app_data(path_config())
            .wrap(middleware::from_fn(eventpros_matching::middleware::rate_limit))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}

/// `RUST_LOG` wins over the configured level
fn init_tracing(level: &str, format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }
}
