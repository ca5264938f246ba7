// Route exports
pub mod budget;
pub mod map;
pub mod matching;

use actix_web::{web, HttpResponse};
use std::sync::Arc;
use std::time::Duration;

use crate::auth::TokenVerifier;
use crate::config::Settings;
use crate::core::{BudgetCalculator, ClusterBuilder, Matcher};
use crate::error::ApiError;
use crate::models::{ApiResponse, HealthResponse};
use crate::services::{CacheManager, MapboxClient, PostgresClient, RateLimiter};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub postgres: Arc<PostgresClient>,
    pub cache: Arc<CacheManager>,
    pub mapbox: Arc<MapboxClient>,
    pub tokens: Arc<TokenVerifier>,
    pub rate_limiter: Option<Arc<RateLimiter>>,
    pub trust_forwarded: bool,
    pub matcher: Matcher,
    pub budget: BudgetCalculator,
    pub clusters: ClusterBuilder,
    pub default_limit: usize,
    pub max_limit: usize,
}

impl AppState {
    /// Wire the scoring helpers and clients from configuration
    pub fn new(
        settings: &Settings,
        postgres: PostgresClient,
        cache: CacheManager,
    ) -> Result<Self, ApiError> {
        let mapbox = MapboxClient::new(
            settings.mapbox.base_url.clone(),
            settings.mapbox.access_token.clone(),
            settings.mapbox.country.clone(),
            Duration::from_secs(settings.mapbox.timeout_secs),
        )?;

        let rate_limiter = settings.rate_limit.enabled.then(|| {
            Arc::new(RateLimiter::new(
                settings.rate_limit.requests_per_window,
                Duration::from_secs(settings.rate_limit.window_secs),
                settings.rate_limit.max_tracked_clients,
            ))
        });

        Ok(Self {
            postgres: Arc::new(postgres),
            cache: Arc::new(cache),
            mapbox: Arc::new(mapbox),
            tokens: Arc::new(TokenVerifier::new(
                &settings.auth.jwt_secret,
                &settings.auth.audience,
            )),
            rate_limiter,
            trust_forwarded: settings.rate_limit.trust_forwarded,
            matcher: settings.matcher(),
            budget: settings.budget_calculator(),
            clusters: settings.cluster_builder(),
            default_limit: settings.matching.default_limit as usize,
            max_limit: settings.matching.max_limit as usize,
        })
    }
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .route("/health", web::get().to(health_check))
            .configure(matching::configure)
            .configure(budget::configure)
            .configure(map::configure),
    );
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let database = match state.postgres.health_check().await {
        Ok(ok) => ok,
        Err(e) => {
            tracing::warn!("Database health check failed: {}", e);
            false
        }
    };

    let status = if database { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(ApiResponse::new(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database,
        cache: state.cache.stats().await,
        timestamp: chrono::Utc::now(),
    }))
}
