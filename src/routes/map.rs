use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::error::ApiError;
use crate::models::{ApiResponse, BoundingBox, ClusterQuery, ClusterRequest, GeocodeQuery};
use crate::routes::AppState;

/// Upper bound on stored pins clustered for one viewport
const MAX_VIEWPORT_PINS: usize = 5_000;

const DEFAULT_GEOCODE_LIMIT: u8 = 5;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/map/clusters", web::get().to(cluster_viewport))
        .route("/map/clusters", web::post().to(cluster_points))
        .route("/geocode", web::get().to(geocode));
}

/// Cluster approved contractor pins inside a viewport
///
/// GET /api/v1/map/clusters?zoom=6&min_lat=-47.5&max_lat=-34&min_lng=166&max_lng=179
async fn cluster_viewport(
    state: web::Data<AppState>,
    query: web::Query<ClusterQuery>,
) -> Result<HttpResponse, ApiError> {
    query.validate()?;

    if query.min_lat > query.max_lat || query.min_lng > query.max_lng {
        return Err(ApiError::Validation(
            "Viewport minimums must not exceed maximums".to_string(),
        ));
    }

    let bbox = BoundingBox {
        min_lat: query.min_lat,
        max_lat: query.max_lat,
        min_lon: query.min_lng,
        max_lon: query.max_lng,
    };

    let pins = state
        .postgres
        .contractor_pins_in_bbox(&bbox, MAX_VIEWPORT_PINS)
        .await?;

    if pins.len() == MAX_VIEWPORT_PINS {
        tracing::warn!("Viewport pin cap of {} reached at zoom {}", MAX_VIEWPORT_PINS, query.zoom);
    }

    let result = state.clusters.build(pins, query.zoom)?;

    Ok(HttpResponse::Ok().json(ApiResponse::new(result)))
}

/// Cluster caller-supplied points
///
/// POST /api/v1/map/clusters
///
/// ```json
/// { "zoom": 10, "points": [{ "id": "a", "latitude": -36.85, "longitude": 174.76 }] }
/// ```
async fn cluster_points(
    state: web::Data<AppState>,
    req: web::Json<ClusterRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;
    let ClusterRequest { zoom, points } = req.into_inner();

    let result = state.clusters.build(points, zoom)?;

    Ok(HttpResponse::Ok().json(ApiResponse::new(result)))
}

/// Forward-geocode a place name
///
/// GET /api/v1/geocode?q=Queenstown&limit=3
async fn geocode(
    state: web::Data<AppState>,
    query: web::Query<GeocodeQuery>,
) -> Result<HttpResponse, ApiError> {
    query.validate()?;

    let limit = query.limit.unwrap_or(DEFAULT_GEOCODE_LIMIT);
    let results = state
        .mapbox
        .geocode_cached(&state.cache, &query.q, limit)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::new(results)))
}
