use actix_web::{web, HttpResponse};
use uuid::Uuid;
use validator::Validate;

use crate::auth::AuthUser;
use crate::core::{budget_compatibility, location_compatibility, ContractorSide, EventSide};
use crate::error::ApiError;
use crate::models::{
    ApiResponse, BudgetScoreRequest, ContractorInput, GeoPoint, LocationScoreRequest,
    PairScoreResponse, PriceRange, RankContractorsQuery, RankedContractorsResponse, ScoreRequest,
};
use crate::routes::AppState;
use crate::services::GeocodingError;

/// Upper bound on contractors loaded for one ranking
const MAX_CANDIDATES: usize = 500;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/matching/budget", web::post().to(score_budget))
        .route("/matching/location", web::post().to(score_location))
        .route("/matching/score", web::post().to(score_pair))
        .route(
            "/matching/events/{event_id}/contractors",
            web::get().to(rank_contractors),
        );
}

/// Budget compatibility from inline numbers
///
/// POST /api/v1/matching/budget
///
/// ```json
/// { "event_budget": 8000, "price_min": 5000, "price_max": 10000 }
/// ```
async fn score_budget(req: web::Json<BudgetScoreRequest>) -> Result<HttpResponse, ApiError> {
    req.validate()?;

    let range = PriceRange {
        min: req.price_min,
        max: req.price_max,
    };
    let component = budget_compatibility(req.event_budget, &range)?;

    Ok(HttpResponse::Ok().json(ApiResponse::new(component)))
}

/// Location compatibility from an inline point and service areas
///
/// POST /api/v1/matching/location
async fn score_location(
    state: web::Data<AppState>,
    req: web::Json<LocationScoreRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;

    let base = optional_point(req.contractor_latitude, req.contractor_longitude, "contractor")?;
    let result = location_compatibility(
        GeoPoint::new(req.latitude, req.longitude),
        &req.service_areas,
        base,
        state.matcher.location_settings(),
    )?;

    Ok(HttpResponse::Ok().json(ApiResponse::new(result)))
}

/// Blended score from inline event and contractor data
///
/// POST /api/v1/matching/score
///
/// Components are only scored when both sides carry their inputs; a pair with
/// nothing to compare is rejected.
async fn score_pair(
    state: web::Data<AppState>,
    req: web::Json<ScoreRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;
    let ScoreRequest { event, contractor } = req.into_inner();

    let event_side = EventSide {
        location: optional_point(event.latitude, event.longitude, "event")?,
        budget: event.budget,
    };
    let price_range = price_range(&contractor);
    let contractor_side = ContractorSide {
        service_areas: &contractor.service_areas,
        base_location: optional_point(contractor.latitude, contractor.longitude, "contractor")?,
        price_range: price_range.as_ref(),
    };

    let (score, distance_km) = state.matcher.score(event_side, contractor_side)?;

    Ok(HttpResponse::Ok().json(ApiResponse::new(PairScoreResponse { score, distance_km })))
}

/// Ranked contractors for a stored event
///
/// GET /api/v1/matching/events/{event_id}/contractors?limit=20
///
/// Only the event's owner or an admin may rank contractors for it.
async fn rank_contractors(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<Uuid>,
    query: web::Query<RankContractorsQuery>,
) -> Result<HttpResponse, ApiError> {
    query.validate()?;
    let event_id = path.into_inner();

    let mut event = user.authorize_event(&state, event_id).await?;

    if event.point().is_none() {
        if let Some(place) = event.location.as_deref().filter(|l| !l.trim().is_empty()) {
            match state.mapbox.geocode_cached(&state.cache, place, 1).await {
                Ok(results) => {
                    if let Some(best) = results.first() {
                        tracing::debug!("Geocoded event {} location '{}' to {}", event_id, place, best.place_name);
                        event.latitude = Some(best.latitude);
                        event.longitude = Some(best.longitude);
                    }
                }
                Err(GeocodingError::NotConfigured) => {
                    tracing::debug!("Geocoding not configured; ranking event {} without a location", event_id);
                }
                Err(e) => {
                    tracing::warn!("Failed to geocode event {} location '{}': {}", event_id, place, e);
                }
            }
        }
    }

    let limit = query
        .limit
        .map(usize::from)
        .unwrap_or(state.default_limit)
        .min(state.max_limit);

    tracing::info!("Ranking contractors for event {}, limit: {}", event_id, limit);

    let candidates = state
        .postgres
        .list_matchable_contractors(
            &event.required_categories,
            event.point().map(|point| state.matcher.candidate_area(point)).as_ref(),
            state.matcher.location_settings().max_service_radius_km,
            MAX_CANDIDATES,
        )
        .await?;

    let result = state.matcher.rank_contractors(&event, candidates, limit)?;

    tracing::info!(
        "Returning {} contractors for event {} (from {} candidates)",
        result.contractors.len(),
        event_id,
        result.total_candidates
    );

    Ok(HttpResponse::Ok().json(ApiResponse::new(RankedContractorsResponse {
        event_id,
        contractors: result.contractors,
        total_candidates: result.total_candidates,
    })))
}

/// Both coordinates or neither
fn optional_point(
    latitude: Option<f64>,
    longitude: Option<f64>,
    side: &str,
) -> Result<Option<GeoPoint>, ApiError> {
    match (latitude, longitude) {
        (Some(lat), Some(lon)) => Ok(Some(GeoPoint::new(lat, lon))),
        (None, None) => Ok(None),
        _ => Err(ApiError::Validation(format!(
            "{} latitude and longitude must be given together",
            side
        ))),
    }
}

/// A lone maximum is treated as a band starting at zero
fn price_range(contractor: &ContractorInput) -> Option<PriceRange> {
    match (contractor.price_min, contractor.price_max) {
        (None, None) => None,
        (min, max) => Some(PriceRange {
            min: min.unwrap_or(0.0),
            max,
        }),
    }
}
