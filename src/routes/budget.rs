use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::auth::AuthUser;
use crate::core::BudgetInput;
use crate::error::ApiError;
use crate::models::{
    ApiResponse, BudgetFeedbackRequest, BudgetRecommendationRequest, FeedbackResponse,
    ServiceCategory,
};
use crate::routes::AppState;
use crate::services::NewBudgetFeedback;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/budget/recommendation", web::post().to(recommend))
        .route("/budget/feedback", web::post().to(submit_feedback));
}

/// Budget recommendation endpoint
///
/// POST /api/v1/budget/recommendation
///
/// ```json
/// {
///   "event_type": "wedding",
///   "location": "Auckland",
///   "attendee_count": 120,
///   "duration_hours": 6,
///   "categories": ["catering", "venue"]
/// }
/// ```
async fn recommend(
    state: web::Data<AppState>,
    req: web::Json<BudgetRecommendationRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;

    let categories = parse_categories(&req.categories)?;

    let recommendation = state.budget.recommend(&BudgetInput {
        event_type: &req.event_type,
        location: req.location.as_deref(),
        attendee_count: req.attendee_count,
        duration_hours: req.duration_hours,
        categories: &categories,
    })?;

    tracing::debug!(
        "Recommended ${:.0} for {} ({} attendees, {}h)",
        recommendation.total_budget,
        req.event_type,
        req.attendee_count,
        req.duration_hours
    );

    Ok(HttpResponse::Ok().json(ApiResponse::new(recommendation)))
}

/// Record how a recommendation compared with what was actually spent
///
/// POST /api/v1/budget/feedback
async fn submit_feedback(
    state: web::Data<AppState>,
    user: AuthUser,
    req: web::Json<BudgetFeedbackRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;
    let req = req.into_inner();

    if let Some(event_id) = req.event_id {
        user.authorize_event(&state, event_id).await?;
    }

    let id = state
        .postgres
        .insert_budget_feedback(&NewBudgetFeedback {
            user_id: user.user_id,
            event_id: req.event_id,
            event_type: req.event_type,
            recommended_total: req.recommended_total,
            actual_total: req.actual_total,
            rating: req.rating,
            comments: req.comments,
        })
        .await?;

    tracing::info!("Stored budget feedback {} from user {}", id, user.user_id);

    Ok(HttpResponse::Created().json(ApiResponse::with_message(
        FeedbackResponse { id },
        "Feedback recorded",
    )))
}

fn parse_categories(raw: &[String]) -> Result<Vec<ServiceCategory>, ApiError> {
    raw.iter()
        .map(|name| {
            ServiceCategory::parse(name)
                .ok_or_else(|| ApiError::Validation(format!("Unknown service category '{}'", name)))
        })
        .collect()
}
