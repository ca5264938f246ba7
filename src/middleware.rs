use actix_web::body::MessageBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::middleware::Next;
use actix_web::{web, Error, ResponseError};

use crate::error::ApiError;
use crate::routes::AppState;

/// Reject clients that exceed the configured request rate with 429
///
/// Health checks are never limited.
pub async fn rate_limit(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let state = req.app_data::<web::Data<AppState>>().cloned();

    if let Some(state) = state {
        if let Some(limiter) = &state.rate_limiter {
            if !req.path().ends_with("/health") {
                let client = client_key(&req, state.trust_forwarded);

                if !limiter.check(&client).await {
                    tracing::warn!("Rate limit exceeded for {} on {}", client, req.path());
                    let response = ApiError::RateLimited {
                        retry_after_secs: limiter.window_secs(),
                    }
                    .error_response();
                    return Ok(req.into_response(response).map_into_right_body());
                }
            }
        }
    }

    next.call(req).await.map(ServiceResponse::map_into_left_body)
}

/// Socket peer address, or the forwarded client address behind a trusted proxy
fn client_key(req: &ServiceRequest, trust_forwarded: bool) -> String {
    if trust_forwarded {
        if let Some(addr) = req.connection_info().realip_remote_addr() {
            return addr.to_string();
        }
    }

    req.peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
