use std::future::{ready, Ready};

use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::{Event, Role};
use crate::routes::AppState;
use crate::services::PostgresError;

/// Claims issued by the hosted identity provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub exp: usize,
}

/// Verifies HS256 access tokens signed with the project's JWT secret
pub struct TokenVerifier {
    key: Option<DecodingKey>,
    validation: Validation,
}

impl TokenVerifier {
    /// An empty secret yields a verifier that rejects every token
    pub fn new(secret: &str, audience: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[audience]);

        let key = (!secret.is_empty()).then(|| DecodingKey::from_secret(secret.as_bytes()));

        Self { key, validation }
    }

    pub fn verify(&self, token: &str) -> Result<Claims, ApiError> {
        let Some(key) = &self.key else {
            tracing::warn!("Rejecting token: no JWT secret configured");
            return Err(ApiError::Unauthenticated);
        };

        decode::<Claims>(token, key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("Token rejected: {}", e);
                ApiError::Unauthenticated
            })
    }
}

/// Authenticated caller, extracted from `Authorization: Bearer <token>`
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
}

impl AuthUser {
    /// Load an event the caller owns, or any event when the caller is an admin
    ///
    /// Non-owners get 403 whether or not the event exists.
    pub async fn authorize_event(&self, state: &AppState, event_id: Uuid) -> Result<Event, ApiError> {
        let event = match state.postgres.get_event(event_id).await {
            Ok(event) => Some(event),
            Err(PostgresError::NotFound(_)) => None,
            Err(e) => return Err(e.into()),
        };

        let role = match &event {
            Some(event) if event.user_id == self.user_id => None,
            _ => state.postgres.get_user_role(self.user_id).await?,
        };

        event_access(event_id, event, self.user_id, role)
    }
}

/// Require a known role from `allowed`
pub fn ensure_role(role: Option<Role>, allowed: &[Role]) -> Result<Role, ApiError> {
    let role = role.ok_or_else(|| ApiError::Forbidden("User has no role assigned".to_string()))?;

    if allowed.contains(&role) {
        Ok(role)
    } else {
        Err(ApiError::Forbidden(format!(
            "Role {:?} may not perform this action",
            role
        )))
    }
}

/// Owners pass; anyone else must be an admin before a missing event is reported
fn event_access(
    event_id: Uuid,
    event: Option<Event>,
    user_id: Uuid,
    role: Option<Role>,
) -> Result<Event, ApiError> {
    match event {
        Some(event) if event.user_id == user_id => Ok(event),
        event => {
            ensure_role(role, &[Role::Admin])?;
            event.ok_or_else(|| ApiError::NotFound(format!("Event {} not found", event_id)))
        }
    }
}

impl FromRequest for AuthUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

fn authenticate(req: &HttpRequest) -> Result<AuthUser, ApiError> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| ApiError::Internal("application state missing".to_string()))?;

    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer ").or_else(|| v.strip_prefix("bearer ")))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(ApiError::Unauthenticated)?;

    let claims = state.tokens.verify(token)?;

    Ok(AuthUser {
        user_id: claims.sub,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    #[derive(Serialize)]
    struct TestClaims {
        sub: String,
        aud: String,
        exp: usize,
        email: String,
    }

    fn token(secret: &str, aud: &str, exp: usize) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            &TestClaims {
                sub: "6f1c1f0e-6b0a-4c55-9a57-2a4b1d3f8e10".to_string(),
                aud: aud.to_string(),
                exp,
                email: "planner@example.co.nz".to_string(),
            },
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn far_future() -> usize {
        (chrono::Utc::now().timestamp() + 3600) as usize
    }

    #[test]
    fn test_valid_token() {
        let verifier = TokenVerifier::new("secret", "authenticated");
        let claims = verifier.verify(&token("secret", "authenticated", far_future())).unwrap();
        assert_eq!(claims.sub.to_string(), "6f1c1f0e-6b0a-4c55-9a57-2a4b1d3f8e10");
    }

    #[test]
    fn test_rejects_wrong_secret_audience_and_expiry() {
        let verifier = TokenVerifier::new("secret", "authenticated");
        assert!(verifier.verify(&token("other", "authenticated", far_future())).is_err());
        assert!(verifier.verify(&token("secret", "anon", far_future())).is_err());
        assert!(verifier.verify(&token("secret", "authenticated", 1_000)).is_err());
    }

    #[test]
    fn test_unconfigured_verifier_rejects_everything() {
        let verifier = TokenVerifier::new("", "authenticated");
        assert!(matches!(
            verifier.verify(&token("secret", "authenticated", far_future())),
            Err(ApiError::Unauthenticated)
        ));
    }

    fn event_owned_by(user_id: Uuid) -> Event {
        Event {
            id: Uuid::new_v4(),
            user_id,
            title: "Vineyard reception".to_string(),
            event_type: "wedding".to_string(),
            location: Some("Martinborough".to_string()),
            latitude: None,
            longitude: None,
            budget: Some(12000.0),
            attendee_count: Some(80),
            duration_hours: Some(5.0),
            required_categories: vec![],
        }
    }

    #[test]
    fn test_owner_gets_event_without_role() {
        let owner = Uuid::new_v4();
        let event = event_owned_by(owner);
        let event_id = event.id;

        let allowed = event_access(event_id, Some(event), owner, None).unwrap();
        assert_eq!(allowed.id, event_id);
    }

    #[test]
    fn test_non_owner_is_forbidden() {
        let event = event_owned_by(Uuid::new_v4());
        let event_id = event.id;

        let result = event_access(event_id, Some(event), Uuid::new_v4(), Some(Role::EventManager));
        assert!(matches!(result, Err(ApiError::Forbidden(_))));
    }

    #[test]
    fn test_missing_event_is_forbidden_for_non_admin() {
        let result = event_access(Uuid::new_v4(), None, Uuid::new_v4(), Some(Role::EventManager));
        assert!(matches!(result, Err(ApiError::Forbidden(_))));

        let result = event_access(Uuid::new_v4(), None, Uuid::new_v4(), None);
        assert!(matches!(result, Err(ApiError::Forbidden(_))));
    }

    #[test]
    fn test_admin_sees_any_event_and_missing_ones() {
        let admin = Uuid::new_v4();
        let event = event_owned_by(Uuid::new_v4());
        let event_id = event.id;

        let allowed = event_access(event_id, Some(event), admin, Some(Role::Admin)).unwrap();
        assert_eq!(allowed.id, event_id);

        let result = event_access(Uuid::new_v4(), None, admin, Some(Role::Admin));
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }

    #[test]
    fn test_ensure_role() {
        assert_eq!(ensure_role(Some(Role::Admin), &[Role::Admin]).unwrap(), Role::Admin);
        assert!(ensure_role(Some(Role::Contractor), &[Role::Admin]).is_err());
        assert!(ensure_role(None, &[Role::Admin]).is_err());
    }
}
