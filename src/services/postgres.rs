use serde::{Deserialize, Serialize};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    BoundingBox, Contractor, Event, MapPin, PriceRange, Role, ServiceArea, SubscriptionTier,
};

/// Errors that can occur when interacting with PostgreSQL
#[derive(Debug, Error)]
pub enum PostgresError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),
}

/// Budget feedback row to insert
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBudgetFeedback {
    pub user_id: Uuid,
    pub event_id: Option<Uuid>,
    pub event_type: String,
    pub recommended_total: f64,
    pub actual_total: f64,
    pub rating: u8,
    pub comments: Option<String>,
}

/// Read access to the marketplace tables plus the feedback write
///
/// The schema is owned by the hosted database; numeric columns are cast to
/// float8 in SQL so the service does not depend on their exact declared type.
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Create a new PostgreSQL client from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, PostgresError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Create a new PostgreSQL client from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, PostgresError> {
        tracing::info!("Connecting to PostgreSQL");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            Duration::from_secs(acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }

    /// Pool that connects on first use
    pub fn connect_lazy(database_url: &str) -> Result<Self, PostgresError> {
        let pool = PgPoolOptions::new()
            .acquire_timeout(Duration::from_secs(2))
            .connect_lazy(database_url)?;
        Ok(Self { pool })
    }

    pub async fn get_event(&self, event_id: Uuid) -> Result<Event, PostgresError> {
        let query = r#"
            SELECT id, user_id, title, event_type, location,
                   latitude::float8 AS latitude,
                   longitude::float8 AS longitude,
                   budget::float8 AS budget,
                   attendee_count::int4 AS attendee_count,
                   duration_hours::float8 AS duration_hours,
                   COALESCE(required_categories, '{}') AS required_categories
            FROM events
            WHERE id = $1
        "#;

        let row = sqlx::query(query)
            .bind(event_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| PostgresError::NotFound(format!("Event {} not found", event_id)))?;

        Ok(Event {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            title: row.try_get("title")?,
            event_type: row.try_get("event_type")?,
            location: row.try_get("location")?,
            latitude: row.try_get("latitude")?,
            longitude: row.try_get("longitude")?,
            budget: row.try_get("budget")?,
            attendee_count: row.try_get("attendee_count")?,
            duration_hours: row.try_get("duration_hours")?,
            required_categories: row.try_get("required_categories")?,
        })
    }

    /// Approved contractors, optionally restricted to those offering any of
    /// `categories` (case-insensitive) and to those able to reach `area`
    ///
    /// A radius area narrower than `max_radius_km` reaches `area` only when its
    /// centre lies inside it. Nationwide, polygon and wider areas always pass,
    /// as do contractors without any location data.
    pub async fn list_matchable_contractors(
        &self,
        categories: &[String],
        area: Option<&BoundingBox>,
        max_radius_km: f64,
        limit: usize,
    ) -> Result<Vec<Contractor>, PostgresError> {
        let query = r#"
            SELECT bp.id, bp.user_id, bp.company_name, bp.subscription_tier, bp.is_verified,
                   COALESCE(os.admin_approved, false) AS is_approved,
                   COALESCE(bp.service_categories, '{}') AS service_categories,
                   bp.service_areas,
                   bp.price_range_min::float8 AS price_range_min,
                   bp.price_range_max::float8 AS price_range_max,
                   bp.latitude::float8 AS latitude,
                   bp.longitude::float8 AS longitude
            FROM business_profiles bp
            JOIN contractor_onboarding_status os ON os.user_id = bp.user_id
            WHERE os.admin_approved = true
              AND (
                  cardinality($1::text[]) = 0
                  OR EXISTS (
                      SELECT 1 FROM unnest(bp.service_categories) AS offered
                      WHERE lower(offered) = ANY($1::text[])
                  )
              )
              AND (
                  $2::float8 IS NULL
                  OR EXISTS (
                      SELECT 1
                      FROM jsonb_array_elements(
                          CASE WHEN jsonb_typeof(bp.service_areas) = 'array'
                               THEN bp.service_areas ELSE '[]'::jsonb END
                      ) AS area
                      WHERE area->>'type' IS DISTINCT FROM 'radius'
                         OR CASE
                              WHEN jsonb_typeof(area->'radius_km') = 'number'
                               AND jsonb_typeof(area->'latitude') = 'number'
                               AND jsonb_typeof(area->'longitude') = 'number'
                              THEN (area->>'radius_km')::float8 >= $6::float8
                                   OR ((area->>'latitude')::float8 BETWEEN $2::float8 AND $3::float8
                                       AND (area->>'longitude')::float8 BETWEEN $4::float8 AND $5::float8)
                              ELSE true
                            END
                  )
                  OR (
                      COALESCE(jsonb_array_length(
                          CASE WHEN jsonb_typeof(bp.service_areas) = 'array'
                               THEN bp.service_areas END
                      ), 0) = 0
                      AND (
                          bp.latitude IS NULL
                          OR bp.longitude IS NULL
                          OR (bp.latitude::float8 BETWEEN $2::float8 AND $3::float8
                              AND bp.longitude::float8 BETWEEN $4::float8 AND $5::float8)
                      )
                  )
              )
            ORDER BY bp.id
            LIMIT $7
        "#;

        let rows = sqlx::query(query)
            .bind(normalized_categories(categories))
            .bind(area.map(|a| a.min_lat))
            .bind(area.map(|a| a.max_lat))
            .bind(area.map(|a| a.min_lon))
            .bind(area.map(|a| a.max_lon))
            .bind(max_radius_km)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;

        let contractors = rows
            .iter()
            .map(contractor_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!("Loaded {} matchable contractors", contractors.len());

        Ok(contractors)
    }

    /// Approved contractor locations inside a viewport
    pub async fn contractor_pins_in_bbox(
        &self,
        bbox: &BoundingBox,
        limit: usize,
    ) -> Result<Vec<MapPin>, PostgresError> {
        let query = r#"
            SELECT bp.id, bp.company_name,
                   bp.latitude::float8 AS latitude,
                   bp.longitude::float8 AS longitude
            FROM business_profiles bp
            JOIN contractor_onboarding_status os ON os.user_id = bp.user_id
            WHERE os.admin_approved = true
              AND bp.latitude::float8 BETWEEN $1::float8 AND $2::float8
              AND bp.longitude::float8 BETWEEN $3::float8 AND $4::float8
            ORDER BY bp.id
            LIMIT $5
        "#;

        let rows = sqlx::query(query)
            .bind(bbox.min_lat)
            .bind(bbox.max_lat)
            .bind(bbox.min_lon)
            .bind(bbox.max_lon)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| -> Result<MapPin, PostgresError> {
                let id: Uuid = row.try_get("id")?;
                Ok(MapPin {
                    id: id.to_string(),
                    latitude: row.try_get("latitude")?,
                    longitude: row.try_get("longitude")?,
                    label: row.try_get("company_name")?,
                })
            })
            .collect()
    }

    /// Role recorded for a user, `None` for unknown users or roles
    pub async fn get_user_role(&self, user_id: Uuid) -> Result<Option<Role>, PostgresError> {
        let role: Option<Option<String>> = sqlx::query_scalar("SELECT role FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(role.flatten().as_deref().and_then(Role::parse))
    }

    /// Store budget feedback; one entry per user and event
    pub async fn insert_budget_feedback(
        &self,
        feedback: &NewBudgetFeedback,
    ) -> Result<Uuid, PostgresError> {
        let query = r#"
            INSERT INTO budget_feedback
                (id, user_id, event_id, event_type, recommended_total, actual_total, rating, comments, created_at)
            VALUES ($1, $2, $3, $4, $5::float8, $6::float8, $7::int2, $8, NOW())
        "#;

        let id = Uuid::new_v4();

        let result = sqlx::query(query)
            .bind(id)
            .bind(feedback.user_id)
            .bind(feedback.event_id)
            .bind(&feedback.event_type)
            .bind(feedback.recommended_total)
            .bind(feedback.actual_total)
            .bind(feedback.rating as i16)
            .bind(&feedback.comments)
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => {
                tracing::debug!("Recorded budget feedback {} from {}", id, feedback.user_id);
                Ok(id)
            }
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => Err(PostgresError::Conflict(
                "Feedback for this event has already been submitted".to_string(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, PostgresError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

fn contractor_from_row(row: &PgRow) -> Result<Contractor, PostgresError> {
    let id: Uuid = row.try_get("id")?;
    let tier: Option<String> = row.try_get("subscription_tier")?;
    let areas: Option<Json<serde_json::Value>> = row.try_get("service_areas")?;
    let price_min: Option<f64> = row.try_get("price_range_min")?;
    let price_max: Option<f64> = row.try_get("price_range_max")?;

    Ok(Contractor {
        id,
        user_id: row.try_get("user_id")?,
        company_name: row.try_get("company_name")?,
        subscription_tier: tier.as_deref().map(SubscriptionTier::parse).unwrap_or_default(),
        is_verified: row.try_get::<Option<bool>, _>("is_verified")?.unwrap_or(false),
        is_approved: row.try_get("is_approved")?,
        service_categories: row.try_get("service_categories")?,
        service_areas: areas.map(|Json(v)| parse_service_areas(id, v)).unwrap_or_default(),
        price_range: price_min.map(|min| PriceRange { min, max: price_max }),
        latitude: row.try_get("latitude")?,
        longitude: row.try_get("longitude")?,
    })
}

/// Trimmed, lowercased, non-empty category names
fn normalized_categories(categories: &[String]) -> Vec<String> {
    categories
        .iter()
        .map(|c| c.trim().to_lowercase())
        .filter(|c| !c.is_empty())
        .collect()
}

/// Lenient decode: malformed entries are dropped rather than failing the row
fn parse_service_areas(contractor_id: Uuid, value: serde_json::Value) -> Vec<ServiceArea> {
    let serde_json::Value::Array(items) = value else {
        tracing::warn!("Contractor {} has non-array service_areas", contractor_id);
        return Vec::new();
    };

    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<ServiceArea>(item) {
            Ok(area) => Some(area),
            Err(e) => {
                tracing::warn!("Ignoring malformed service area for {}: {}", contractor_id, e);
                None
            }
        })
        .collect()
}
