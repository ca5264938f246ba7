use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::domain::{MapPin, ServiceArea};

/// Budget compatibility from inline numbers
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BudgetScoreRequest {
    pub event_budget: f64,
    #[validate(range(min = 0.0))]
    pub price_min: f64,
    #[serde(default)]
    pub price_max: Option<f64>,
}

/// Location compatibility from an inline point and service areas
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LocationScoreRequest {
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
    #[serde(default)]
    #[validate(length(max = 200))]
    pub service_areas: Vec<ServiceArea>,
    #[serde(default)]
    pub contractor_latitude: Option<f64>,
    #[serde(default)]
    pub contractor_longitude: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct EventInput {
    #[serde(default)]
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    #[serde(default)]
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub budget: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ContractorInput {
    #[serde(default)]
    #[validate(length(max = 200))]
    pub service_areas: Vec<ServiceArea>,
    #[serde(default)]
    pub price_min: Option<f64>,
    #[serde(default)]
    pub price_max: Option<f64>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

/// Blended score from inline event and contractor data
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ScoreRequest {
    #[validate(nested)]
    pub event: EventInput,
    #[validate(nested)]
    pub contractor: ContractorInput,
}

/// Query string for ranking contractors against a stored event
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct RankContractorsQuery {
    #[validate(range(min = 1))]
    pub limit: Option<u16>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BudgetRecommendationRequest {
    #[validate(length(min = 1, max = 64))]
    pub event_type: String,
    #[serde(default)]
    #[validate(length(max = 128))]
    pub location: Option<String>,
    #[validate(range(min = 1, max = 100000))]
    pub attendee_count: u32,
    #[validate(range(exclusive_min = 0.0, max = 72.0))]
    pub duration_hours: f64,
    #[serde(default)]
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BudgetFeedbackRequest {
    #[serde(default)]
    pub event_id: Option<Uuid>,
    #[validate(length(min = 1, max = 64))]
    pub event_type: String,
    #[validate(range(min = 0.0))]
    pub recommended_total: f64,
    #[validate(range(min = 0.0))]
    pub actual_total: f64,
    #[validate(range(min = 1, max = 5))]
    pub rating: u8,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub comments: Option<String>,
}

/// Cluster stored contractor pins inside a viewport
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ClusterQuery {
    #[validate(range(max = 22))]
    pub zoom: u8,
    #[validate(range(min = -90.0, max = 90.0))]
    pub min_lat: f64,
    #[validate(range(min = -90.0, max = 90.0))]
    pub max_lat: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub min_lng: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub max_lng: f64,
}

/// Cluster caller-supplied points
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ClusterRequest {
    #[validate(range(max = 22))]
    pub zoom: u8,
    #[validate(length(max = 20000))]
    pub points: Vec<MapPin>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GeocodeQuery {
    #[validate(length(min = 1, max = 256))]
    pub q: String,
    #[serde(default)]
    #[validate(range(min = 1, max = 10))]
    pub limit: Option<u8>,
}
