use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::domain::{MatchScore, ScoredContractor};
use crate::services::CacheStats;

/// Success envelope: `{ "data": ..., "message"?: ... }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub data: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data, message: None }
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            data,
            message: Some(message.into()),
        }
    }
}

/// Error envelope: `{ "error": ..., "message": ... }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: bool,
    pub cache: CacheStats,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedContractorsResponse {
    pub event_id: Uuid,
    pub contractors: Vec<ScoredContractor>,
    pub total_candidates: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackResponse {
    pub id: Uuid,
}

/// Blended score for an inline event/contractor pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairScoreResponse {
    #[serde(flatten)]
    pub score: MatchScore,
    pub distance_km: Option<f64>,
}
