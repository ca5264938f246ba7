use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::services::cache::{CacheError, CacheKey, CacheManager};

/// Errors that can occur when calling the Mapbox geocoding API
#[derive(Debug, Error)]
pub enum GeocodingError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Unauthorized: invalid Mapbox access token")]
    Unauthorized,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Geocoding is not configured")]
    NotConfigured,
}

/// A forward-geocoding candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResult {
    pub place_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub relevance: f64,
}

/// Mapbox geocoding API client
pub struct MapboxClient {
    base_url: String,
    access_token: String,
    country: Option<String>,
    client: Client,
}

impl MapboxClient {
    pub fn new(
        base_url: String,
        access_token: String,
        country: Option<String>,
        timeout: Duration,
    ) -> Result<Self, GeocodingError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url,
            access_token,
            country,
            client,
        })
    }

    pub fn is_configured(&self) -> bool {
        !self.access_token.is_empty()
    }

    /// Forward-geocode a free-text place, best candidates first
    pub async fn geocode(&self, query: &str, limit: u8) -> Result<Vec<GeocodeResult>, GeocodingError> {
        if !self.is_configured() {
            return Err(GeocodingError::NotConfigured);
        }

        let mut url = format!(
            "{}/geocoding/v5/mapbox.places/{}.json?access_token={}&limit={}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(query.trim()),
            urlencoding::encode(&self.access_token),
            limit
        );
        if let Some(country) = &self.country {
            url.push_str(&format!("&country={}", urlencoding::encode(country)));
        }

        tracing::debug!("Geocoding '{}'", query);

        let response = self.client.get(&url).send().await?;

        match response.status() {
            s if s.is_success() => {}
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => return Err(GeocodingError::Unauthorized),
            s => {
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unable to read body".to_string());
                tracing::error!("Mapbox geocoding failed: {} - {}", s, body);
                return Err(GeocodingError::ApiError(format!("Geocoding failed: {}", s)));
            }
        }

        let json: Value = response.json().await?;

        let features = json
            .get("features")
            .and_then(|f| f.as_array())
            .ok_or_else(|| GeocodingError::InvalidResponse("Missing features array".into()))?;

        let results = features
            .iter()
            .filter_map(|feature| {
                let center = feature.get("center")?.as_array()?;
                let longitude = center.first()?.as_f64()?;
                let latitude = center.get(1)?.as_f64()?;
                Some(GeocodeResult {
                    place_name: feature
                        .get("place_name")
                        .and_then(|p| p.as_str())
                        .unwrap_or_default()
                        .to_string(),
                    latitude,
                    longitude,
                    relevance: feature.get("relevance").and_then(|r| r.as_f64()).unwrap_or(0.0),
                })
            })
            .collect();

        Ok(results)
    }

    /// Geocode through the cache; cache failures degrade to a live lookup
    pub async fn geocode_cached(
        &self,
        cache: &CacheManager,
        query: &str,
        limit: u8,
    ) -> Result<Vec<GeocodeResult>, GeocodingError> {
        let key = CacheKey::geocode(query, limit);

        match cache.get::<Vec<GeocodeResult>>(&key).await {
            Ok(results) => return Ok(results),
            Err(CacheError::CacheMiss(_)) => {}
            Err(CacheError::SerializationError(e)) => {
                tracing::warn!("Evicting undecodable geocode cache entry {}: {}", key, e);
                if let Err(e) = cache.delete(&key).await {
                    tracing::warn!("Geocode cache eviction failed for {}: {}", key, e);
                }
            }
            Err(e) => tracing::warn!("Geocode cache read failed for {}: {}", key, e),
        }

        let results = self.geocode(query, limit).await?;

        if let Err(e) = cache.set(&key, &results).await {
            tracing::warn!("Geocode cache write failed for {}: {}", key, e);
        }

        Ok(results)
    }
}
