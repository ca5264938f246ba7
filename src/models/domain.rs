use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A WGS84 coordinate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Latitude within [-90, 90] and longitude within [-180, 180]
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Geospatial bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    /// Smallest box containing every point, `None` for an empty slice
    pub fn enclosing(points: &[GeoPoint]) -> Option<Self> {
        let first = points.first()?;
        let init = BoundingBox {
            min_lat: first.latitude,
            max_lat: first.latitude,
            min_lon: first.longitude,
            max_lon: first.longitude,
        };

        Some(points.iter().skip(1).fold(init, |bbox, p| BoundingBox {
            min_lat: bbox.min_lat.min(p.latitude),
            max_lat: bbox.max_lat.max(p.latitude),
            min_lon: bbox.min_lon.min(p.longitude),
            max_lon: bbox.max_lon.max(p.longitude),
        }))
    }
}

/// A contractor's advertised price band. `max = None` means open-ended.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    #[serde(default)]
    pub max: Option<f64>,
}

/// Region a contractor is willing to serve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServiceArea {
    Nationwide,
    Radius {
        latitude: f64,
        longitude: f64,
        radius_km: f64,
    },
    /// Exterior ring as `[longitude, latitude]` pairs (GeoJSON order)
    Polygon { coordinates: Vec<[f64; 2]> },
}

/// Paid plan level, ordered by ranking priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionTier {
    #[default]
    Essential,
    Showcase,
    Spotlight,
}

impl SubscriptionTier {
    /// Lenient parse of the database column; unknown values map to `Essential`
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "spotlight" => SubscriptionTier::Spotlight,
            "showcase" => SubscriptionTier::Showcase,
            _ => SubscriptionTier::Essential,
        }
    }
}

/// Account role stored in `users.role`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    EventManager,
    Contractor,
}

impl Role {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "event_manager" => Some(Role::EventManager),
            "contractor" => Some(Role::Contractor),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Wedding,
    Corporate,
    Birthday,
    Conference,
    Party,
    Festival,
    Other,
}

impl EventType {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "wedding" => Some(EventType::Wedding),
            "corporate" => Some(EventType::Corporate),
            "birthday" => Some(EventType::Birthday),
            "conference" => Some(EventType::Conference),
            "party" => Some(EventType::Party),
            "festival" => Some(EventType::Festival),
            "other" => Some(EventType::Other),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceCategory {
    Catering,
    Venue,
    Photography,
    Videography,
    Entertainment,
    Music,
    Decorations,
    Florist,
    AvEquipment,
    Planning,
    Transport,
}

impl ServiceCategory {
    pub const ALL: [ServiceCategory; 11] = [
        ServiceCategory::Catering,
        ServiceCategory::Venue,
        ServiceCategory::Photography,
        ServiceCategory::Videography,
        ServiceCategory::Entertainment,
        ServiceCategory::Music,
        ServiceCategory::Decorations,
        ServiceCategory::Florist,
        ServiceCategory::AvEquipment,
        ServiceCategory::Planning,
        ServiceCategory::Transport,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceCategory::Catering => "catering",
            ServiceCategory::Venue => "venue",
            ServiceCategory::Photography => "photography",
            ServiceCategory::Videography => "videography",
            ServiceCategory::Entertainment => "entertainment",
            ServiceCategory::Music => "music",
            ServiceCategory::Decorations => "decorations",
            ServiceCategory::Florist => "florist",
            ServiceCategory::AvEquipment => "av_equipment",
            ServiceCategory::Planning => "planning",
            ServiceCategory::Transport => "transport",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_lowercase().replace([' ', '-'], "_");
        ServiceCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == normalized)
    }
}

/// Event row as stored in `events`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub event_type: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub budget: Option<f64>,
    #[serde(default)]
    pub attendee_count: Option<i32>,
    #[serde(default)]
    pub duration_hours: Option<f64>,
    #[serde(default)]
    pub required_categories: Vec<String>,
}

impl Event {
    pub fn point(&self) -> Option<GeoPoint> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some(GeoPoint::new(lat, lon)),
            _ => None,
        }
    }
}

/// Business profile joined with onboarding status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contractor {
    pub id: Uuid,
    pub user_id: Uuid,
    pub company_name: String,
    #[serde(default)]
    pub subscription_tier: SubscriptionTier,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub is_approved: bool,
    #[serde(default)]
    pub service_categories: Vec<String>,
    #[serde(default)]
    pub service_areas: Vec<ServiceArea>,
    #[serde(default)]
    pub price_range: Option<PriceRange>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl Contractor {
    pub fn base_location(&self) -> Option<GeoPoint> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some(GeoPoint::new(lat, lon)),
            _ => None,
        }
    }

    /// Case-insensitive overlap with the requested categories
    pub fn offers_any(&self, categories: &[String]) -> bool {
        categories.iter().any(|wanted| {
            self.service_categories
                .iter()
                .any(|offered| offered.eq_ignore_ascii_case(wanted))
        })
    }
}

/// One scored component of a match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentScore {
    pub score: f64,
    pub weight: f64,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<ComponentScore>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<ComponentScore>,
}

/// Blended compatibility between an event and a contractor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchScore {
    pub overall_score: f64,
    pub breakdown: ScoreBreakdown,
}

/// Ranked contractor returned for an event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredContractor {
    pub contractor_id: Uuid,
    pub company_name: String,
    pub subscription_tier: SubscriptionTier,
    pub is_verified: bool,
    pub distance_km: Option<f64>,
    pub service_categories: Vec<String>,
    pub score: MatchScore,
}

/// Blend weights for the matching components
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchingWeights {
    pub location: f64,
    pub budget: f64,
}

impl Default for MatchingWeights {
    fn default() -> Self {
        Self {
            location: 0.6,
            budget: 0.4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryBudget {
    pub category: ServiceCategory,
    pub base_amount: f64,
    pub recommended_amount: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentKind {
    Location,
    AttendeeCount,
    Duration,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetAdjustment {
    pub kind: AdjustmentKind,
    /// Multiplier applied to the whole budget (for per-category scaling this is
    /// the effective ratio across the breakdown)
    pub multiplier: f64,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetRecommendation {
    pub event_type: EventType,
    pub total_budget: f64,
    pub breakdown: Vec<CategoryBudget>,
    pub adjustments: Vec<BudgetAdjustment>,
    pub confidence: f64,
}

/// A point to be placed on the map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapPin {
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl MapPin {
    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapCluster {
    pub id: String,
    pub centroid: GeoPoint,
    pub bounds: BoundingBox,
    pub member_ids: Vec<String>,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ClusterResult {
    pub zoom: u8,
    pub clusters: Vec<MapCluster>,
    pub pins: Vec<MapPin>,
}
