// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    AdjustmentKind, BoundingBox, BudgetAdjustment, BudgetRecommendation, CategoryBudget,
    ClusterResult, ComponentScore, Contractor, Event, EventType, GeoPoint, MapCluster, MapPin,
    MatchScore, MatchingWeights, PriceRange, Role, ScoreBreakdown, ScoredContractor, ServiceArea,
    ServiceCategory, SubscriptionTier,
};
pub use requests::{
    BudgetFeedbackRequest, BudgetRecommendationRequest, BudgetScoreRequest, ClusterQuery,
    ClusterRequest, ContractorInput, EventInput, GeocodeQuery, LocationScoreRequest,
    RankContractorsQuery, ScoreRequest,
};
pub use responses::{
    ApiResponse, ErrorResponse, FeedbackResponse, HealthResponse, PairScoreResponse,
    RankedContractorsResponse,
};
