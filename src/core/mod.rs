// Core algorithm exports
pub mod budget;
pub mod cluster;
pub mod distance;
pub mod error;
pub mod matcher;
pub mod scoring;

pub use budget::{BudgetCalculator, BudgetInput, BudgetSettings};
pub use cluster::{ClusterBuilder, ClusterSettings, MAX_ZOOM};
pub use distance::{calculate_bounding_box, haversine_distance, is_within_bounding_box};
pub use error::InputError;
pub use matcher::{ContractorSide, EventSide, Matcher, RankResult};
pub use scoring::{blend, budget_compatibility, location_compatibility, LocationMatch, LocationSettings};
