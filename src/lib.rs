//! EventPros matching - scoring helpers for the EventPros marketplace
//!
//! The `core` module holds three stateless helpers: the event/contractor
//! matching scorer, the budget calculator and the map cluster builder. The
//! remaining modules expose them as a JSON service backed by the hosted
//! Postgres database.

pub mod auth;
pub mod config;
pub mod core;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{
    budget_compatibility, haversine_distance, location_compatibility, BudgetCalculator,
    ClusterBuilder, Matcher,
};
pub use error::ApiError;
pub use models::{BudgetRecommendation, ClusterResult, MatchScore, ScoredContractor};
pub use routes::{configure_routes, AppState};
