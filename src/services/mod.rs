// Service exports
pub mod cache;
pub mod mapbox;
pub mod postgres;
pub mod rate_limit;

pub use cache::{CacheError, CacheKey, CacheManager, CacheStats};
pub use mapbox::{GeocodeResult, GeocodingError, MapboxClient};
pub use postgres::{NewBudgetFeedback, PostgresClient, PostgresError};
pub use rate_limit::RateLimiter;
