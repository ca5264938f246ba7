use thiserror::Error;

/// Rejected input to one of the scoring helpers
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("Invalid budget: {0}")]
    InvalidBudget(String),

    #[error("Invalid price range: {0}")]
    InvalidPriceRange(String),

    #[error("Invalid coordinates: latitude {latitude}, longitude {longitude}")]
    InvalidCoordinates { latitude: f64, longitude: f64 },

    #[error("Invalid service area: {0}")]
    InvalidServiceArea(String),

    #[error("Missing input: {0}")]
    MissingInput(String),

    #[error("Zoom level {0} is outside 0..=22")]
    InvalidZoom(u8),

    #[error("Invalid event details: {0}")]
    InvalidEventDetails(String),
}
