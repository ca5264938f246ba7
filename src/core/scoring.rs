use serde::Serialize;

use crate::core::distance::{distance_to_polygon_km, haversine_between, polygon_from_ring};
use crate::core::error::InputError;
use crate::models::{
    ComponentScore, GeoPoint, MatchScore, MatchingWeights, PriceRange, ScoreBreakdown, ServiceArea,
};

/// Falloff parameters for location scoring
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationSettings {
    /// Distance outside the nearest area at which the score has decayed to 1/e
    pub decay_km: f64,
    /// Distance outside the nearest area beyond which the score is 0
    pub cutoff_km: f64,
    /// Radius assumed around a contractor's base location when no areas are declared
    pub default_service_radius_km: f64,
    /// Largest radius area resolved by its centre when pre-filtering candidates;
    /// wider areas are always kept
    pub max_service_radius_km: f64,
}

impl Default for LocationSettings {
    fn default() -> Self {
        Self {
            decay_km: 25.0,
            cutoff_km: 150.0,
            default_service_radius_km: 50.0,
            max_service_radius_km: 300.0,
        }
    }
}

/// Location component plus how far the event sits outside the nearest area
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationMatch {
    pub component: ComponentScore,
    /// `Some(0.0)` inside an area, `None` when nothing could be measured
    pub outside_km: Option<f64>,
}

/// Budget compatibility between an event budget and a contractor price band
///
/// * inside `[min, max]` → 1.0
/// * below `min` → `budget / min`
/// * above `max` → `sqrt(max / budget)`
///
/// The score never increases as the budget moves further from the band.
pub fn budget_compatibility(event_budget: f64, range: &PriceRange) -> Result<ComponentScore, InputError> {
    validate_budget(event_budget)?;
    validate_price_range(range)?;

    let (score, reason) = if event_budget < range.min {
        (
            event_budget / range.min,
            format!(
                "Budget ${:.0} is below the contractor minimum of ${:.0}",
                event_budget, range.min
            ),
        )
    } else {
        match range.max {
            Some(max) if event_budget > max => (
                (max / event_budget).sqrt(),
                format!(
                    "Budget ${:.0} exceeds the contractor maximum of ${:.0}",
                    event_budget, max
                ),
            ),
            _ => (1.0, "Budget falls within the contractor's price range".to_string()),
        }
    };

    Ok(ComponentScore {
        score: score.clamp(0.0, 1.0),
        weight: 1.0,
        reason,
    })
}

/// Location compatibility between an event and a contractor's service areas
///
/// Inside any area the score is 1.0. Outside, the score decays exponentially
/// with the distance to the nearest area edge and reaches 0 at the cutoff.
pub fn location_compatibility(
    event: GeoPoint,
    areas: &[ServiceArea],
    base_location: Option<GeoPoint>,
    settings: &LocationSettings,
) -> Result<LocationMatch, InputError> {
    validate_point(event)?;

    let fallback;
    let areas = if areas.is_empty() {
        match base_location {
            Some(base) => {
                validate_point(base)?;
                fallback = [ServiceArea::Radius {
                    latitude: base.latitude,
                    longitude: base.longitude,
                    radius_km: settings.default_service_radius_km,
                }];
                &fallback[..]
            }
            None => {
                return Ok(LocationMatch {
                    component: ComponentScore {
                        score: 0.0,
                        weight: 1.0,
                        reason: "Contractor has not declared a service area".to_string(),
                    },
                    outside_km: None,
                });
            }
        }
    } else {
        areas
    };

    let mut nearest = f64::INFINITY;
    for area in areas {
        nearest = nearest.min(distance_outside_area(event, area)?);
        if nearest == 0.0 {
            break;
        }
    }

    let (score, reason) = if nearest <= 0.0 {
        (1.0, "Event is inside the contractor's service area".to_string())
    } else if nearest >= settings.cutoff_km {
        (
            0.0,
            format!("Event is {:.1} km outside the contractor's service area", nearest),
        )
    } else {
        (
            (-nearest / settings.decay_km).exp(),
            format!("Event is {:.1} km outside the contractor's service area", nearest),
        )
    };

    Ok(LocationMatch {
        component: ComponentScore {
            score: score.clamp(0.0, 1.0),
            weight: 1.0,
            reason,
        },
        outside_km: Some(nearest.max(0.0)),
    })
}

/// Weighted mean over the components that are present
///
/// Weights are renormalized over the present components, so a missing budget
/// does not drag the overall score down.
pub fn blend(
    location: Option<ComponentScore>,
    budget: Option<ComponentScore>,
    weights: &MatchingWeights,
) -> Result<MatchScore, InputError> {
    if location.is_none() && budget.is_none() {
        return Err(InputError::MissingInput(
            "at least one of location or budget is required".to_string(),
        ));
    }

    let raw_location = location.as_ref().map(|_| weights.location.max(0.0)).unwrap_or(0.0);
    let raw_budget = budget.as_ref().map(|_| weights.budget.max(0.0)).unwrap_or(0.0);
    let present = location.is_some() as u8 + budget.is_some() as u8;
    let total = raw_location + raw_budget;

    // Equal weights when every configured weight for the present components is zero
    let (w_location, w_budget) = if total > 0.0 {
        (raw_location / total, raw_budget / total)
    } else {
        let equal = 1.0 / present as f64;
        (
            if location.is_some() { equal } else { 0.0 },
            if budget.is_some() { equal } else { 0.0 },
        )
    };

    let location = location.map(|c| ComponentScore { weight: w_location, ..c });
    let budget = budget.map(|c| ComponentScore { weight: w_budget, ..c });

    let overall = location.as_ref().map(|c| c.score * c.weight).unwrap_or(0.0)
        + budget.as_ref().map(|c| c.score * c.weight).unwrap_or(0.0);

    Ok(MatchScore {
        overall_score: overall.clamp(0.0, 1.0),
        breakdown: ScoreBreakdown { location, budget },
    })
}

/// Distance in km from the point to the area's edge, 0 when inside
fn distance_outside_area(point: GeoPoint, area: &ServiceArea) -> Result<f64, InputError> {
    match area {
        ServiceArea::Nationwide => Ok(0.0),
        ServiceArea::Radius {
            latitude,
            longitude,
            radius_km,
        } => {
            let center = GeoPoint::new(*latitude, *longitude);
            validate_point(center)?;
            if !radius_km.is_finite() || *radius_km < 0.0 {
                return Err(InputError::InvalidServiceArea(format!(
                    "radius must be a non-negative number of km, got {}",
                    radius_km
                )));
            }
            Ok((haversine_between(point, center) - radius_km).max(0.0))
        }
        ServiceArea::Polygon { coordinates } => {
            if coordinates.len() < 3 {
                return Err(InputError::InvalidServiceArea(format!(
                    "polygon needs at least 3 vertices, got {}",
                    coordinates.len()
                )));
            }
            for [lng, lat] in coordinates {
                validate_point(GeoPoint::new(*lat, *lng))?;
            }
            Ok(distance_to_polygon_km(point, &polygon_from_ring(coordinates)))
        }
    }
}

pub(crate) fn validate_point(point: GeoPoint) -> Result<(), InputError> {
    if point.is_valid() {
        Ok(())
    } else {
        Err(InputError::InvalidCoordinates {
            latitude: point.latitude,
            longitude: point.longitude,
        })
    }
}

pub(crate) fn validate_budget(budget: f64) -> Result<(), InputError> {
    if budget.is_finite() && budget > 0.0 {
        Ok(())
    } else {
        Err(InputError::InvalidBudget(format!(
            "event budget must be a positive amount, got {}",
            budget
        )))
    }
}

fn validate_price_range(range: &PriceRange) -> Result<(), InputError> {
    if !range.min.is_finite() || range.min < 0.0 {
        return Err(InputError::InvalidPriceRange(format!(
            "minimum must be a non-negative amount, got {}",
            range.min
        )));
    }
    if let Some(max) = range.max {
        if !max.is_finite() || max < range.min {
            return Err(InputError::InvalidPriceRange(format!(
                "maximum {} is below minimum {}",
                max, range.min
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn band(min: f64, max: f64) -> PriceRange {
        PriceRange { min, max: Some(max) }
    }

    #[test]
    fn test_budget_inside_range_is_perfect() {
        let score = budget_compatibility(8000.0, &band(5000.0, 10000.0)).unwrap();
        assert_eq!(score.score, 1.0);

        // Bounds are inclusive
        assert_eq!(budget_compatibility(5000.0, &band(5000.0, 10000.0)).unwrap().score, 1.0);
        assert_eq!(budget_compatibility(10000.0, &band(5000.0, 10000.0)).unwrap().score, 1.0);
    }

    #[test]
    fn test_budget_below_range_is_partial() {
        let score = budget_compatibility(2000.0, &band(5000.0, 10000.0)).unwrap();
        assert!(score.score > 0.0 && score.score < 1.0);
        assert!((score.score - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_budget_above_range_decays_gently() {
        let score = budget_compatibility(40000.0, &band(5000.0, 10000.0)).unwrap();
        assert!((score.score - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_budget_open_ended_range() {
        let range = PriceRange { min: 1000.0, max: None };
        assert_eq!(budget_compatibility(1_000_000.0, &range).unwrap().score, 1.0);
    }

    #[test]
    fn test_budget_rejects_bad_input() {
        assert!(matches!(
            budget_compatibility(0.0, &band(1.0, 2.0)),
            Err(InputError::InvalidBudget(_))
        ));
        assert!(matches!(
            budget_compatibility(100.0, &band(500.0, 200.0)),
            Err(InputError::InvalidPriceRange(_))
        ));
        assert!(matches!(
            budget_compatibility(f64::NAN, &band(1.0, 2.0)),
            Err(InputError::InvalidBudget(_))
        ));
    }

    #[test]
    fn test_location_inside_radius() {
        let areas = vec![ServiceArea::Radius {
            latitude: -36.8485,
            longitude: 174.7633,
            radius_km: 30.0,
        }];
        let m = location_compatibility(
            GeoPoint::new(-36.90, 174.80),
            &areas,
            None,
            &LocationSettings::default(),
        )
        .unwrap();
        assert_eq!(m.component.score, 1.0);
        assert_eq!(m.outside_km, Some(0.0));
    }

    #[test]
    fn test_location_outside_decays() {
        let areas = vec![ServiceArea::Radius {
            latitude: -36.8485,
            longitude: 174.7633,
            radius_km: 10.0,
        }];
        let settings = LocationSettings::default();
        let near = location_compatibility(GeoPoint::new(-37.0, 174.7633), &areas, None, &settings).unwrap();
        let far = location_compatibility(GeoPoint::new(-37.5, 174.7633), &areas, None, &settings).unwrap();

        assert!(near.component.score < 1.0 && near.component.score > 0.0);
        assert!(far.component.score < near.component.score);
    }

    #[test]
    fn test_location_beyond_cutoff_is_zero() {
        let areas = vec![ServiceArea::Radius {
            latitude: -36.8485,
            longitude: 174.7633,
            radius_km: 10.0,
        }];
        // Auckland area vs Christchurch event
        let m = location_compatibility(
            GeoPoint::new(-43.5321, 172.6362),
            &areas,
            None,
            &LocationSettings::default(),
        )
        .unwrap();
        assert_eq!(m.component.score, 0.0);
    }

    #[test]
    fn test_location_nationwide() {
        let m = location_compatibility(
            GeoPoint::new(-45.8788, 170.5028),
            &[ServiceArea::Nationwide],
            None,
            &LocationSettings::default(),
        )
        .unwrap();
        assert_eq!(m.component.score, 1.0);
    }

    #[test]
    fn test_location_falls_back_to_base_location() {
        let settings = LocationSettings::default();
        let base = Some(GeoPoint::new(-41.2865, 174.7762));
        let inside = location_compatibility(GeoPoint::new(-41.30, 174.78), &[], base, &settings).unwrap();
        assert_eq!(inside.component.score, 1.0);

        let none = location_compatibility(GeoPoint::new(-41.30, 174.78), &[], None, &settings).unwrap();
        assert_eq!(none.component.score, 0.0);
        assert_eq!(none.outside_km, None);
    }

    #[test]
    fn test_location_rejects_degenerate_polygon() {
        let areas = vec![ServiceArea::Polygon {
            coordinates: vec![[174.0, -36.0], [175.0, -36.0]],
        }];
        let result = location_compatibility(
            GeoPoint::new(-36.5, 174.5),
            &areas,
            None,
            &LocationSettings::default(),
        );
        assert!(matches!(result, Err(InputError::InvalidServiceArea(_))));
    }

    #[test]
    fn test_blend_renormalizes_weights() {
        let location = ComponentScore { score: 1.0, weight: 1.0, reason: String::new() };
        let score = blend(Some(location), None, &MatchingWeights::default()).unwrap();
        assert_eq!(score.overall_score, 1.0);
        assert_eq!(score.breakdown.location.unwrap().weight, 1.0);
    }

    #[test]
    fn test_blend_weighted_mean() {
        let location = ComponentScore { score: 1.0, weight: 1.0, reason: String::new() };
        let budget = ComponentScore { score: 0.5, weight: 1.0, reason: String::new() };
        let score = blend(Some(location), Some(budget), &MatchingWeights::default()).unwrap();
        assert!((score.overall_score - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_blend_requires_a_component() {
        assert!(matches!(
            blend(None, None, &MatchingWeights::default()),
            Err(InputError::MissingInput(_))
        ));
    }
}
