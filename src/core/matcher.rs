use std::cmp::Ordering;

use crate::core::distance::{calculate_bounding_box, haversine_between, is_within_bounding_box};
use crate::core::error::InputError;
use crate::core::scoring::{
    blend, budget_compatibility, location_compatibility, validate_budget, validate_point,
    LocationSettings,
};
use crate::models::{
    BoundingBox, Contractor, Event, GeoPoint, MatchScore, MatchingWeights, PriceRange, ScoredContractor,
    ServiceArea,
};

/// Result of ranking contractors for an event
#[derive(Debug)]
pub struct RankResult {
    pub contractors: Vec<ScoredContractor>,
    pub total_candidates: usize,
}

/// Contractor-side inputs to a single score
#[derive(Debug, Clone, Copy)]
pub struct ContractorSide<'a> {
    pub service_areas: &'a [ServiceArea],
    pub base_location: Option<GeoPoint>,
    pub price_range: Option<&'a PriceRange>,
}

/// Event-side inputs to a single score
#[derive(Debug, Clone, Copy)]
pub struct EventSide {
    pub location: Option<GeoPoint>,
    pub budget: Option<f64>,
}

/// Scores events against contractors and ranks candidates
///
/// # Ranking stages
/// 1. Drop contractors without admin approval
/// 2. Drop contractors outside the event's required categories
/// 3. Drop contractors whose service areas cannot reach the event
/// 4. Score, dropping anything under the minimum score
/// 5. Sort by score, tier, verification and distance
#[derive(Debug, Clone)]
pub struct Matcher {
    weights: MatchingWeights,
    location: LocationSettings,
    min_score: f64,
}

impl Matcher {
    pub fn new(weights: MatchingWeights, location: LocationSettings, min_score: f64) -> Self {
        Self {
            weights,
            location,
            min_score,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(MatchingWeights::default(), LocationSettings::default(), 0.1)
    }

    pub fn weights(&self) -> &MatchingWeights {
        &self.weights
    }

    pub fn location_settings(&self) -> &LocationSettings {
        &self.location
    }

    /// Box around an event outside which no contractor can score on location
    ///
    /// Sized `cutoff_km + max_service_radius_km`, so a radius area no wider
    /// than the maximum must have its centre inside it.
    pub fn candidate_area(&self, point: GeoPoint) -> BoundingBox {
        calculate_bounding_box(
            point.latitude,
            point.longitude,
            self.location.cutoff_km + self.location.max_service_radius_km,
        )
    }

    /// Whether a contractor could serve an event located in `area`
    ///
    /// Contractors without any location data are kept and scored on budget.
    pub fn can_reach(&self, contractor: &Contractor, area: &BoundingBox) -> bool {
        if contractor.service_areas.is_empty() {
            return match contractor.base_location() {
                Some(base) => is_within_bounding_box(base.latitude, base.longitude, area),
                None => true,
            };
        }

        contractor.service_areas.iter().any(|service_area| match service_area {
            ServiceArea::Nationwide | ServiceArea::Polygon { .. } => true,
            ServiceArea::Radius {
                latitude,
                longitude,
                radius_km,
            } => {
                *radius_km >= self.location.max_service_radius_km
                    || is_within_bounding_box(*latitude, *longitude, area)
            }
        })
    }

    /// Blend whichever components both sides provide inputs for
    ///
    /// Returns the score and the distance to the contractor's base location
    /// (falling back to the distance outside its service area).
    pub fn score(
        &self,
        event: EventSide,
        contractor: ContractorSide<'_>,
    ) -> Result<(MatchScore, Option<f64>), InputError> {
        let location = match event.location {
            Some(point) if !contractor.service_areas.is_empty() || contractor.base_location.is_some() => {
                Some(location_compatibility(
                    point,
                    contractor.service_areas,
                    contractor.base_location,
                    &self.location,
                )?)
            }
            _ => None,
        };

        let budget = match (event.budget, contractor.price_range) {
            (Some(amount), Some(range)) => Some(budget_compatibility(amount, range)?),
            _ => None,
        };

        let distance_km = match (event.location, contractor.base_location) {
            (Some(a), Some(b)) => Some(haversine_between(a, b)),
            _ => location.as_ref().and_then(|m| m.outside_km),
        };

        let score = blend(location.map(|m| m.component), budget, &self.weights)?;
        Ok((score, distance_km))
    }

    /// Rank candidate contractors for a stored event
    pub fn rank_contractors(
        &self,
        event: &Event,
        candidates: Vec<Contractor>,
        limit: usize,
    ) -> Result<RankResult, InputError> {
        // A stored budget of zero means the organizer left it unset
        let event_side = EventSide {
            location: event.point(),
            budget: event.budget.filter(|amount| *amount > 0.0),
        };

        if let Some(point) = event_side.location {
            validate_point(point)?;
        }
        if let Some(budget) = event_side.budget {
            validate_budget(budget)?;
        }
        if event_side.location.is_none() && event_side.budget.is_none() {
            return Err(InputError::MissingInput(
                "event has neither a location nor a budget".to_string(),
            ));
        }

        let total_candidates = candidates.len();
        let area = event_side.location.map(|point| self.candidate_area(point));

        let mut ranked: Vec<ScoredContractor> = candidates
            .into_iter()
            .filter(|c| c.is_approved)
            .filter(|c| event.required_categories.is_empty() || c.offers_any(&event.required_categories))
            .filter(|c| area.as_ref().map_or(true, |area| self.can_reach(c, area)))
            .filter_map(|c| {
                let side = ContractorSide {
                    service_areas: &c.service_areas,
                    base_location: c.base_location(),
                    price_range: c.price_range.as_ref(),
                };

                let (score, distance_km) = match self.score(event_side, side) {
                    Ok(scored) => scored,
                    Err(InputError::MissingInput(_)) => return None,
                    Err(e) => {
                        tracing::debug!("Skipping contractor {} with unusable profile: {}", c.id, e);
                        return None;
                    }
                };

                if score.overall_score < self.min_score {
                    return None;
                }

                Some(ScoredContractor {
                    contractor_id: c.id,
                    company_name: c.company_name,
                    subscription_tier: c.subscription_tier,
                    is_verified: c.is_verified,
                    distance_km,
                    service_categories: c.service_categories,
                    score,
                })
            })
            .collect();

        ranked.sort_by(compare_ranked);
        ranked.truncate(limit);

        Ok(RankResult {
            contractors: ranked,
            total_candidates,
        })
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Score desc, tier desc, verified first, distance asc (unknown last), id
fn compare_ranked(a: &ScoredContractor, b: &ScoredContractor) -> Ordering {
    b.score
        .overall_score
        .partial_cmp(&a.score.overall_score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| b.subscription_tier.cmp(&a.subscription_tier))
        .then_with(|| b.is_verified.cmp(&a.is_verified))
        .then_with(|| match (a.distance_km, b.distance_km) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| a.contractor_id.cmp(&b.contractor_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SubscriptionTier;
    use uuid::Uuid;

    fn create_contractor(
        name: &str,
        lat: f64,
        lon: f64,
        price: (f64, f64),
        tier: SubscriptionTier,
    ) -> Contractor {
        Contractor {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            company_name: name.to_string(),
            subscription_tier: tier,
            is_verified: true,
            is_approved: true,
            service_categories: vec!["photography".to_string()],
            service_areas: vec![ServiceArea::Radius {
                latitude: lat,
                longitude: lon,
                radius_km: 20.0,
            }],
            price_range: Some(PriceRange {
                min: price.0,
                max: Some(price.1),
            }),
            latitude: Some(lat),
            longitude: Some(lon),
        }
    }

    fn create_event() -> Event {
        Event {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "Harbour wedding".to_string(),
            event_type: "wedding".to_string(),
            location: Some("Auckland".to_string()),
            latitude: Some(-36.8485),
            longitude: Some(174.7633),
            budget: Some(8000.0),
            attendee_count: Some(120),
            duration_hours: Some(6.0),
            required_categories: vec!["photography".to_string()],
        }
    }

    #[test]
    fn test_rank_prefers_local_affordable_contractor() {
        let matcher = Matcher::with_defaults();
        let event = create_event();

        let candidates = vec![
            create_contractor("Far", -41.2865, 174.7762, (5000.0, 10000.0), SubscriptionTier::Essential),
            create_contractor("Local", -36.85, 174.76, (5000.0, 10000.0), SubscriptionTier::Essential),
            create_contractor("Pricey", -36.85, 174.76, (20000.0, 30000.0), SubscriptionTier::Essential),
        ];

        let result = matcher.rank_contractors(&event, candidates, 10).unwrap();

        assert_eq!(result.total_candidates, 3);
        assert_eq!(result.contractors[0].company_name, "Local");
        assert_eq!(result.contractors[0].score.overall_score, 1.0);
        assert!(result.contractors.iter().all(|c| c.company_name != "Far"));
    }

    #[test]
    fn test_rank_drops_contractors_out_of_reach() {
        let matcher = Matcher::with_defaults();
        let event = create_event();

        let mut nationwide = create_contractor("Nationwide", -41.2865, 174.7762, (5000.0, 10000.0), SubscriptionTier::Essential);
        nationwide.service_areas = vec![ServiceArea::Nationwide];

        let mut wide = create_contractor("Wide", -41.2865, 174.7762, (5000.0, 10000.0), SubscriptionTier::Essential);
        wide.service_areas = vec![ServiceArea::Radius {
            latitude: -41.2865,
            longitude: 174.7762,
            radius_km: 400.0,
        }];

        let mut unplaced = create_contractor("Unplaced", 0.0, 0.0, (5000.0, 10000.0), SubscriptionTier::Essential);
        unplaced.service_areas = vec![];
        unplaced.latitude = None;
        unplaced.longitude = None;

        let mut distant_base = create_contractor("Distant Base", -45.8788, 170.5028, (5000.0, 10000.0), SubscriptionTier::Essential);
        distant_base.service_areas = vec![];

        let candidates = vec![
            create_contractor("Wellington", -41.2865, 174.7762, (5000.0, 10000.0), SubscriptionTier::Essential),
            nationwide,
            wide,
            unplaced,
            distant_base,
        ];

        let result = matcher.rank_contractors(&event, candidates, 10).unwrap();
        let mut names: Vec<_> = result.contractors.iter().map(|c| c.company_name.as_str()).collect();
        names.sort_unstable();

        assert_eq!(result.total_candidates, 5);
        assert_eq!(names, vec!["Nationwide", "Unplaced", "Wide"]);
    }

    #[test]
    fn test_candidate_area_spans_cutoff_and_max_radius() {
        let matcher = Matcher::with_defaults();
        let area = matcher.candidate_area(GeoPoint::new(-36.8485, 174.7633));

        // 150 km cutoff + 300 km max radius
        let expected_lat_delta = 450.0 / 111.0;
        assert!((area.max_lat - area.min_lat - 2.0 * expected_lat_delta).abs() < 1e-9);
        assert!(is_within_bounding_box(-40.0, 174.7633, &area));
        assert!(!is_within_bounding_box(-41.2865, 174.7762, &area));
    }

    #[test]
    fn test_rank_zero_budget_scores_location_only() {
        let matcher = Matcher::with_defaults();
        let mut event = create_event();
        event.budget = Some(0.0);

        let candidates = vec![
            create_contractor("Local", -36.85, 174.76, (5000.0, 10000.0), SubscriptionTier::Essential),
            create_contractor("Pricey", -36.85, 174.76, (20000.0, 30000.0), SubscriptionTier::Essential),
        ];

        let result = matcher.rank_contractors(&event, candidates, 10).unwrap();

        assert_eq!(result.contractors.len(), 2);
        for contractor in &result.contractors {
            assert!(contractor.score.breakdown.budget.is_none());
            assert_eq!(contractor.score.overall_score, 1.0);
        }
    }

    #[test]
    fn test_rank_filters_unapproved_and_wrong_category() {
        let matcher = Matcher::with_defaults();
        let event = create_event();

        let mut unapproved = create_contractor("Unapproved", -36.85, 174.76, (5000.0, 10000.0), SubscriptionTier::Essential);
        unapproved.is_approved = false;
        let mut caterer = create_contractor("Caterer", -36.85, 174.76, (5000.0, 10000.0), SubscriptionTier::Essential);
        caterer.service_categories = vec!["catering".to_string()];
        let ok = create_contractor("Photographer", -36.85, 174.76, (5000.0, 10000.0), SubscriptionTier::Essential);

        let result = matcher.rank_contractors(&event, vec![unapproved, caterer, ok], 10).unwrap();

        assert_eq!(result.contractors.len(), 1);
        assert_eq!(result.contractors[0].company_name, "Photographer");
    }

    #[test]
    fn test_rank_ties_broken_by_tier() {
        let matcher = Matcher::with_defaults();
        let event = create_event();

        let candidates = vec![
            create_contractor("Essential", -36.85, 174.76, (5000.0, 10000.0), SubscriptionTier::Essential),
            create_contractor("Spotlight", -36.85, 174.76, (5000.0, 10000.0), SubscriptionTier::Spotlight),
            create_contractor("Showcase", -36.85, 174.76, (5000.0, 10000.0), SubscriptionTier::Showcase),
        ];

        let result = matcher.rank_contractors(&event, candidates, 10).unwrap();
        let names: Vec<_> = result.contractors.iter().map(|c| c.company_name.as_str()).collect();
        assert_eq!(names, vec!["Spotlight", "Showcase", "Essential"]);
    }

    #[test]
    fn test_rank_respects_limit() {
        let matcher = Matcher::with_defaults();
        let event = create_event();

        let candidates: Vec<Contractor> = (0..20)
            .map(|i| {
                create_contractor(
                    &format!("Contractor {}", i),
                    -36.85 + i as f64 * 0.01,
                    174.76,
                    (5000.0, 10000.0),
                    SubscriptionTier::Essential,
                )
            })
            .collect();

        let result = matcher.rank_contractors(&event, candidates, 5).unwrap();
        assert_eq!(result.contractors.len(), 5);
    }

    #[test]
    fn test_rank_requires_location_or_budget() {
        let matcher = Matcher::with_defaults();
        let mut event = create_event();
        event.latitude = None;
        event.budget = None;

        let result = matcher.rank_contractors(&event, vec![], 10);
        assert!(matches!(result, Err(InputError::MissingInput(_))));
    }
}
