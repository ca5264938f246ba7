use std::collections::BTreeMap;

use crate::core::error::InputError;
use crate::models::{
    AdjustmentKind, BudgetAdjustment, BudgetRecommendation, CategoryBudget, EventType,
    ServiceCategory,
};

/// Regional cost-of-living multipliers, matched as substrings of the location
const REGION_MULTIPLIERS: &[(&str, f64)] = &[
    ("auckland", 1.15),
    ("queenstown", 1.25),
    ("wellington", 1.10),
    ("christchurch", 1.00),
    ("tauranga", 1.00),
    ("hamilton", 0.95),
    ("dunedin", 0.95),
    ("nelson", 1.00),
    ("napier", 0.95),
    ("hastings", 0.95),
    ("rotorua", 0.95),
    ("new plymouth", 0.95),
    ("palmerston north", 0.90),
    ("whangarei", 0.90),
    ("invercargill", 0.90),
];

/// Tuning for the budget calculator
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetSettings {
    pub baseline_attendees: f64,
    pub baseline_hours: f64,
    pub known_type_confidence: f64,
    pub fallback_confidence: f64,
    /// Extra or overriding region multipliers, keyed by lowercase region name
    pub location_multipliers: BTreeMap<String, f64>,
}

impl Default for BudgetSettings {
    fn default() -> Self {
        Self {
            baseline_attendees: 50.0,
            baseline_hours: 4.0,
            known_type_confidence: 0.75,
            fallback_confidence: 0.5,
            location_multipliers: BTreeMap::new(),
        }
    }
}

/// Event details the recommendation is computed from
#[derive(Debug, Clone)]
pub struct BudgetInput<'a> {
    pub event_type: &'a str,
    pub location: Option<&'a str>,
    pub attendee_count: u32,
    pub duration_hours: f64,
    /// Restricts the breakdown; empty means the event type's usual services
    pub categories: &'a [ServiceCategory],
}

/// Recommends an event budget from base rates and sequential adjustments
#[derive(Debug, Clone)]
pub struct BudgetCalculator {
    settings: BudgetSettings,
    regions: BTreeMap<String, f64>,
}

impl BudgetCalculator {
    pub fn new(settings: BudgetSettings) -> Self {
        let mut regions: BTreeMap<String, f64> = REGION_MULTIPLIERS
            .iter()
            .map(|(name, m)| (name.to_string(), *m))
            .collect();
        for (name, m) in &settings.location_multipliers {
            regions.insert(name.trim().to_lowercase(), *m);
        }

        Self { settings, regions }
    }

    pub fn recommend(&self, input: &BudgetInput<'_>) -> Result<BudgetRecommendation, InputError> {
        if input.attendee_count == 0 {
            return Err(InputError::InvalidEventDetails(
                "attendee count must be at least 1".to_string(),
            ));
        }
        if !input.duration_hours.is_finite() || input.duration_hours <= 0.0 || input.duration_hours > 72.0 {
            return Err(InputError::InvalidEventDetails(format!(
                "duration must be between 0 and 72 hours, got {}",
                input.duration_hours
            )));
        }

        let (event_type, confidence) = match EventType::parse(input.event_type) {
            Some(t) => (t, self.settings.known_type_confidence),
            None => {
                tracing::debug!("Unknown event type '{}', using generic rates", input.event_type);
                (EventType::Other, self.settings.fallback_confidence)
            }
        };

        let categories: Vec<ServiceCategory> = if input.categories.is_empty() {
            default_categories(event_type).to_vec()
        } else {
            let mut requested = input.categories.to_vec();
            requested.sort();
            requested.dedup();
            requested
        };

        let base: Vec<(ServiceCategory, f64)> = categories
            .iter()
            .map(|c| (*c, base_rate(event_type, *c)))
            .collect();
        let base_total: f64 = base.iter().map(|(_, amount)| amount).sum();

        let mut adjustments = Vec::with_capacity(3);

        // 1. Location
        let (location_multiplier, region) = self.location_multiplier(input.location);
        adjustments.push(BudgetAdjustment {
            kind: AdjustmentKind::Location,
            multiplier: location_multiplier,
            description: match region {
                Some(region) => format!("Regional pricing for {}", region),
                None => "No regional pricing adjustment".to_string(),
            },
        });
        let after_location: Vec<f64> = base.iter().map(|(_, a)| a * location_multiplier).collect();

        // 2. Attendees
        let attendee_ratio = input.attendee_count as f64 / self.settings.baseline_attendees;
        let after_attendees: Vec<f64> = base
            .iter()
            .zip(&after_location)
            .map(|((c, _), a)| a * attendee_ratio.powf(attendee_elasticity(*c)))
            .collect();
        adjustments.push(BudgetAdjustment {
            kind: AdjustmentKind::AttendeeCount,
            multiplier: effective_ratio(&after_location, &after_attendees),
            description: format!(
                "{} attendees against a baseline of {}",
                input.attendee_count, self.settings.baseline_attendees
            ),
        });

        // 3. Duration
        let duration_ratio = input.duration_hours / self.settings.baseline_hours;
        let after_duration: Vec<f64> = base
            .iter()
            .zip(&after_attendees)
            .map(|((c, _), a)| a * duration_ratio.powf(duration_elasticity(*c)))
            .collect();
        adjustments.push(BudgetAdjustment {
            kind: AdjustmentKind::Duration,
            multiplier: effective_ratio(&after_attendees, &after_duration),
            description: format!(
                "{} hours against a baseline of {}",
                input.duration_hours, self.settings.baseline_hours
            ),
        });

        let breakdown: Vec<CategoryBudget> = base
            .iter()
            .zip(&after_duration)
            .map(|((category, base_amount), amount)| CategoryBudget {
                category: *category,
                base_amount: *base_amount,
                recommended_amount: amount.round(),
            })
            .collect();

        let total_budget: f64 = breakdown.iter().map(|c| c.recommended_amount).sum();

        tracing::debug!(
            "Budget for {:?}: base {:.0} -> total {:.0} across {} categories",
            event_type,
            base_total,
            total_budget,
            breakdown.len()
        );

        Ok(BudgetRecommendation {
            event_type,
            total_budget,
            breakdown,
            adjustments,
            confidence,
        })
    }

    /// Multiplier for the most specific region named in the location string
    pub fn location_multiplier(&self, location: Option<&str>) -> (f64, Option<String>) {
        let Some(location) = location else {
            return (1.0, None);
        };
        let location = location.to_lowercase();

        self.regions
            .iter()
            .filter(|(name, _)| location.contains(name.as_str()))
            .max_by_key(|(name, _)| name.len())
            .map(|(name, m)| (*m, Some(name.clone())))
            .unwrap_or((1.0, None))
    }
}

impl Default for BudgetCalculator {
    fn default() -> Self {
        Self::new(BudgetSettings::default())
    }
}

/// Base rate in NZD for a baseline event
pub fn base_rate(event_type: EventType, category: ServiceCategory) -> f64 {
    let category_rate = match category {
        ServiceCategory::Catering => 3500.0,
        ServiceCategory::Venue => 3000.0,
        ServiceCategory::Photography => 2000.0,
        ServiceCategory::Videography => 2200.0,
        ServiceCategory::Entertainment => 1500.0,
        ServiceCategory::Music => 1200.0,
        ServiceCategory::Decorations => 1000.0,
        ServiceCategory::Florist => 800.0,
        ServiceCategory::AvEquipment => 1200.0,
        ServiceCategory::Planning => 1800.0,
        ServiceCategory::Transport => 900.0,
    };

    let type_factor = match event_type {
        EventType::Wedding => 1.4,
        EventType::Corporate => 1.2,
        EventType::Conference => 1.3,
        EventType::Festival => 1.5,
        EventType::Birthday => 0.8,
        EventType::Party => 0.9,
        EventType::Other => 1.0,
    };

    category_rate * type_factor
}

/// Services usually booked for an event type
pub fn default_categories(event_type: EventType) -> &'static [ServiceCategory] {
    use ServiceCategory::*;

    match event_type {
        EventType::Wedding => &[
            Catering, Venue, Photography, Videography, Music, Decorations, Florist, Planning,
            Transport,
        ],
        EventType::Corporate => &[Catering, Venue, Photography, Entertainment, AvEquipment],
        EventType::Conference => &[Catering, Venue, Photography, AvEquipment, Planning],
        EventType::Festival => &[Catering, Venue, Entertainment, Music, AvEquipment, Transport],
        EventType::Birthday => &[Catering, Venue, Entertainment, Decorations],
        EventType::Party => &[Catering, Venue, Music, Decorations],
        EventType::Other => &[Catering, Venue, Entertainment],
    }
}

fn attendee_elasticity(category: ServiceCategory) -> f64 {
    match category {
        ServiceCategory::Catering => 1.0,
        ServiceCategory::Venue => 0.7,
        ServiceCategory::Transport => 0.6,
        ServiceCategory::Decorations => 0.5,
        ServiceCategory::Florist | ServiceCategory::AvEquipment => 0.4,
        ServiceCategory::Entertainment | ServiceCategory::Planning => 0.3,
        ServiceCategory::Photography | ServiceCategory::Videography | ServiceCategory::Music => 0.2,
    }
}

fn duration_elasticity(category: ServiceCategory) -> f64 {
    match category {
        ServiceCategory::Venue | ServiceCategory::Music => 1.0,
        ServiceCategory::Entertainment => 0.9,
        ServiceCategory::Photography | ServiceCategory::Videography => 0.8,
        ServiceCategory::AvEquipment => 0.7,
        ServiceCategory::Transport => 0.5,
        ServiceCategory::Catering => 0.3,
        ServiceCategory::Planning => 0.2,
        ServiceCategory::Decorations | ServiceCategory::Florist => 0.0,
    }
}

fn effective_ratio(before: &[f64], after: &[f64]) -> f64 {
    let before: f64 = before.iter().sum();
    let after: f64 = after.iter().sum();
    if before > 0.0 {
        after / before
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input<'a>(event_type: &'a str, location: Option<&'a str>, attendees: u32, hours: f64) -> BudgetInput<'a> {
        BudgetInput {
            event_type,
            location,
            attendee_count: attendees,
            duration_hours: hours,
            categories: &[],
        }
    }

    #[test]
    fn test_baseline_event_matches_base_rates() {
        let calculator = BudgetCalculator::default();
        let rec = calculator.recommend(&input("party", None, 50, 4.0)).unwrap();

        let expected: f64 = default_categories(EventType::Party)
            .iter()
            .map(|c| base_rate(EventType::Party, *c))
            .sum();
        assert_eq!(rec.total_budget, expected.round());
        assert_eq!(rec.confidence, 0.75);
        assert!(rec.adjustments.iter().all(|a| (a.multiplier - 1.0).abs() < 1e-9));
    }

    #[test]
    fn test_total_is_sum_of_breakdown() {
        let calculator = BudgetCalculator::default();
        let rec = calculator.recommend(&input("wedding", Some("Ponsonby, Auckland"), 120, 7.5)).unwrap();

        let sum: f64 = rec.breakdown.iter().map(|c| c.recommended_amount).sum();
        assert_eq!(rec.total_budget, sum);
        assert_eq!(rec.adjustments.len(), 3);
        assert_eq!(rec.adjustments[0].kind, AdjustmentKind::Location);
        assert_eq!(rec.adjustments[0].multiplier, 1.15);
    }

    #[test]
    fn test_more_attendees_costs_more() {
        let calculator = BudgetCalculator::default();
        let small = calculator.recommend(&input("corporate", None, 30, 4.0)).unwrap();
        let large = calculator.recommend(&input("corporate", None, 300, 4.0)).unwrap();
        assert!(large.total_budget > small.total_budget);
    }

    #[test]
    fn test_longer_event_costs_more() {
        let calculator = BudgetCalculator::default();
        let short = calculator.recommend(&input("festival", None, 200, 3.0)).unwrap();
        let long = calculator.recommend(&input("festival", None, 200, 10.0)).unwrap();
        assert!(long.total_budget > short.total_budget);
    }

    #[test]
    fn test_unknown_event_type_lowers_confidence() {
        let calculator = BudgetCalculator::default();
        let rec = calculator.recommend(&input("bar mitzvah", None, 80, 5.0)).unwrap();
        assert_eq!(rec.event_type, EventType::Other);
        assert_eq!(rec.confidence, 0.5);
    }

    #[test]
    fn test_category_filter() {
        let calculator = BudgetCalculator::default();
        let categories = [ServiceCategory::Photography, ServiceCategory::Photography];
        let rec = calculator
            .recommend(&BudgetInput {
                categories: &categories,
                ..input("wedding", None, 50, 4.0)
            })
            .unwrap();
        assert_eq!(rec.breakdown.len(), 1);
        assert_eq!(rec.breakdown[0].category, ServiceCategory::Photography);
    }

    #[test]
    fn test_location_override_and_longest_match() {
        let mut settings = BudgetSettings::default();
        settings.location_multipliers.insert("Waiheke Island".to_string(), 1.3);
        let calculator = BudgetCalculator::new(settings);

        assert_eq!(calculator.location_multiplier(Some("Waiheke Island, Auckland")).0, 1.3);
        assert_eq!(calculator.location_multiplier(Some("Somewhere rural")).0, 1.0);
        assert_eq!(calculator.location_multiplier(None), (1.0, None));
    }

    #[test]
    fn test_rejects_invalid_details() {
        let calculator = BudgetCalculator::default();
        assert!(calculator.recommend(&input("party", None, 0, 4.0)).is_err());
        assert!(calculator.recommend(&input("party", None, 10, 0.0)).is_err());
        assert!(calculator.recommend(&input("party", None, 10, 100.0)).is_err());
    }
}
