use crate::core::{eligibility::is_eligible, scoring::MatchScorer};
use crate::models::{MatchResult, Ride, RiderPreferences, SearchQuery};

/// Pure ranking pipeline over a set of candidate rides
///
/// # Pipeline Stages
/// 1. Eligibility filtering against driver rules
/// 2. Proximity scoring of both trip legs
/// 3. Stable descending sort by match percentage
///
/// Candidate retrieval and caching live in the search engine; this
/// stays free of storage and I/O so it can be tested in isolation.
#[derive(Debug, Clone, Default)]
pub struct RideMatcher {
    scorer: MatchScorer,
}

impl RideMatcher {
    pub fn new(scorer: MatchScorer) -> Self {
        Self { scorer }
    }

    /// Rank candidate rides for a rider's desired trip
    ///
    /// Ties keep the candidates' original order, so output is
    /// deterministic given identical repository iteration order.
    pub fn rank(
        &self,
        query: &SearchQuery,
        prefs: &RiderPreferences,
        candidates: Vec<Ride>,
    ) -> Vec<MatchResult> {
        let mut results: Vec<MatchResult> = candidates
            .into_iter()
            .filter(|ride| is_eligible(ride, prefs))
            .map(|ride| {
                let match_percent = self.scorer.score(
                    query.rider_origin,
                    query.rider_dest,
                    ride.pickup,
                    ride.dropoff,
                );

                MatchResult {
                    ride_id: ride.id,
                    driver_id: ride.driver_id,
                    pickup: ride.pickup,
                    dropoff: ride.dropoff,
                    departure_time: ride.departure_time,
                    total_seats: ride.total_seats,
                    available_seats: ride.available_seats,
                    rules: ride.rules,
                    match_percent,
                }
            })
            .collect();

        // Vec::sort_by is stable, which the tie-break contract relies on
        results.sort_by(|a, b| b.match_percent.cmp(&a.match_percent));

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Gender, GeoPoint, RideRules};
    use chrono::Utc;

    fn ride_at(pickup: GeoPoint, dropoff: GeoPoint, rules: RideRules) -> Ride {
        Ride {
            id: uuid::Uuid::new_v4(),
            driver_id: uuid::Uuid::new_v4(),
            pickup,
            dropoff,
            departure_time: Utc::now(),
            total_seats: 4,
            available_seats: 2,
            rules,
        }
    }

    fn query() -> SearchQuery {
        SearchQuery {
            rider_origin: GeoPoint::new(12.975, 77.595),
            rider_dest: GeoPoint::new(12.935, 77.685),
            requested_time: Utc::now(),
        }
    }

    fn prefs() -> RiderPreferences {
        RiderPreferences {
            gender: Gender::Male,
            smoking_allowed: false,
            pet_allowed: false,
        }
    }

    #[test]
    fn test_rank_sorts_descending_by_match_percent() {
        let matcher = RideMatcher::default();
        let close = ride_at(
            GeoPoint::new(12.97, 77.59),
            GeoPoint::new(12.93, 77.68),
            RideRules::default(),
        );
        // Pickup roughly 25km north, lands in the 30km band
        let far = ride_at(
            GeoPoint::new(13.2, 77.59),
            GeoPoint::new(12.93, 77.68),
            RideRules::default(),
        );

        let results = matcher.rank(&query(), &prefs(), vec![far.clone(), close.clone()]);

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].ride_id, close.id);
        assert_eq!(results[0].match_percent, 90);
        assert_eq!(results[1].ride_id, far.id);
        assert!(results[1].match_percent < 90);
    }

    #[test]
    fn test_rank_drops_ineligible_rides() {
        let matcher = RideMatcher::default();
        let restricted = ride_at(
            GeoPoint::new(12.97, 77.59),
            GeoPoint::new(12.93, 77.68),
            RideRules {
                female_only: true,
                ..RideRules::default()
            },
        );

        let results = matcher.rank(&query(), &prefs(), vec![restricted]);
        assert!(results.is_empty());
    }

    #[test]
    fn test_ties_keep_repository_order() {
        let matcher = RideMatcher::default();
        let a = ride_at(
            GeoPoint::new(12.97, 77.59),
            GeoPoint::new(12.93, 77.68),
            RideRules::default(),
        );
        let b = ride_at(
            GeoPoint::new(12.971, 77.591),
            GeoPoint::new(12.931, 77.681),
            RideRules::default(),
        );

        let results = matcher.rank(&query(), &prefs(), vec![a.clone(), b.clone()]);

        assert_eq!(results[0].match_percent, results[1].match_percent);
        assert_eq!(results[0].ride_id, a.id);
        assert_eq!(results[1].ride_id, b.id);
    }

    #[test]
    fn test_zero_score_rides_still_appear_last() {
        let matcher = RideMatcher::default();
        let close = ride_at(
            GeoPoint::new(12.97, 77.59),
            GeoPoint::new(12.93, 77.68),
            RideRules::default(),
        );
        let elsewhere = ride_at(
            GeoPoint::new(19.07, 72.87),
            GeoPoint::new(19.10, 72.90),
            RideRules::default(),
        );

        let results = matcher.rank(&query(), &prefs(), vec![elsewhere.clone(), close]);

        assert_eq!(results.len(), 2);
        assert_eq!(results[1].ride_id, elsewhere.id);
        assert_eq!(results[1].match_percent, 0);
    }
}
