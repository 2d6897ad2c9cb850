use crate::core::distance::haversine_distance;
use crate::models::GeoPoint;

/// One row of the threshold table: both distances must fall under
/// `within_km` for `percent` to apply
#[derive(Debug, Clone, Copy)]
pub struct ScoreBand {
    pub within_km: f64,
    pub percent: u8,
}

/// Ordered proximity bands, first match wins. Both the origin delta and
/// the destination delta must satisfy the same bound; there is no
/// partial credit.
pub const DEFAULT_BANDS: &[ScoreBand] = &[
    ScoreBand { within_km: 5.0, percent: 90 },
    ScoreBand { within_km: 10.0, percent: 70 },
    ScoreBand { within_km: 20.0, percent: 40 },
    ScoreBand { within_km: 30.0, percent: 20 },
    ScoreBand { within_km: 50.0, percent: 10 },
];

/// Converts a pair of distance deltas into a discrete match percentage
#[derive(Debug, Clone)]
pub struct MatchScorer {
    bands: &'static [ScoreBand],
}

impl MatchScorer {
    pub fn new(bands: &'static [ScoreBand]) -> Self {
        Self { bands }
    }

    /// Score a rider's desired trip against a driver's planned trip
    ///
    /// d1 is origin-to-pickup, d2 is destination-to-drop, both in
    /// kilometers. Deterministic and pure.
    pub fn score(
        &self,
        rider_origin: GeoPoint,
        rider_dest: GeoPoint,
        driver_pickup: GeoPoint,
        driver_dropoff: GeoPoint,
    ) -> u8 {
        let d1 = haversine_distance(rider_origin, driver_pickup);
        let d2 = haversine_distance(rider_dest, driver_dropoff);
        self.score_distances(d1, d2)
    }

    /// Apply the band table directly to precomputed distances
    pub fn score_distances(&self, d1: f64, d2: f64) -> u8 {
        for band in self.bands {
            if d1 < band.within_km && d2 < band.within_km {
                return band.percent;
            }
        }
        0
    }
}

impl Default for MatchScorer {
    fn default() -> Self {
        Self::new(DEFAULT_BANDS)
    }
}
