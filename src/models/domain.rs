use serde::{Deserialize, Serialize};

/// A geographic point in degrees
///
/// Valid ranges are lat ∈ [-90, 90] and lng ∈ [-180, 180]; range checks
/// happen at the request boundary, not here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Rider gender, as declared on the rider's profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

/// Rules a driver declares when creating a ride; immutable afterwards
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RideRules {
    #[serde(rename = "femaleOnly", default)]
    pub female_only: bool,
    #[serde(rename = "noSmoking", default)]
    pub no_smoking: bool,
    #[serde(rename = "petAllowed", default = "default_true")]
    pub pet_allowed: bool,
}

impl Default for RideRules {
    fn default() -> Self {
        Self {
            female_only: false,
            no_smoking: false,
            pet_allowed: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Rider preferences sourced from the rider's profile (read-only here)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RiderPreferences {
    pub gender: Gender,
    #[serde(rename = "smokingAllowed")]
    pub smoking_allowed: bool,
    #[serde(rename = "petAllowed")]
    pub pet_allowed: bool,
}

/// A driver's scheduled offer of seats between two points
///
/// Invariant: `available_seats` stays within [0, total_seats] and only
/// decreases through an approved join request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ride {
    pub id: uuid::Uuid,
    #[serde(rename = "driverId")]
    pub driver_id: uuid::Uuid,
    pub pickup: GeoPoint,
    pub dropoff: GeoPoint,
    #[serde(rename = "departureTime")]
    pub departure_time: chrono::DateTime<chrono::Utc>,
    #[serde(rename = "totalSeats")]
    pub total_seats: i32,
    #[serde(rename = "availableSeats")]
    pub available_seats: i32,
    #[serde(default)]
    pub rules: RideRules,
}

/// A rider's desired trip, as entered in the search form
#[derive(Debug, Clone, Copy)]
pub struct SearchQuery {
    pub rider_origin: GeoPoint,
    pub rider_dest: GeoPoint,
    pub requested_time: chrono::DateTime<chrono::Utc>,
}

/// One ranked entry of a search result; produced fresh per search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    #[serde(rename = "rideId")]
    pub ride_id: uuid::Uuid,
    #[serde(rename = "driverId")]
    pub driver_id: uuid::Uuid,
    pub pickup: GeoPoint,
    pub dropoff: GeoPoint,
    #[serde(rename = "departureTime")]
    pub departure_time: chrono::DateTime<chrono::Utc>,
    #[serde(rename = "totalSeats")]
    pub total_seats: i32,
    #[serde(rename = "availableSeats")]
    pub available_seats: i32,
    pub rules: RideRules,
    #[serde(rename = "matchPercent")]
    pub match_percent: u8,
}

/// Join request status; PENDING is the only state transitions start from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "request_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RequestStatus::Pending => "PENDING",
            RequestStatus::Approved => "APPROVED",
            RequestStatus::Rejected => "REJECTED",
        };
        f.write_str(s)
    }
}

/// A rider's request to occupy one seat on a ride
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinRequest {
    pub id: uuid::Uuid,
    #[serde(rename = "rideId")]
    pub ride_id: uuid::Uuid,
    #[serde(rename = "riderId")]
    pub rider_id: uuid::Uuid,
    pub status: RequestStatus,
    #[serde(rename = "requestedAt")]
    pub requested_at: chrono::DateTime<chrono::Utc>,
}

impl JoinRequest {
    pub fn new(ride_id: uuid::Uuid, rider_id: uuid::Uuid) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            ride_id,
            rider_id,
            status: RequestStatus::Pending,
            requested_at: chrono::Utc::now(),
        }
    }

    /// A live request blocks the (ride, rider) pair from filing another one
    pub fn is_live(&self) -> bool {
        matches!(
            self.status,
            RequestStatus::Pending | RequestStatus::Approved
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules_allow_pets() {
        let rules = RideRules::default();
        assert!(!rules.female_only);
        assert!(!rules.no_smoking);
        assert!(rules.pet_allowed);
    }

    #[test]
    fn test_new_request_is_pending_and_live() {
        let request = JoinRequest::new(uuid::Uuid::new_v4(), uuid::Uuid::new_v4());
        assert_eq!(request.status, RequestStatus::Pending);
        assert!(request.is_live());
    }

    #[test]
    fn test_rejected_request_is_not_live() {
        let mut request = JoinRequest::new(uuid::Uuid::new_v4(), uuid::Uuid::new_v4());
        request.status = RequestStatus::Rejected;
        assert!(!request.is_live());
    }

    #[test]
    fn test_rules_wire_names() {
        let json = r#"{"femaleOnly":true,"noSmoking":false,"petAllowed":false}"#;
        let rules: RideRules = serde_json::from_str(json).unwrap();
        assert!(rules.female_only);
        assert!(!rules.pet_allowed);
    }
}
