use crate::models::RideRules;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Body for a driver publishing a new ride
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateRideRequest {
    #[validate(range(min = -90.0, max = 90.0))]
    #[serde(rename = "pickupLat")]
    pub pickup_lat: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    #[serde(rename = "pickupLng")]
    pub pickup_lng: f64,
    #[validate(range(min = -90.0, max = 90.0))]
    #[serde(rename = "dropLat")]
    pub drop_lat: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    #[serde(rename = "dropLng")]
    pub drop_lng: f64,
    #[serde(rename = "departureTime")]
    pub departure_time: chrono::DateTime<chrono::Utc>,
    #[validate(range(min = 1, max = 16))]
    #[serde(rename = "totalSeats")]
    pub total_seats: i32,
    #[serde(default)]
    pub rules: RideRules,
}

/// Query parameters for the ride search endpoint
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SearchRidesQuery {
    #[validate(range(min = -90.0, max = 90.0))]
    #[serde(rename = "origLat")]
    pub orig_lat: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    #[serde(rename = "origLng")]
    pub orig_lng: f64,
    #[validate(range(min = -90.0, max = 90.0))]
    #[serde(rename = "destLat")]
    pub dest_lat: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    #[serde(rename = "destLng")]
    pub dest_lng: f64,
    pub time: chrono::DateTime<chrono::Utc>,
}
