use crate::models::RequestStatus;
use serde::{Deserialize, Serialize};

/// Response after a driver publishes a ride
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RideCreatedResponse {
    #[serde(rename = "rideId")]
    pub ride_id: uuid::Uuid,
}

/// Response for join-request creation and lifecycle transitions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestStatusResponse {
    #[serde(rename = "requestId")]
    pub request_id: uuid::Uuid,
    pub status: RequestStatus,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
