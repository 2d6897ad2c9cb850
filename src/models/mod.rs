// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    Gender, GeoPoint, JoinRequest, MatchResult, RequestStatus, Ride, RideRules,
    RiderPreferences, SearchQuery,
};
pub use requests::{CreateRideRequest, SearchRidesQuery};
pub use responses::{ErrorResponse, HealthResponse, RequestStatusResponse, RideCreatedResponse};
