use crate::error::Error;
use crate::models::{JoinRequest, RequestStatus, Ride, RiderPreferences};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Read/write access to the ride pool
///
/// The engine and lifecycle borrow storage through this trait; timeout
/// and retry policy belong to the implementation, not to callers.
#[async_trait]
pub trait RideRepository: Send + Sync {
    /// Rides departing within `[start, end]` that still have seats left
    async fn find_by_departure_window(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Ride>, Error>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Ride>, Error>;

    async fn find_by_driver(&self, driver_id: Uuid) -> Result<Vec<Ride>, Error>;

    async fn save(&self, ride: &Ride) -> Result<(), Error>;

    /// Atomically decrement `available_seats` if at least one is left
    ///
    /// Returns false when the ride is full (or missing). This is the
    /// only write path for the seat counter; concurrent reservations
    /// on the same ride must serialize here so the count never drops
    /// below zero.
    async fn try_reserve_seat(&self, ride_id: Uuid) -> Result<bool, Error>;

    /// Give a reserved seat back, capped at `total_seats`
    ///
    /// Only called by the lifecycle when an approval loses the race
    /// for its request after the seat was already taken.
    async fn release_seat(&self, ride_id: Uuid) -> Result<(), Error>;
}

/// Storage for join requests
#[async_trait]
pub trait RequestRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<JoinRequest>, Error>;

    /// The PENDING or APPROVED request for this (ride, rider) pair, if any
    async fn find_live_by_ride_and_rider(
        &self,
        ride_id: Uuid,
        rider_id: Uuid,
    ) -> Result<Option<JoinRequest>, Error>;

    async fn find_by_ride(&self, ride_id: Uuid) -> Result<Vec<JoinRequest>, Error>;

    async fn save(&self, request: &JoinRequest) -> Result<(), Error>;

    /// Atomically move a PENDING request to a terminal status
    ///
    /// Returns the updated request, or None when the request was no
    /// longer PENDING (or missing). Keeps status write-once even when
    /// two transitions race on the same request.
    async fn try_transition(
        &self,
        request_id: Uuid,
        to: RequestStatus,
    ) -> Result<Option<JoinRequest>, Error>;
}

/// Rider preferences live on the profile service; read-only here
#[async_trait]
pub trait RiderProfileProvider: Send + Sync {
    async fn get_preferences(&self, rider_id: Uuid) -> Result<RiderPreferences, Error>;
}
