use crate::error::Error;
use crate::models::{JoinRequest, RequestStatus, Ride, RiderPreferences};
use crate::services::repository::{RequestRepository, RideRepository, RiderProfileProvider};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-memory storage backend
///
/// Used by the integration tests and for running the service without a
/// database. Rides are kept in insertion order so search ranking stays
/// deterministic across identical runs.
#[derive(Default)]
pub struct MemoryStore {
    rides: RwLock<Vec<Ride>>,
    requests: RwLock<Vec<JoinRequest>>,
    profiles: RwLock<HashMap<Uuid, RiderPreferences>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn put_preferences(&self, rider_id: Uuid, prefs: RiderPreferences) {
        self.profiles.write().await.insert(rider_id, prefs);
    }
}

#[async_trait]
impl RideRepository for MemoryStore {
    async fn find_by_departure_window(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Ride>, Error> {
        let rides = self.rides.read().await;
        Ok(rides
            .iter()
            .filter(|r| {
                r.departure_time >= start && r.departure_time <= end && r.available_seats > 0
            })
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Ride>, Error> {
        let rides = self.rides.read().await;
        Ok(rides.iter().find(|r| r.id == id).cloned())
    }

    async fn find_by_driver(&self, driver_id: Uuid) -> Result<Vec<Ride>, Error> {
        let rides = self.rides.read().await;
        Ok(rides
            .iter()
            .filter(|r| r.driver_id == driver_id)
            .cloned()
            .collect())
    }

    async fn save(&self, ride: &Ride) -> Result<(), Error> {
        let mut rides = self.rides.write().await;
        match rides.iter_mut().find(|r| r.id == ride.id) {
            Some(existing) => *existing = ride.clone(),
            None => rides.push(ride.clone()),
        }
        Ok(())
    }

    async fn try_reserve_seat(&self, ride_id: Uuid) -> Result<bool, Error> {
        // Check and decrement happen under one write lock, so two
        // racing approvals cannot both take the last seat.
        let mut rides = self.rides.write().await;
        match rides.iter_mut().find(|r| r.id == ride_id) {
            Some(ride) if ride.available_seats > 0 => {
                ride.available_seats -= 1;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn release_seat(&self, ride_id: Uuid) -> Result<(), Error> {
        let mut rides = self.rides.write().await;
        if let Some(ride) = rides.iter_mut().find(|r| r.id == ride_id) {
            ride.available_seats = (ride.available_seats + 1).min(ride.total_seats);
        }
        Ok(())
    }
}

#[async_trait]
impl RequestRepository for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<JoinRequest>, Error> {
        let requests = self.requests.read().await;
        Ok(requests.iter().find(|r| r.id == id).cloned())
    }

    async fn find_live_by_ride_and_rider(
        &self,
        ride_id: Uuid,
        rider_id: Uuid,
    ) -> Result<Option<JoinRequest>, Error> {
        let requests = self.requests.read().await;
        Ok(requests
            .iter()
            .find(|r| r.ride_id == ride_id && r.rider_id == rider_id && r.is_live())
            .cloned())
    }

    async fn find_by_ride(&self, ride_id: Uuid) -> Result<Vec<JoinRequest>, Error> {
        let requests = self.requests.read().await;
        Ok(requests
            .iter()
            .filter(|r| r.ride_id == ride_id)
            .cloned()
            .collect())
    }

    async fn save(&self, request: &JoinRequest) -> Result<(), Error> {
        let mut requests = self.requests.write().await;
        match requests.iter_mut().find(|r| r.id == request.id) {
            Some(existing) => *existing = request.clone(),
            None => requests.push(request.clone()),
        }
        Ok(())
    }

    async fn try_transition(
        &self,
        request_id: Uuid,
        to: RequestStatus,
    ) -> Result<Option<JoinRequest>, Error> {
        let mut requests = self.requests.write().await;
        match requests.iter_mut().find(|r| r.id == request_id) {
            Some(request) if request.status == RequestStatus::Pending => {
                request.status = to;
                Ok(Some(request.clone()))
            }
            _ => Ok(None),
        }
    }
}

#[async_trait]
impl RiderProfileProvider for MemoryStore {
    async fn get_preferences(&self, rider_id: Uuid) -> Result<RiderPreferences, Error> {
        let profiles = self.profiles.read().await;
        profiles
            .get(&rider_id)
            .copied()
            .ok_or_else(|| Error::NotFound(format!("Preferences for rider {}", rider_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GeoPoint, RideRules};

    fn ride(departure: DateTime<Utc>, seats: i32) -> Ride {
        Ride {
            id: Uuid::new_v4(),
            driver_id: Uuid::new_v4(),
            pickup: GeoPoint::new(12.97, 77.59),
            dropoff: GeoPoint::new(12.93, 77.68),
            departure_time: departure,
            total_seats: seats,
            available_seats: seats,
            rules: RideRules::default(),
        }
    }

    // Both repository traits expose `save`/`find_by_id`, so calls on
    // the concrete store are written in qualified form.

    #[tokio::test]
    async fn test_window_excludes_full_rides() {
        let store = MemoryStore::new();
        let now = Utc::now();

        let mut full = ride(now, 2);
        full.available_seats = 0;
        RideRepository::save(&store, &full).await.unwrap();
        RideRepository::save(&store, &ride(now, 2)).await.unwrap();

        let found = store
            .find_by_departure_window(now - chrono::Duration::hours(1), now + chrono::Duration::hours(1))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
    }

    #[tokio::test]
    async fn test_reserve_seat_stops_at_zero() {
        let store = MemoryStore::new();
        let r = ride(Utc::now(), 1);
        RideRepository::save(&store, &r).await.unwrap();

        assert!(store.try_reserve_seat(r.id).await.unwrap());
        assert!(!store.try_reserve_seat(r.id).await.unwrap());

        let stored = RideRepository::find_by_id(&store, r.id).await.unwrap().unwrap();
        assert_eq!(stored.available_seats, 0);
    }

    #[tokio::test]
    async fn test_save_updates_in_place() {
        let store = MemoryStore::new();
        let mut r = ride(Utc::now(), 3);
        RideRepository::save(&store, &r).await.unwrap();

        r.available_seats = 1;
        RideRepository::save(&store, &r).await.unwrap();

        let rides = store.find_by_driver(r.driver_id).await.unwrap();
        assert_eq!(rides.len(), 1);
        assert_eq!(rides[0].available_seats, 1);
    }
}
