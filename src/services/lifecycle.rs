use crate::error::Error;
use crate::models::{JoinRequest, RequestStatus, Ride};
use crate::services::notifier::{LifecycleEvent, Notifier};
use crate::services::repository::{RequestRepository, RideRepository};
use std::sync::Arc;
use uuid::Uuid;

/// State machine governing join-request transitions
///
/// PENDING is the initial state; APPROVED and REJECTED are terminal.
/// An approval takes exactly one seat from the parent ride through the
/// repository's conditional decrement, so racing approvals on the last
/// seat cannot both succeed. Seats are never mutated anywhere else.
pub struct RequestLifecycle {
    rides: Arc<dyn RideRepository>,
    requests: Arc<dyn RequestRepository>,
    notifier: Arc<dyn Notifier>,
}

impl RequestLifecycle {
    pub fn new(
        rides: Arc<dyn RideRepository>,
        requests: Arc<dyn RequestRepository>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            rides,
            requests,
            notifier,
        }
    }

    /// File a new join request for one seat
    ///
    /// At most one live (PENDING or APPROVED) request may exist per
    /// (ride, rider) pair; a fresh request after a rejection is fine.
    pub async fn create_request(
        &self,
        ride_id: Uuid,
        rider_id: Uuid,
    ) -> Result<JoinRequest, Error> {
        let ride = self.ride_or_not_found(ride_id).await?;

        if ride.available_seats < 1 {
            return Err(Error::Conflict("No seats available".to_string()));
        }

        if let Some(existing) = self
            .requests
            .find_live_by_ride_and_rider(ride_id, rider_id)
            .await?
        {
            return Err(Error::Conflict(format!(
                "A {} request for this ride already exists",
                existing.status
            )));
        }

        let request = JoinRequest::new(ride_id, rider_id);
        self.requests.save(&request).await?;

        tracing::info!("Rider {} requested a seat on ride {}", rider_id, ride_id);

        self.dispatch(LifecycleEvent::NewRequest {
            ride_id,
            request_id: request.id,
            rider_id,
            driver_id: ride.driver_id,
        });

        Ok(request)
    }

    /// Approve a PENDING request, taking one seat from the ride
    pub async fn approve(
        &self,
        ride_id: Uuid,
        request_id: Uuid,
        acting_user: Uuid,
    ) -> Result<JoinRequest, Error> {
        let (_, request) = self.authorized(ride_id, request_id, acting_user).await?;

        if request.status != RequestStatus::Pending {
            return Err(Error::AlreadyProcessed(request.status));
        }

        // Seat first, status second. The reservation is the atomic
        // check-and-decrement; if the status flip then loses a race on
        // the same request, the seat goes back.
        if !self.rides.try_reserve_seat(ride_id).await? {
            return Err(Error::Conflict("No seats left".to_string()));
        }

        match self
            .requests
            .try_transition(request_id, RequestStatus::Approved)
            .await?
        {
            Some(approved) => {
                tracing::info!("Approved request {} on ride {}", request_id, ride_id);
                self.dispatch(LifecycleEvent::Approved {
                    ride_id,
                    request_id,
                    rider_id: approved.rider_id,
                });
                Ok(approved)
            }
            None => {
                self.rides.release_seat(ride_id).await?;
                let current = self
                    .requests
                    .find_by_id(request_id)
                    .await?
                    .map(|r| r.status)
                    .unwrap_or(RequestStatus::Pending);
                Err(Error::AlreadyProcessed(current))
            }
        }
    }

    /// Reject a PENDING request; no seat mutation
    pub async fn reject(
        &self,
        ride_id: Uuid,
        request_id: Uuid,
        acting_user: Uuid,
    ) -> Result<JoinRequest, Error> {
        let (_, request) = self.authorized(ride_id, request_id, acting_user).await?;

        if request.status != RequestStatus::Pending {
            return Err(Error::AlreadyProcessed(request.status));
        }

        match self
            .requests
            .try_transition(request_id, RequestStatus::Rejected)
            .await?
        {
            Some(rejected) => {
                tracing::info!("Rejected request {} on ride {}", request_id, ride_id);
                self.dispatch(LifecycleEvent::Rejected {
                    ride_id,
                    request_id,
                    rider_id: rejected.rider_id,
                });
                Ok(rejected)
            }
            None => {
                let current = self
                    .requests
                    .find_by_id(request_id)
                    .await?
                    .map(|r| r.status)
                    .unwrap_or(RequestStatus::Pending);
                Err(Error::AlreadyProcessed(current))
            }
        }
    }

    /// All requests on a ride; only its driver may look
    pub async fn list_requests(
        &self,
        ride_id: Uuid,
        acting_user: Uuid,
    ) -> Result<Vec<JoinRequest>, Error> {
        let ride = self.ride_or_not_found(ride_id).await?;
        if ride.driver_id != acting_user {
            return Err(Error::Forbidden("Not the driver of this ride".to_string()));
        }
        self.requests.find_by_ride(ride_id).await
    }

    async fn ride_or_not_found(&self, ride_id: Uuid) -> Result<Ride, Error> {
        self.rides
            .find_by_id(ride_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Ride {}", ride_id)))
    }

    async fn authorized(
        &self,
        ride_id: Uuid,
        request_id: Uuid,
        acting_user: Uuid,
    ) -> Result<(Ride, JoinRequest), Error> {
        let ride = self.ride_or_not_found(ride_id).await?;
        if ride.driver_id != acting_user {
            return Err(Error::Forbidden("Not the driver of this ride".to_string()));
        }

        let request = self
            .requests
            .find_by_id(request_id)
            .await?
            .filter(|r| r.ride_id == ride_id)
            .ok_or_else(|| Error::NotFound(format!("Request {} for this ride", request_id)))?;

        Ok((ride, request))
    }

    /// Fire-and-forget delivery; a failed notification is logged and
    /// never fails the transition that triggered it
    fn dispatch(&self, event: LifecycleEvent) {
        let notifier = self.notifier.clone();
        tokio::spawn(async move {
            if let Err(e) = notifier.notify(event).await {
                tracing::warn!("Notification failed: {}", e);
            }
        });
    }
}
